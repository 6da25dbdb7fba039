use anyhow::Context;

use gatehouse_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("invalid configuration")?;
    gatehouse_observability::init_with(config.log_format);

    if config.password_check == gatehouse_auth::PasswordCheck::PresenceOnly {
        tracing::warn!("password check is presence-only; any non-empty password is accepted");
    }

    let app = gatehouse_api::app::build_app(&config)?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
