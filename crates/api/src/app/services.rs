//! Per-model wiring: credential store + requirement table + guard chain.

use std::sync::Arc;

use anyhow::Context;

use gatehouse_auth::{
    Capability, CredentialStore, GuardChain, ModulePermission, Permission, Role, RouteRegistry,
};

use crate::app::{directory, routes};
use crate::config::ApiConfig;

/// Everything one sub-application needs at request time.
pub struct SubApp<C: Capability> {
    pub store: Arc<CredentialStore<C>>,
    pub guard: GuardChain<C>,
}

impl<C: Capability> SubApp<C> {
    pub fn new(store: CredentialStore<C>, registry: RouteRegistry<C>) -> Self {
        let store = Arc::new(store);
        let guard = GuardChain::new(Arc::new(registry), store.clone());
        Self { store, guard }
    }

    fn log_requirements(&self) {
        let registry = self.guard.registry();
        for (key, access) in registry.routes() {
            tracing::info!(model = %C::MODEL, route = %key, access = %access, "route requirement");
        }
        for (prefix, access) in registry.groups() {
            tracing::info!(
                model = %C::MODEL,
                group = prefix,
                access = %access,
                "group requirement"
            );
        }
    }
}

pub struct AppServices {
    pub roles: SubApp<Role>,
    pub permissions: SubApp<Permission>,
    pub modules: SubApp<ModulePermission>,
}

impl AppServices {
    pub fn log_requirement_tables(&self) {
        self.roles.log_requirements();
        self.permissions.log_requirements();
        self.modules.log_requirements();
    }
}

pub fn build_services(config: &ApiConfig) -> anyhow::Result<AppServices> {
    let check = config.password_check;

    Ok(AppServices {
        roles: SubApp::new(
            directory::role_store(check)?,
            routes::roles::registry().context("role route table")?,
        ),
        permissions: SubApp::new(
            directory::permission_store(check)?,
            routes::permissions::registry().context("permission route table")?,
        ),
        modules: SubApp::new(
            directory::module_store(check)?,
            routes::modules::registry().context("module route table")?,
        ),
    })
}
