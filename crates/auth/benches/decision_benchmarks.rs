use std::sync::Arc;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use gatehouse_auth::{
    CapabilityRequirement, CredentialSeed, CredentialStore, GuardChain, Identity, ModulePermission,
    Permission, Role, RouteAccess, RouteKey, RouteRegistry, authorize,
};
use gatehouse_core::SubjectId;

fn module_permissions(n: usize) -> Vec<ModulePermission> {
    (0..n)
        .map(|i| ModulePermission::new(&format!("module{}", i % 8), &format!("action{i}")))
        .collect::<Result<_, _>>()
        .expect("valid module permissions")
}

/// ALL-rule cost as the granted set grows (worst case: every requirement matched).
fn bench_all_rule(c: &mut Criterion) {
    let mut group = c.benchmark_group("authorize_all");

    for granted in [4usize, 32, 256] {
        let perms = module_permissions(granted);
        let identity = Identity::new(SubjectId::new("bench"), "Bench", perms.clone());
        let requirement = CapabilityRequirement::new(perms.into_iter().take(4));

        group.bench_with_input(BenchmarkId::from_parameter(granted), &granted, |b, _| {
            b.iter(|| authorize(black_box(Some(&identity)), black_box(&requirement)))
        });
    }

    group.finish();
}

/// ANY-rule denial builds the full diagnostic, so measure that path.
fn bench_any_rule_denial(c: &mut Criterion) {
    let identity = Identity::new(SubjectId::new("bench"), "Bench", [Role::READ]);
    let requirement = CapabilityRequirement::new([Role::ADMIN, Role::SUPER_ADMIN, Role::MANAGER]);

    c.bench_function("authorize_any_denied", |b| {
        b.iter(|| authorize(black_box(Some(&identity)), black_box(&requirement)))
    });
}

/// Full guard chain: registry lookup + token resolution + match.
fn bench_guard_chain(c: &mut Criterion) {
    let seed = CredentialSeed::new(
        SubjectId::new("editor"),
        "Editor",
        [Permission::READ, Permission::CREATE, Permission::UPDATE],
    );
    let store = Arc::new(
        CredentialStore::builder()
            .user("editor", "pw", seed.clone())
            .build()
            .expect("store"),
    );
    let token = store.issue_token(&seed);
    let header = format!("Bearer {token}");

    let registry = RouteRegistry::builder()
        .route(
            "PUT",
            "/permissions/articles/:id",
            RouteAccess::require([Permission::READ, Permission::UPDATE]),
        )
        .group("/permissions", RouteAccess::require([Permission::READ]))
        .build()
        .expect("registry");
    let chain = GuardChain::new(Arc::new(registry), store);
    let key = RouteKey::new("PUT", "/permissions/articles/:id");

    c.bench_function("guard_chain_allowed", |b| {
        b.iter(|| chain.check(black_box(&key), black_box(Some(header.as_str()))))
    });
}

criterion_group!(benches, bench_all_rule, bench_any_rule_denial, bench_guard_chain);
criterion_main!(benches);
