//! Demo user directory and static tokens for each capability model.
//!
//! Passwords are plain strings and static tokens are fixed; both exist only so
//! the demo sub-applications can be exercised without a real identity provider.

use anyhow::Context;

use gatehouse_auth::{
    Capability, CredentialSeed, CredentialStore, ModulePermission, PasswordCheck, Permission, Role,
};
use gatehouse_core::SubjectId;

struct DemoUser {
    username: &'static str,
    password: &'static str,
    subject_id: &'static str,
    display_name: &'static str,
    static_token: &'static str,
    granted: &'static [&'static str],
}

const ROLE_USERS: &[DemoUser] = &[
    DemoUser {
        username: "reader",
        password: "reader123",
        subject_id: "user-1",
        display_name: "Regular Reader",
        static_token: "reader-token",
        granted: &["read"],
    },
    DemoUser {
        username: "manager",
        password: "manager123",
        subject_id: "user-2",
        display_name: "Team Manager",
        static_token: "manager-token",
        granted: &["read", "manager"],
    },
    DemoUser {
        username: "admin",
        password: "admin123",
        subject_id: "user-3",
        display_name: "Administrator",
        static_token: "admin-token",
        granted: &["read", "admin"],
    },
    DemoUser {
        username: "superadmin",
        password: "super123",
        subject_id: "user-4",
        display_name: "Super Administrator",
        static_token: "super-admin-token",
        granted: &["read", "admin", "super_admin"],
    },
    DemoUser {
        username: "guest",
        password: "guest123",
        subject_id: "user-5",
        display_name: "Guest",
        static_token: "guest-token",
        granted: &[],
    },
];

const PERMISSION_USERS: &[DemoUser] = &[
    DemoUser {
        username: "viewer",
        password: "viewer123",
        subject_id: "user-11",
        display_name: "Viewer",
        static_token: "viewer-token",
        granted: &["read"],
    },
    DemoUser {
        username: "editor",
        password: "editor123",
        subject_id: "user-12",
        display_name: "Editor",
        static_token: "editor-token",
        granted: &["read", "create", "update"],
    },
    DemoUser {
        username: "moderator",
        password: "moderator123",
        subject_id: "user-13",
        display_name: "Moderator",
        static_token: "moderator-token",
        granted: &["read", "update", "delete"],
    },
    DemoUser {
        username: "owner",
        password: "owner123",
        subject_id: "user-14",
        display_name: "Owner",
        static_token: "owner-token",
        granted: &["read", "create", "update", "delete"],
    },
];

const MODULE_USERS: &[DemoUser] = &[
    DemoUser {
        username: "support",
        password: "support123",
        subject_id: "user-21",
        display_name: "Support Agent",
        static_token: "support-token",
        granted: &["orders:list", "orders:read"],
    },
    DemoUser {
        username: "accountant",
        password: "accountant123",
        subject_id: "user-22",
        display_name: "Accountant",
        static_token: "accountant-token",
        granted: &["orders:list", "orders:read", "orders:refund", "reports:view"],
    },
    DemoUser {
        username: "hr",
        password: "hr123",
        subject_id: "user-23",
        display_name: "HR Officer",
        static_token: "hr-token",
        granted: &["users:list", "users:read", "users:create"],
    },
    DemoUser {
        username: "admin",
        password: "admin123",
        subject_id: "user-24",
        display_name: "Module Administrator",
        static_token: "module-admin-token",
        granted: &[
            "users:list",
            "users:read",
            "users:create",
            "users:delete",
            "orders:list",
            "orders:read",
            "orders:refund",
            "reports:view",
        ],
    },
];

pub fn role_store(check: PasswordCheck) -> anyhow::Result<CredentialStore<Role>> {
    store_from(ROLE_USERS, check)
}

pub fn permission_store(check: PasswordCheck) -> anyhow::Result<CredentialStore<Permission>> {
    store_from(PERMISSION_USERS, check)
}

pub fn module_store(check: PasswordCheck) -> anyhow::Result<CredentialStore<ModulePermission>> {
    store_from(MODULE_USERS, check)
}

fn store_from<C: Capability>(
    users: &[DemoUser],
    check: PasswordCheck,
) -> anyhow::Result<CredentialStore<C>> {
    let mut builder = CredentialStore::builder().password_check(check);

    for user in users {
        let granted = user
            .granted
            .iter()
            .map(|t| t.parse::<C>())
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("demo user '{}'", user.username))?;

        let seed = CredentialSeed::new(
            SubjectId::new(user.subject_id),
            user.display_name,
            granted,
        );
        builder = builder
            .user(user.username, user.password, seed.clone())
            .static_token(user.static_token, seed);
    }

    builder
        .build()
        .with_context(|| format!("{} directory", C::MODEL))
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn all_directories_build() {
        role_store(PasswordCheck::Exact).unwrap();
        permission_store(PasswordCheck::Exact).unwrap();
        module_store(PasswordCheck::Exact).unwrap();
    }

    #[test]
    fn reader_holds_only_read() {
        let store = role_store(PasswordCheck::PresenceOnly).unwrap();
        let seed = store.validate("reader", "whatever").unwrap();
        assert_eq!(seed.granted, BTreeSet::from([Role::READ]));
    }

    #[test]
    fn static_tokens_resolve() {
        let store = module_store(PasswordCheck::PresenceOnly).unwrap();
        let record = store.resolve("support-token").unwrap();
        assert_eq!(record.display_name, "Support Agent");
        assert_eq!(record.granted.len(), 2);
    }
}
