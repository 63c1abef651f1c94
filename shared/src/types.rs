//! Common types used across the system

use serde::{Deserialize, Serialize};

/// User roles
///
/// `StoreKeeper` accounts may carry no store affinity, which means a single
/// login that can operate any store (hotel selection happens in the UI).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "VARCHAR", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    StoreKeeper,
    DeptUser,
    AccountsView,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::StoreKeeper => "STORE_KEEPER",
            Role::DeptUser => "DEPT_USER",
            Role::AccountsView => "ACCOUNTS_VIEW",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(Role::Admin),
            "STORE_KEEPER" => Some(Role::StoreKeeper),
            "DEPT_USER" => Some(Role::DeptUser),
            "ACCOUNTS_VIEW" => Some(Role::AccountsView),
            _ => None,
        }
    }

    /// Roles that see every store regardless of affinity
    pub fn sees_all_stores(&self) -> bool {
        matches!(self, Role::Admin | Role::AccountsView)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_strings() {
        for role in [
            Role::Admin,
            Role::StoreKeeper,
            Role::DeptUser,
            Role::AccountsView,
        ] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("MANAGER"), None);
    }

    #[test]
    fn admin_and_accounts_see_all_stores() {
        assert!(Role::Admin.sees_all_stores());
        assert!(Role::AccountsView.sees_all_stores());
        assert!(!Role::StoreKeeper.sees_all_stores());
        assert!(!Role::DeptUser.sees_all_stores());
    }
}
