//! User and role models

use serde::{Deserialize, Serialize};

/// Role of an authenticated user.
///
/// Admins may act across stores; salespeople are confined to the store they
/// belong to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Salesperson,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Salesperson => "salesperson",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(UserRole::Admin),
            "salesperson" => Some(UserRole::Salesperson),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, UserRole::Admin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::parse("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::parse("salesperson"), Some(UserRole::Salesperson));
        assert_eq!(UserRole::parse("manager"), None);
    }

    #[test]
    fn test_admin_flag() {
        assert!(UserRole::Admin.is_admin());
        assert!(!UserRole::Salesperson.is_admin());
    }
}
