//! User Profile Model

use serde::{Deserialize, Serialize};

/// Account role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// 普通用户
    #[default]
    Regular,
    /// VIP 用户
    Vip,
    /// 管理员
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Vip => "vip",
            Self::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "regular" => Some(Self::Regular),
            "vip" => Some(Self::Vip),
            "admin" => Some(Self::Admin),
            _ => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// User profile — one-to-one with a user account
///
/// A user without a stored profile row resolves to `UserProfile::default()`
/// (regular role, no VIP expiry) rather than being probed for presence at
/// call sites.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserProfile {
    pub role: Role,
    /// UTC milliseconds; set whenever role is vip
    pub vip_expiry_date: Option<i64>,
    /// Avatar URL in the external blob store
    pub avatar: Option<String>,
}

impl UserProfile {
    /// VIP access holds only while the expiry lies strictly in the future.
    ///
    /// Evaluated against the clock on every call — an expired VIP is denied
    /// without any intervening profile write.
    pub fn is_vip_valid(&self, now: i64) -> bool {
        self.role == Role::Vip && self.vip_expiry_date.is_some_and(|expiry| expiry > now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_roundtrip() {
        for role in [Role::Regular, Role::Vip, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("staff"), None);
    }

    #[test]
    fn test_default_profile_is_regular() {
        let profile = UserProfile::default();
        assert_eq!(profile.role, Role::Regular);
        assert!(profile.vip_expiry_date.is_none());
        assert!(!profile.is_vip_valid(0));
    }

    #[test]
    fn test_vip_valid_before_expiry() {
        let profile = UserProfile {
            role: Role::Vip,
            vip_expiry_date: Some(1_000),
            avatar: None,
        };
        assert!(profile.is_vip_valid(999));
        // Expiry is exclusive: at and after the instant, access is gone
        assert!(!profile.is_vip_valid(1_000));
        assert!(!profile.is_vip_valid(1_001));
    }

    #[test]
    fn test_vip_role_without_expiry_is_invalid() {
        let profile = UserProfile {
            role: Role::Vip,
            vip_expiry_date: None,
            avatar: None,
        };
        assert!(!profile.is_vip_valid(0));
    }

    #[test]
    fn test_admin_is_not_vip() {
        let profile = UserProfile {
            role: Role::Admin,
            vip_expiry_date: Some(i64::MAX),
            avatar: None,
        };
        assert!(!profile.is_vip_valid(0));
        assert!(profile.role.is_admin());
    }
}
