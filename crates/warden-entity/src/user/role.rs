//! Role bitmask codec.
//!
//! A user's capabilities are stored as a single integer column where each
//! bit grants one [`Role`]. [`RoleSet`] is the only place bit positions are
//! interpreted; everything else asks membership questions through it.
//!
//! Bits outside the known roles are carried through untouched so that a
//! newer writer sharing the same table never loses data to an older one.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use warden_core::AppError;

/// A single capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// May present an activation token (pending accounts only).
    ReadActivationToken,
    /// May log in and open sessions.
    CreateSession,
    /// May read its own sessions.
    ReadSession,
    /// May log out.
    DeleteSession,
    /// A second-factor secret has been generated.
    OtpEnabled,
    /// The second factor was confirmed and is enforced at login.
    OtpConfigured,
    /// Administrative flag for enabled accounts.
    AccountEnabled,
}

impl Role {
    /// Every known role, in bit order.
    pub const ALL: [Role; 7] = [
        Role::ReadActivationToken,
        Role::CreateSession,
        Role::ReadSession,
        Role::DeleteSession,
        Role::OtpEnabled,
        Role::OtpConfigured,
        Role::AccountEnabled,
    ];

    /// Bit assigned to this role. Values are stable and persisted.
    pub const fn bit(self) -> u64 {
        match self {
            Role::ReadActivationToken => 1,
            Role::CreateSession => 1 << 1,
            Role::ReadSession => 1 << 2,
            Role::DeleteSession => 1 << 3,
            Role::OtpEnabled => 1 << 4,
            Role::OtpConfigured => 1 << 5,
            Role::AccountEnabled => 1 << 6,
        }
    }

    /// External (snake_case) name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::ReadActivationToken => "read_activation_token",
            Role::CreateSession => "create_session",
            Role::ReadSession => "read_session",
            Role::DeleteSession => "delete_session",
            Role::OtpEnabled => "otp_enabled",
            Role::OtpConfigured => "otp_configured",
            Role::AccountEnabled => "account_enabled",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == wanted)
            .ok_or_else(|| AppError::validation(format!("Invalid role: '{s}'")))
    }
}

/// Set of [`Role`]s packed into a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u64);

impl RoleSet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Roles granted at registration.
    pub const fn registration_default() -> Self {
        Self(Role::ReadActivationToken.bit())
    }

    /// Roles granted by a successful activation.
    pub const fn activation_grant() -> Self {
        Self(Role::ReadSession.bit() | Role::CreateSession.bit() | Role::DeleteSession.bit())
    }

    /// Build a set from individual roles.
    pub fn from_roles(roles: impl IntoIterator<Item = Role>) -> Self {
        roles.into_iter().fold(Self::empty(), |set, role| set.with(role))
    }

    /// Parse external role names. Any unknown name is a validation error.
    pub fn from_names<S: AsRef<str>>(names: impl IntoIterator<Item = S>) -> Result<Self, AppError> {
        names
            .into_iter()
            .map(|name| name.as_ref().parse::<Role>())
            .collect::<Result<Vec<_>, _>>()
            .map(Self::from_roles)
    }

    /// Decode the persisted integer, keeping unknown bits.
    pub const fn from_persisted(value: i64) -> Self {
        Self(value as u64)
    }

    /// Encode for storage.
    pub const fn to_persisted(self) -> i64 {
        self.0 as i64
    }

    /// Raw bits.
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Membership test.
    pub const fn has(self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    /// True when every role in `other` is present.
    pub const fn contains(self, other: RoleSet) -> bool {
        self.0 & other.0 == other.0
    }

    /// Copy of this set with `role` added.
    #[must_use]
    pub const fn with(self, role: Role) -> Self {
        Self(self.0 | role.bit())
    }

    /// Copy of this set with `role` removed.
    #[must_use]
    pub const fn without(self, role: Role) -> Self {
        Self(self.0 & !role.bit())
    }

    /// Copy of this set with every role of `other` added.
    #[must_use]
    pub const fn union(self, other: RoleSet) -> Self {
        Self(self.0 | other.0)
    }

    /// Copy of this set with every listed role added.
    #[must_use]
    pub fn add_roles(self, roles: impl IntoIterator<Item = Role>) -> Self {
        roles.into_iter().fold(self, RoleSet::with)
    }

    /// Copy of this set with every listed role removed.
    #[must_use]
    pub fn remove_roles(self, roles: impl IntoIterator<Item = Role>) -> Self {
        roles.into_iter().fold(self, RoleSet::without)
    }

    /// Add a role in place.
    pub fn add(&mut self, role: Role) {
        *self = self.with(role);
    }

    /// Remove a role in place.
    pub fn remove(&mut self, role: Role) {
        *self = self.without(role);
    }

    /// Known roles present in the set, in bit order.
    pub fn roles(self) -> impl Iterator<Item = Role> {
        Role::ALL.into_iter().filter(move |role| self.has(*role))
    }

    /// External names of the known roles present in the set.
    pub fn names(self) -> Vec<String> {
        self.roles().map(|role| role.as_str().to_string()).collect()
    }

    /// Whether both second-factor bits are set.
    pub const fn otp_required(self) -> bool {
        self.has(Role::OtpEnabled) && self.has(Role::OtpConfigured)
    }

    /// Whether the set is empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for RoleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join(","))
    }
}

impl Serialize for RoleSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.roles().map(|role| role.as_str()))
    }
}

impl<'de> Deserialize<'de> for RoleSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        RoleSet::from_names(&names).map_err(serde::de::Error::custom)
    }
}

impl sqlx::Type<sqlx::Postgres> for RoleSet {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

impl<'q> sqlx::Encode<'q, sqlx::Postgres> for RoleSet {
    fn encode_by_ref(
        &self,
        buf: &mut <sqlx::Postgres as sqlx::Database>::ArgumentBuffer<'q>,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<'q, sqlx::Postgres>>::encode_by_ref(&self.to_persisted(), buf)
    }
}

impl<'r> sqlx::Decode<'r, sqlx::Postgres> for RoleSet {
    fn decode(
        value: <sqlx::Postgres as sqlx::Database>::ValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        <i64 as sqlx::Decode<'r, sqlx::Postgres>>::decode(value).map(Self::from_persisted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_are_distinct_powers_of_two() {
        let mut seen = 0u64;
        for role in Role::ALL {
            assert_eq!(role.bit().count_ones(), 1);
            assert_eq!(seen & role.bit(), 0);
            seen |= role.bit();
        }
        assert_eq!(seen, 0b111_1111);
    }

    #[test]
    fn test_registration_default() {
        let roles = RoleSet::registration_default();
        assert!(roles.has(Role::ReadActivationToken));
        assert_eq!(roles.names(), vec!["read_activation_token"]);
    }

    #[test]
    fn test_activation_transition() {
        let pending = RoleSet::registration_default();
        let active = pending
            .without(Role::ReadActivationToken)
            .union(RoleSet::activation_grant());

        assert!(!active.has(Role::ReadActivationToken));
        assert!(active.has(Role::CreateSession));
        assert!(active.has(Role::ReadSession));
        assert!(active.has(Role::DeleteSession));
        assert_eq!(active.to_persisted(), 2 | 4 | 8);
    }

    #[test]
    fn test_unknown_bits_survive_mutation() {
        let stored = RoleSet::from_persisted(1 | (1 << 40));
        let updated = stored.without(Role::ReadActivationToken).with(Role::CreateSession);
        assert_eq!(updated.to_persisted(), 2 | (1 << 40));
        assert_eq!(updated.names(), vec!["create_session"]);
    }

    #[test]
    fn test_add_roles_and_remove_roles() {
        let roles = RoleSet::empty()
            .add_roles([Role::OtpEnabled, Role::OtpConfigured, Role::CreateSession])
            .remove_roles([Role::OtpEnabled, Role::OtpConfigured]);
        assert_eq!(roles, RoleSet::from_roles([Role::CreateSession]));
    }

    #[test]
    fn test_persisted_form_parses_back() {
        for bits in [0i64, 1, 14, 127, 1 << 50, -1] {
            assert_eq!(RoleSet::from_persisted(bits).to_persisted(), bits);
        }
    }

    #[test]
    fn test_every_role_combination_round_trips() {
        for mask in 0u64..128 {
            let set = RoleSet::from_roles(Role::ALL.into_iter().filter(|r| mask & r.bit() != 0));
            assert_eq!(set.bits(), mask);
            assert_eq!(RoleSet::from_persisted(set.to_persisted()), set);
            for role in Role::ALL {
                assert_eq!(set.has(role), mask & role.bit() != 0);
            }
        }
    }

    #[test]
    fn test_add_and_remove_are_idempotent() {
        let mut roles = RoleSet::empty();
        roles.add(Role::OtpEnabled);
        roles.add(Role::OtpEnabled);
        assert_eq!(roles.bits(), Role::OtpEnabled.bit());
        roles.remove(Role::OtpConfigured);
        roles.remove(Role::OtpEnabled);
        assert!(roles.is_empty());
    }

    #[test]
    fn test_otp_required_needs_both_bits() {
        let enabled = RoleSet::from_roles([Role::OtpEnabled]);
        assert!(!enabled.otp_required());
        assert!(enabled.with(Role::OtpConfigured).otp_required());
        assert!(!RoleSet::from_roles([Role::OtpConfigured]).otp_required());
    }

    #[test]
    fn test_from_names_rejects_unknown() {
        assert!(RoleSet::from_names(["create_session", "superuser"]).is_err());
        let parsed = RoleSet::from_names(["Create_Session", " read_session "]).expect("known names");
        assert_eq!(parsed, RoleSet::from_roles([Role::CreateSession, Role::ReadSession]));
    }

    #[test]
    fn test_serializes_as_names() {
        let roles = RoleSet::from_roles([Role::DeleteSession, Role::CreateSession]);
        let json = serde_json::to_string(&roles).expect("serialize");
        assert_eq!(json, r#"["create_session","delete_session"]"#);
        let back: RoleSet = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, roles);
    }
}
