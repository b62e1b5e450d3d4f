//! Role names carried on accounts and tokens.

use serde::{Deserialize, Serialize};

/// A role held by a user account.
///
/// Names are kept in canonical form (trimmed, lowercase), so `" Admin "` and
/// `"admin"` are the same role everywhere: in memory, in storage and inside
/// issued tokens. Supplier policies are claim-based and never read roles.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Role(String);

impl Role {
    /// Role granted to the bootstrap administrator.
    pub const ADMIN: &'static str = "admin";

    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().trim().to_lowercase())
    }

    pub fn admin() -> Self {
        Self::new(Self::ADMIN)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}
