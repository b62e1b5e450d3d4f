use serde::{Deserialize, Serialize};

/// A name/value pair granted to a user account.
///
/// Policies look only at the claim type (e.g. `"AdicionarFornecedor"`);
/// the value is carried along for callers that want finer rules.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserClaim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl UserClaim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    /// Claim types compare case-insensitively; values compare exactly.
    pub fn is_type(&self, claim_type: &str) -> bool {
        self.claim_type.eq_ignore_ascii_case(claim_type)
    }
}

impl core::fmt::Display for UserClaim {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}={}", self.claim_type, self.value)
    }
}
