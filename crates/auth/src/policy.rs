//! Named authorization policies.

/// A named rule: "the caller must present a claim of this type".
///
/// Any claim value satisfies the rule.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Policy {
    pub name: &'static str,
    pub required_claim: &'static str,
}

impl Policy {
    /// Policy named after the claim it requires.
    pub const fn require_claim(claim_type: &'static str) -> Self {
        Self {
            name: claim_type,
            required_claim: claim_type,
        }
    }
}

impl core::fmt::Display for Policy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name)
    }
}

/// Gate for creating suppliers.
pub const ADD_SUPPLIER: Policy = Policy::require_claim("AdicionarFornecedor");
/// Gate for replacing suppliers.
pub const UPDATE_SUPPLIER: Policy = Policy::require_claim("AtualizarFornecedor");
/// Gate for deleting suppliers.
pub const DELETE_SUPPLIER: Policy = Policy::require_claim("ExcluirFornecedor");

pub const SUPPLIER_POLICIES: [Policy; 3] = [ADD_SUPPLIER, UPDATE_SUPPLIER, DELETE_SUPPLIER];
