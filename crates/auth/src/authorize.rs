use thiserror::Error;

use supplydesk_core::UserId;

use crate::{JwtClaims, Policy, Role, UserClaim};

/// A fully resolved caller for authorization decisions.
///
/// Built from verified token claims; construction is decoupled from storage
/// and transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub email: String,
    pub claims: Vec<UserClaim>,
    pub roles: Vec<Role>,
}

impl Principal {
    pub fn from_claims(claims: &JwtClaims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email.clone(),
            claims: claims.claims.clone(),
            roles: claims.roles.clone(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthzError {
    #[error("forbidden: missing claim '{0}'")]
    MissingClaim(String),
}

/// Decide whether `caller_claims` satisfies "must present claim `required_claim`".
///
/// - No IO
/// - No panics
/// - Claim types match case-insensitively, any value is accepted
pub fn authorize(required_claim: &str, caller_claims: &[UserClaim]) -> Result<(), AuthzError> {
    if caller_claims.iter().any(|c| c.is_type(required_claim)) {
        Ok(())
    } else {
        Err(AuthzError::MissingClaim(required_claim.to_string()))
    }
}

/// Evaluate a named policy for a principal.
pub fn authorize_policy(principal: &Principal, policy: &Policy) -> Result<(), AuthzError> {
    authorize(policy.required_claim, &principal.claims)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ADD_SUPPLIER, DELETE_SUPPLIER};

    fn principal(claims: Vec<UserClaim>) -> Principal {
        Principal {
            user_id: UserId::new(),
            email: "a@a.com".into(),
            claims,
            roles: vec![],
        }
    }

    #[test]
    fn claim_present_is_allowed() {
        let claims = [UserClaim::new("AdicionarFornecedor", "true")];
        assert_eq!(authorize("AdicionarFornecedor", &claims), Ok(()));
    }

    #[test]
    fn claim_type_match_ignores_case() {
        let claims = [UserClaim::new("adicionarfornecedor", "")];
        assert_eq!(authorize("AdicionarFornecedor", &claims), Ok(()));
    }

    #[test]
    fn no_claims_is_denied() {
        assert_eq!(
            authorize("ExcluirFornecedor", &[]),
            Err(AuthzError::MissingClaim("ExcluirFornecedor".into()))
        );
    }

    #[test]
    fn other_claims_do_not_satisfy_policy() {
        let p = principal(vec![UserClaim::new("AdicionarFornecedor", "true")]);
        assert!(authorize_policy(&p, &ADD_SUPPLIER).is_ok());
        assert!(matches!(
            authorize_policy(&p, &DELETE_SUPPLIER),
            Err(AuthzError::MissingClaim(_))
        ));
    }
}
