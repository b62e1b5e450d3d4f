//! `supplydesk-auth`: identity and authorization boundary.
//!
//! Credential checks, lockout, token issuance and claim-based policies.
//! Decoupled from HTTP; storage is reached through [`UserStore`].

pub mod authorize;
pub mod claim;
pub mod claims;
pub mod config;
pub mod credentials;
pub mod error;
pub mod password;
pub mod policy;
pub mod roles;
pub mod service;
pub mod store;
pub mod token;
pub mod user;

pub use authorize::{AuthzError, Principal, authorize, authorize_policy};
pub use claim::UserClaim;
pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use config::{IdentitySettings, JwtSettings};
pub use credentials::{LoginUser, RegisterUser};
pub use error::{AuthError, IdentityError};
pub use password::PasswordPolicy;
pub use policy::{ADD_SUPPLIER, DELETE_SUPPLIER, Policy, SUPPLIER_POLICIES, UPDATE_SUPPLIER};
pub use roles::Role;
pub use service::IdentityService;
pub use store::{StoreError, UserStore};
pub use token::{IssuedToken, TokenError, TokenIssuer, UserToken};
pub use user::{LockoutPolicy, UserAccount, normalize_email};
