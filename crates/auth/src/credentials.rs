//! Credential payloads for registration and login.

use serde::Deserialize;
use validator::Validate;

/// Registration payload.
///
/// Missing fields deserialize as empty strings so the field rules report them.
#[derive(Clone, Deserialize, Validate)]
pub struct RegisterUser {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "email is required"),
        email(message = "email is not a valid address")
    )]
    pub email: String,

    #[serde(default)]
    #[validate(length(
        min = 6,
        max = 100,
        message = "password must be between 6 and 100 characters"
    ))]
    pub password: String,

    #[serde(default)]
    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub confirm_password: String,
}

/// Login payload.
#[derive(Clone, Deserialize, Validate)]
pub struct LoginUser {
    #[serde(default)]
    #[validate(
        length(min = 1, message = "email is required"),
        email(message = "email is not a valid address")
    )]
    pub email: String,

    /// Only presence is checked here; length rules belong to registration.
    #[serde(default)]
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

impl core::fmt::Debug for RegisterUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegisterUser")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl core::fmt::Debug for LoginUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoginUser")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}
