use serde::Serialize;

use supplydesk_core::FieldErrors;

// -------------------------
// Response DTOs
// -------------------------

/// Problem-details body returned when field rules fail.
#[derive(Debug, Serialize)]
pub struct ValidationProblem {
    #[serde(rename = "type")]
    pub problem_type: &'static str,
    pub title: &'static str,
    pub status: u16,
    pub errors: FieldErrors,
}

impl ValidationProblem {
    pub const TYPE: &'static str = "https://tools.ietf.org/html/rfc9110#section-15.5.1";
    pub const TITLE: &'static str = "One or more validation errors occurred.";

    pub fn new(errors: FieldErrors) -> Self {
        Self {
            problem_type: Self::TYPE,
            title: Self::TITLE,
            status: 400,
            errors,
        }
    }
}

/// Location of a supplier resource.
pub fn supplier_location(id: impl core::fmt::Display) -> String {
    format!("/fornecedor/{id}")
}
