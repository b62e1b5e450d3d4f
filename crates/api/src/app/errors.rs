use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use supplydesk_auth::AuthError;
use supplydesk_core::{DomainError, FieldErrors};
use supplydesk_suppliers::SupplierError;

use crate::app::dto::ValidationProblem;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn validation_problem(errors: FieldErrors) -> axum::response::Response {
    (StatusCode::BAD_REQUEST, axum::Json(ValidationProblem::new(errors))).into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(fields) => validation_problem(fields),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound(what) => {
            json_error(StatusCode::NOT_FOUND, "not_found", format!("{what} not found"))
        }
        e @ DomainError::NotPersisted => {
            json_error(StatusCode::BAD_REQUEST, "not_persisted", e.to_string())
        }
    }
}

pub fn supplier_error_to_response(err: SupplierError) -> axum::response::Response {
    match err {
        SupplierError::Domain(e) => domain_error_to_response(e),
        SupplierError::Repository(e) => {
            tracing::warn!(error = %e, "supplier store failure");
            internal_error()
        }
    }
}

pub fn auth_error_to_response(err: AuthError) -> axum::response::Response {
    match err {
        AuthError::Validation(fields) => validation_problem(fields),
        AuthError::Rejected(errors) => (
            StatusCode::BAD_REQUEST,
            axum::Json(json!({
                "error": "identity_rejected",
                "message": "the account could not be created",
                "errors": errors,
            })),
        )
            .into_response(),
        e @ AuthError::InvalidCredentials => {
            json_error(StatusCode::BAD_REQUEST, "invalid_credentials", e.to_string())
        }
        e @ AuthError::AccountLocked => {
            json_error(StatusCode::BAD_REQUEST, "account_locked", e.to_string())
        }
        e @ (AuthError::Store(_) | AuthError::Token(_) | AuthError::Crypto(_)) => {
            tracing::warn!(error = %e, "identity failure");
            internal_error()
        }
    }
}

pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_body", rejection.body_text())
}

pub fn internal_error() -> axum::response::Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", "internal server error")
}
