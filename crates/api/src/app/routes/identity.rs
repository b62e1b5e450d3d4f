use std::sync::Arc;

use axum::{
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::de::DeserializeOwned;

use supplydesk_auth::{LoginUser, RegisterUser};

use crate::app::errors;
use crate::app::services::AppServices;

pub fn router() -> Router {
    Router::new()
        .route("/registro", post(register))
        .route("/login", post(login))
}

/// Unwrap a JSON body, treating an unparseable or `null` body as a bad request.
fn required_body<T: DeserializeOwned>(
    body: Result<Json<Option<T>>, JsonRejection>,
) -> Result<T, axum::response::Response> {
    match body {
        Ok(Json(Some(value))) => Ok(value),
        Ok(Json(None)) => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_body",
            "request body is required",
        )),
        Err(rejection) => Err(errors::json_rejection_to_response(rejection)),
    }
}

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Option<RegisterUser>>, JsonRejection>,
) -> axum::response::Response {
    let input = match required_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.identity.register(input).await {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(e) => {
            tracing::info!(error = %e, "registration refused");
            errors::auth_error_to_response(e)
        }
    }
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    body: Result<Json<Option<LoginUser>>, JsonRejection>,
) -> axum::response::Response {
    let input = match required_body(body) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.identity.login(input).await {
        Ok(token) => (StatusCode::OK, Json(token)).into_response(),
        Err(e) => {
            tracing::info!(error = %e, "login refused");
            errors::auth_error_to_response(e)
        }
    }
}
