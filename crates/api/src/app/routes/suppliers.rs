use std::sync::Arc;

use axum::{
    extract::{Extension, Path, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};

use supplydesk_auth::{
    ADD_SUPPLIER, DELETE_SUPPLIER, Policy, Principal, TokenIssuer, UPDATE_SUPPLIER,
};
use supplydesk_core::SupplierId;
use supplydesk_suppliers::SupplierDraft;

use crate::app::{dto, errors};
use crate::app::services::AppServices;
use crate::middleware::{PolicyGate, require_policy};

/// Reads are open; each write carries its own policy gate.
pub fn router(tokens: Arc<TokenIssuer>) -> Router {
    let gate = |policy: Policy| {
        let state = PolicyGate::new(policy, tokens.clone());
        axum::middleware::from_fn_with_state(state, require_policy)
    };

    Router::new()
        .route("/", get(list_suppliers))
        .route("/:id", get(get_supplier))
        .route("/", post(create_supplier).route_layer(gate(ADD_SUPPLIER)))
        .route("/:id", put(update_supplier).route_layer(gate(UPDATE_SUPPLIER)))
        .route("/:id", delete(delete_supplier).route_layer(gate(DELETE_SUPPLIER)))
}

pub async fn list_suppliers(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match services.suppliers.list().await {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::supplier_error_to_response(e),
    }
}

pub async fn get_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SupplierId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.suppliers.get(id).await {
        Ok(supplier) => (StatusCode::OK, Json(supplier)).into_response(),
        Err(e) => errors::supplier_error_to_response(e),
    }
}

pub async fn create_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<Principal>,
    body: Result<Json<SupplierDraft>, JsonRejection>,
) -> axum::response::Response {
    let Json(draft) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.suppliers.create(draft).await {
        Ok(supplier) => {
            tracing::info!(
                user_id = %caller.user_id,
                supplier_id = %supplier.id,
                "supplier created"
            );
            (
                StatusCode::CREATED,
                [(header::LOCATION, dto::supplier_location(supplier.id))],
                Json(supplier),
            )
                .into_response()
        }
        Err(e) => errors::supplier_error_to_response(e),
    }
}

pub async fn update_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<Principal>,
    Path(id): Path<String>,
    body: Result<Json<SupplierDraft>, JsonRejection>,
) -> axum::response::Response {
    let id: SupplierId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let Json(draft) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection_to_response(rejection),
    };

    match services.suppliers.update(id, draft).await {
        Ok(()) => {
            tracing::info!(user_id = %caller.user_id, supplier_id = %id, "supplier replaced");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::supplier_error_to_response(e),
    }
}

pub async fn delete_supplier(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<Principal>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: SupplierId = match id.parse() {
        Ok(v) => v,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.suppliers.delete(id).await {
        Ok(()) => {
            tracing::info!(user_id = %caller.user_id, supplier_id = %id, "supplier deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Err(e) => errors::supplier_error_to_response(e),
    }
}
