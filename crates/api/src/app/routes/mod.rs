use std::sync::Arc;

use axum::Router;

use supplydesk_auth::TokenIssuer;

pub mod identity;
pub mod suppliers;
pub mod system;

/// Router for the supplier and identity endpoints.
pub fn router(tokens: Arc<TokenIssuer>) -> Router {
    Router::new()
        .nest("/fornecedor", suppliers::router(tokens))
        .merge(identity::router())
}
