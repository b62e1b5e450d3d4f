use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use supplydesk_auth::{Policy, Principal, TokenIssuer, authorize_policy};

use crate::app::errors::json_error;

/// State for one policy-gated route: which policy, and how to read tokens.
#[derive(Clone)]
pub struct PolicyGate {
    pub policy: Policy,
    pub tokens: Arc<TokenIssuer>,
}

impl PolicyGate {
    pub fn new(policy: Policy, tokens: Arc<TokenIssuer>) -> Self {
        Self { policy, tokens }
    }
}

/// Authenticate the bearer token, then evaluate the route's policy.
///
/// Missing/invalid token -> 401, policy not satisfied -> 403. On success the
/// caller's [`Principal`] is available to the handler as an extension.
pub async fn require_policy(
    State(gate): State<PolicyGate>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_bearer(req.headers()).map_err(|status| {
        json_error(status, "unauthorized", "missing or malformed bearer token")
    })?;

    let claims = gate.tokens.validate(token).map_err(|e| {
        tracing::debug!(error = %e, "token rejected");
        json_error(StatusCode::UNAUTHORIZED, "unauthorized", "invalid token")
    })?;

    let principal = Principal::from_claims(&claims);
    if let Err(e) = authorize_policy(&principal, &gate.policy) {
        tracing::info!(user_id = %principal.user_id, policy = %gate.policy, "policy denied");
        return Err(json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()));
    }

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderValue, header::AUTHORIZATION};

    use super::*;

    fn headers(value: &str) -> HeaderMap {
        let mut h = HeaderMap::new();
        h.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        h
    }

    #[test]
    fn bearer_token_is_extracted() {
        assert_eq!(extract_bearer(&headers("Bearer abc.def")), Ok("abc.def"));
    }

    #[test]
    fn missing_or_malformed_header_is_unauthorized() {
        assert_eq!(extract_bearer(&HeaderMap::new()), Err(StatusCode::UNAUTHORIZED));
        assert_eq!(extract_bearer(&headers("Basic abc")), Err(StatusCode::UNAUTHORIZED));
        assert_eq!(extract_bearer(&headers("Bearer   ")), Err(StatusCode::UNAUTHORIZED));
    }
}
