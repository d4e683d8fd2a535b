use axum::{
    extract::Request,
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::config;
use crate::error::ApiError;

/// Acting user id supplied by the trusted upstream auth layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Principal(pub i64);

impl Principal {
    pub fn id(&self) -> i64 {
        self.0
    }
}

/// Reads the principal header and injects [`Principal`] into the request
pub async fn principal_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = &config::config().security.principal_header;
    let principal = extract_principal(&headers, header).map_err(ApiError::unauthorized)?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}

fn extract_principal(headers: &HeaderMap, header: &str) -> Result<Principal, String> {
    let value = headers
        .get(header)
        .ok_or_else(|| format!("Missing {} header", header))?;

    value
        .to_str()
        .ok()
        .and_then(|s| s.trim().parse::<i64>().ok())
        .map(Principal)
        .ok_or_else(|| format!("Invalid {} header", header))
}
