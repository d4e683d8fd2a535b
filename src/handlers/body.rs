use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::Value;

use crate::error::ApiError;

/// JSON request body where an empty body reads as `null`. Malformed JSON is
/// reported in the standard envelope rather than as a bare rejection.
#[derive(Debug, Clone)]
pub struct JsonBody(pub Value);

#[async_trait]
impl<S> FromRequest<S> for JsonBody
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(JsonBody(Value::Null));
        }
        serde_json::from_slice(&bytes)
            .map(JsonBody)
            .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))
    }
}
