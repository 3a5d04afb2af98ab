use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde_json::{Map, Value};

use crate::error::ApiError;

/// Request body as a JSON object of expense fields.
///
/// A missing or blank body counts as `{}`, whatever the content type. Any
/// other body must parse as a JSON object; failures become
/// [`ApiError::BadRequest`] so the client still gets an `{error}` payload.
#[derive(Debug, Default)]
pub struct JsonFields(pub Map<String, Value>);

#[async_trait]
impl<S> FromRequest<S> for JsonFields
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;

        parse_fields(&bytes).map(JsonFields)
    }
}

fn parse_fields(bytes: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice(bytes) {
        Ok(Value::Object(fields)) => Ok(fields),
        Ok(_) => Err(ApiError::BadRequest(
            "request body must be a JSON object".to_string(),
        )),
        Err(err) => Err(ApiError::BadRequest(format!("invalid JSON body: {err}"))),
    }
}
