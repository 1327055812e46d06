//! Procedure input extraction.
//!
//! Queries carry their input as JSON in the `input` query parameter,
//! mutations as the JSON request body. Either way the input is parsed and
//! validated here, before the handler (and therefore the store) runs.

use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, Query, Request};
use axum::http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use billsplit_shared::validate::Validate;
use billsplit_shared::ValidationError;

use crate::error::ServerError;

/// A parsed and validated procedure input.
#[derive(Debug)]
pub struct RpcInput<T>(pub T);

#[derive(Deserialize)]
struct QueryParams {
    input: Option<String>,
}

#[async_trait]
impl<S, T> FromRequest<S> for RpcInput<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Send,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let raw = if req.method() == Method::GET {
            let Query(params) = Query::<QueryParams>::try_from_uri(req.uri())
                .map_err(|e| ValidationError::Malformed(e.body_text()))?;
            Bytes::from(params.input.unwrap_or_else(|| "null".to_string()))
        } else {
            Bytes::from_request(req, state).await.map_err(|e| {
                if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                    ServerError::PayloadTooLarge(e.body_text())
                } else {
                    ServerError::BadRequest(e.body_text())
                }
            })?
        };

        let input: T = serde_json::from_slice(&raw)
            .map_err(|e| ValidationError::Malformed(e.to_string()))?;
        input.validate()?;

        Ok(RpcInput(input))
    }
}
