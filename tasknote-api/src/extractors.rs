//! Request extractors that reject with [`ApiError`] instead of axum's
//! plain-text rejections, so every 400 carries the same JSON shape.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Json, Path, Request},
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use tasknote_core::NoteId;

use crate::error::ApiError;

/// Note id taken from the `{id}` path segment.
///
/// Anything that is not a 32-bit integer is a 400, never a 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteIdPath(pub NoteId);

#[async_trait]
impl<S> FromRequestParts<S> for NoteIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::invalid_format("id", &rejection.body_text()))?;

        raw.parse::<i32>()
            .map(|id| NoteIdPath(NoteId::from(id)))
            .map_err(|_| ApiError::invalid_format("id", &raw))
    }
}

/// JSON body whose rejections become structured 400 responses.
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
