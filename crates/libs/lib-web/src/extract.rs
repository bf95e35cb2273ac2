//! # Extractors
//!
//! Request extractors whose rejections are [`AppError`]s, so malformed input gets the
//! same `{"detail": ...}` body as every other error.

use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::Json;
use lib_core::AppError;
use serde::de::DeserializeOwned;
use validator::Validate;

/// `Path` extractor rejecting with [`AppError::Validation`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(Path), rejection(AppError))]
pub struct AppPath<T>(pub T);

/// JSON body that is deserialized and then validated before the handler runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}
