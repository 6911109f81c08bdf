use std::sync::Arc;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Query, Request},
    http::request::Parts,
};
use dealerdesk::{DealerDesk, OtpCredentials, RepositoryProvider};
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;

use crate::error::ApiError;

pub struct AppState<R: RepositoryProvider> {
    pub desk: Arc<DealerDesk<R>>,
}

impl<R: RepositoryProvider> Clone for AppState<R> {
    fn clone(&self) -> Self {
        Self {
            desk: self.desk.clone(),
        }
    }
}

/// A JSON body whose `email` and `otp` fields passed the passcode check.
///
/// The payload is parsed before the code is checked so that a malformed
/// request does not use up the code.
pub struct Gated<T>(pub T);

impl<R, T> FromRequest<AppState<R>> for Gated<T>
where
    R: RepositoryProvider,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &AppState<R>) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state).await?;

        let credentials = OtpCredentials::deserialize(&body)
            .map_err(|e| ApiError::BadRequest(e.to_string()))?;
        let payload = T::deserialize(&body).map_err(|e| ApiError::BadRequest(e.to_string()))?;

        state.desk.verify_otp(&credentials).await?;
        Ok(Gated(payload))
    }
}

/// Query parameters whose `email` and `otp` passed the passcode check.
pub struct GatedQuery<T>(pub T);

impl<R, T> FromRequestParts<AppState<R>> for GatedQuery<T>
where
    R: RepositoryProvider,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let Query(credentials) = Query::<OtpCredentials>::try_from_uri(&parts.uri)?;
        let Query(params) = Query::<T>::try_from_uri(&parts.uri)?;

        state.desk.verify_otp(&credentials).await?;
        Ok(GatedQuery(params))
    }
}

/// Query parameters for read-only endpoints, rejected as JSON errors.
pub struct Params<T>(pub T);

impl<S, T> FromRequestParts<S> for Params<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<T>::try_from_uri(&parts.uri)?;
        Ok(Params(params))
    }
}

/// A JSON body for ungated endpoints, rejected as JSON errors.
pub struct Body<T>(pub T);

impl<S, T> FromRequest<S> for Body<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Send,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state).await?;
        Ok(Body(payload))
    }
}
