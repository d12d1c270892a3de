//! Request guards.

use std::future::{ready, Ready};

use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use tracing::debug;

use crate::api::AppState;
use crate::error::ApiError;

#[derive(Debug, Deserialize)]
struct Claims {
    #[allow(dead_code)]
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

/// Bearer-token guard for mutating endpoints.
///
/// When auth is disabled in config (the default), every request passes.
/// When enabled, the request must carry `Authorization: Bearer <jwt>`
/// signed with the configured secret.
pub struct AuthGuard;

impl FromRequest for AuthGuard {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authorize(req))
    }
}

fn authorize(req: &HttpRequest) -> Result<AuthGuard, ApiError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| ApiError::Unauthorized("authorization is not configured".to_string()))?;

    if !state.auth.enabled {
        return Ok(AuthGuard);
    }

    let header = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("missing Authorization header".to_string()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("expected a Bearer token".to_string()))?;

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(state.auth.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map_err(|err| {
        debug!("token rejected: {}", err);
        ApiError::Unauthorized("invalid or expired token".to_string())
    })?;

    Ok(AuthGuard)
}
