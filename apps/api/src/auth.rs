//! Request authentication — resolves the caller from the `Authorization`
//! bearer token before anything else runs. A request without a valid
//! principal never reaches the credit gate or the upstream dispatcher.

use axum::{async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;

/// Claims read from the client bearer token (HS256). Expiry is enforced by
/// the validator from the raw token; only identity claims are kept.
#[derive(Debug, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub email: Option<String>,
}

/// The authenticated caller.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: Option<String>,
}

pub fn verify_token(token: &str, secret: &str) -> Result<Principal, AppError> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let data = decode::<Claims>(token, &key, &Validation::new(Algorithm::HS256)).map_err(|e| {
        tracing::warn!("token verification failed: {e}");
        AppError::Unauthorized
    })?;

    let user_id = Uuid::parse_str(&data.claims.sub).map_err(|_| AppError::Unauthorized)?;

    Ok(Principal {
        user_id,
        email: data.claims.email,
    })
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::Unauthorized)?;

        let token = header.strip_prefix("Bearer ").ok_or(AppError::Unauthorized)?;

        verify_token(token, &state.config.jwt_secret)
    }
}
