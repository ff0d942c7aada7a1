//! Authentication middleware for JWT token validation
//!
//! Token issuance lives in the external auth service; this service only
//! verifies bearer tokens against the shared public key and resolves the
//! acting user.

use axum::{
    http::Request,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::env;
use tracing::error;
use uuid::Uuid;

use crate::error::ApiError;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: Uuid,
    /// Issued at time
    pub iat: u64,
    /// Expiration time
    pub exp: u64,
}

/// Authenticated user information
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Public key for verifying tokens
    pub public_key: String,
}

impl JwtConfig {
    /// Create a new JwtConfig from environment variables
    pub fn from_env() -> Result<Self, String> {
        let public_key = env::var("JWT_PUBLIC_KEY")
            .map_err(|_| "JWT_PUBLIC_KEY environment variable not set".to_string())?;

        // The variable holds either the PEM itself or a path to it
        let public_key = if public_key.starts_with("-----BEGIN") {
            public_key
        } else {
            std::fs::read_to_string(&public_key)
                .map_err(|e| format!("Failed to read public key file: {}", e))?
                .trim()
                .to_string()
        };

        Ok(JwtConfig { public_key })
    }
}

fn decode_bearer_token(auth_header: &str) -> Result<AuthUser, ApiError> {
    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Unauthorized)?;

    let jwt_config = JwtConfig::from_env().map_err(|e| {
        error!("Failed to load JWT config: {}", e);
        ApiError::InternalServerError
    })?;

    let decoding_key =
        DecodingKey::from_rsa_pem(jwt_config.public_key.as_bytes()).map_err(|e| {
            error!("Failed to create decoding key: {}", e);
            ApiError::InternalServerError
        })?;

    let mut validation = Validation::new(jsonwebtoken::Algorithm::RS256);
    validation.validate_exp = true;

    let token_data =
        jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation).map_err(|e| {
            error!("Failed to validate token: {}", e);
            ApiError::Unauthorized
        })?;

    Ok(AuthUser {
        id: token_data.claims.sub,
    })
}

/// Authentication middleware; rejects requests without a valid bearer token
pub async fn auth_middleware(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;

    let user = decode_bearer_token(auth_header)?;
    req.extensions_mut().insert(user);

    Ok(next.run(req).await)
}

/// Optional authentication middleware for public routes whose responses
/// carry viewer-relative flags; anonymous requests pass through
pub async fn optional_auth_middleware(
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .map(str::to_owned);

    if let Some(header) = auth_header {
        if let Ok(user) = decode_bearer_token(&header) {
            req.extensions_mut().insert(user);
        }
    }

    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_jwt_config_requires_public_key() {
        let saved = env::var("JWT_PUBLIC_KEY").ok();
        env::remove_var("JWT_PUBLIC_KEY");

        assert!(JwtConfig::from_env().is_err());

        if let Some(saved) = saved {
            env::set_var("JWT_PUBLIC_KEY", saved);
        }
    }

    #[test]
    #[serial]
    fn test_jwt_config_accepts_inline_pem() {
        env::set_var("JWT_PUBLIC_KEY", "-----BEGIN PUBLIC KEY-----\nabc\n-----END PUBLIC KEY-----");

        let config = JwtConfig::from_env().expect("inline PEM should be accepted");
        assert!(config.public_key.starts_with("-----BEGIN"));

        env::remove_var("JWT_PUBLIC_KEY");
    }

    #[test]
    fn test_bearer_prefix_is_required() {
        assert!(matches!(
            decode_bearer_token("Token abc"),
            Err(ApiError::Unauthorized)
        ));
    }
}
