use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::UserRole;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,   // User ID
    pub role: UserRole, // User role
    pub exp: usize,    // Expiration time
    pub iat: usize,    // Issued at
}

/// Issues a signed bearer token for a user
pub fn issue_jwt(user_id: Uuid, role: UserRole, secret: &str, expires_in: i64) -> Result<String> {
    let now = Utc::now().timestamp();
    let claims = JwtClaims {
        sub: user_id.to_string(),
        role,
        exp: (now + expires_in) as usize,
        iat: now as usize,
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")
}

/// Decodes and validates a bearer token
pub fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims> {
    let mut validation = Validation::new(Algorithm::HS256);

    // Allow for some clock skew
    validation.leeway = 60;
    validation.validate_aud = false;

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());

    let token_data = decode::<JwtClaims>(token, &decoding_key, &validation)
        .context("Failed to decode JWT token")?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-for-testing-only-min-32-chars";

    #[test]
    fn issue_then_decode_roundtrip() {
        let user_id = Uuid::new_v4();
        let token = issue_jwt(user_id, UserRole::Instructor, SECRET, 3600).unwrap();

        let claims = decode_jwt(&token, SECRET).unwrap();
        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.role, UserRole::Instructor);
    }

    #[test]
    fn expired_token_is_rejected() {
        // Past the 60s leeway
        let token = issue_jwt(Uuid::new_v4(), UserRole::Student, SECRET, -120).unwrap();
        assert!(decode_jwt(&token, SECRET).is_err());
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_jwt(Uuid::new_v4(), UserRole::Student, SECRET, 3600).unwrap();
        assert!(decode_jwt(&token, "another-secret-key-also-32-chars-long!!").is_err());
    }
}
