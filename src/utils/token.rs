// utils/token.rs
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{ErrorMessage, HttpError};

/// Claims of the access token issued by the hosted auth provider. `sub` is the user id.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
}

pub fn decode_token<T: Into<String>>(token: T, secret: &[u8]) -> Result<String, HttpError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // hosted-auth tokens carry an audience we do not pin
    validation.validate_aud = false;

    let decoded = decode::<TokenClaims>(&token.into(), &DecodingKey::from_secret(secret), &validation);
    match decoded {
        Ok(token) => Ok(token.claims.sub),
        Err(_) => Err(HttpError::unauthorized(ErrorMessage::InvalidToken.to_string())),
    }
}

#[cfg(test)]
pub fn create_token(user_id: &str, secret: &[u8], expires_in_minutes: i64) -> String {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{encode, EncodingKey, Header};

    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        iat: now.timestamp() as usize,
        exp: (now + Duration::minutes(expires_in_minutes)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret)).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_token_issued_with_same_secret() {
        let token = create_token("6f1c0e9c-31f4-4b57-9a57-5f0f6d1b8a11", b"secret", 60);
        let sub = decode_token(token, b"secret").unwrap();
        assert_eq!(sub, "6f1c0e9c-31f4-4b57-9a57-5f0f6d1b8a11");
    }

    #[test]
    fn rejects_wrong_secret_and_expired_tokens() {
        let token = create_token("user", b"secret", 60);
        assert!(decode_token(token, b"other").is_err());

        let expired = create_token("user", b"secret", -120);
        assert!(decode_token(expired, b"secret").is_err());

        assert!(decode_token("not.a.jwt", b"secret").is_err());
    }
}
