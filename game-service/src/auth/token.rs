use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared::{Result, ServiceError, UserId};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: &UserId, ttl_secs: i64) -> Self {
        let now = Utc::now().timestamp();
        Self {
            sub: user_id.0,
            iat: now,
            exp: now + ttl_secs,
        }
    }
}

/// Verification failures, kept distinguishable for the callers that care;
/// the service boundary collapses all three to an unauthorized outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Malformed token")]
    Malformed,

    #[error("Expired token")]
    Expired,

    #[error("Bad token signature")]
    BadSignature,
}

pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl_secs: i64) -> Self {
        // Zero leeway: a token is valid until its expiry instant and not a
        // tick longer.
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl_secs,
        }
    }

    pub fn issue(&self, user_id: &UserId) -> Result<String> {
        self.encode(&Claims::new(user_id, self.ttl_secs))
    }

    pub fn encode(&self, claims: &Claims) -> Result<String> {
        jsonwebtoken::encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| ServiceError::Internal(format!("Token encode error: {}", e)))
    }

    pub fn verify(&self, token: &str) -> std::result::Result<UserId, TokenError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| UserId(data.claims.sub))
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::BadSignature,
                _ => TokenError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(b"test-secret", 3600)
    }

    #[test]
    fn test_issue_then_verify() {
        let service = service();
        let user_id = UserId::new();

        let token = service.issue(&user_id).unwrap();
        assert_eq!(service.verify(&token).unwrap(), user_id);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = service();
        let user_id = UserId::new();

        let token = service.encode(&Claims::new(&user_id, -10)).unwrap();
        assert_eq!(service.verify(&token), Err(TokenError::Expired));
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = service();
        let token = service.issue(&UserId::new()).unwrap();

        // Swap the signature for one minted with a different secret.
        let forged_signature = TokenService::new(b"other-secret", 3600)
            .issue(&UserId::new())
            .unwrap();
        let tampered = format!(
            "{}.{}",
            token.rsplit_once('.').unwrap().0,
            forged_signature.rsplit_once('.').unwrap().1
        );

        assert_eq!(service.verify(&tampered), Err(TokenError::BadSignature));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let service = service();
        assert_eq!(service.verify("not-a-token"), Err(TokenError::Malformed));
        assert_eq!(service.verify(""), Err(TokenError::Malformed));
    }

    #[test]
    fn test_claims_carry_lifetime() {
        let user_id = UserId::new();
        let claims = Claims::new(&user_id, 604_800);
        assert_eq!(claims.exp - claims.iat, 604_800);
        assert_eq!(claims.sub, user_id.0);
    }
}
