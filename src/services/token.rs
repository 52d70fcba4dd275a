use anyhow::{Context, Result, anyhow};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::models::Role;

/// Authenticated identity attached to a request. Built exactly once per
/// request from a verified token; handlers never look at raw JWT claims.
#[derive(Debug, Clone)]
pub struct Claim {
    pub subject_id: Uuid,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    sub: Uuid,
    email: String,
    role: String,
    iat: i64,
    exp: i64,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_minutes: i64,
    validation: Validation,
}

impl TokenService {
    #[must_use]
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            ttl_minutes: i64::try_from(config.token_ttl_minutes).unwrap_or(i64::MAX),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn issue(&self, subject_id: Uuid, email: &str, role: Role) -> Result<String> {
        let now = chrono::Utc::now();
        let claims = JwtClaims {
            sub: subject_id,
            email: email.to_string(),
            role: role.as_str().to_string(),
            iat: now.timestamp(),
            exp: (now + chrono::Duration::minutes(self.ttl_minutes)).timestamp(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .context("Failed to sign access token")
    }

    /// Verify signature and expiry, then normalize into a [`Claim`]. Tokens
    /// carrying a role outside the known set are rejected here rather than
    /// leaking into authorization checks.
    pub fn verify(&self, token: &str) -> Result<Claim> {
        let data = jsonwebtoken::decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .context("Invalid or expired token")?;

        let role = data
            .claims
            .role
            .parse::<Role>()
            .map_err(|e| anyhow!("Token carries an unknown role: {e}"))?;

        Ok(Claim {
            subject_id: data.claims.sub,
            email: data.claims.email,
            role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new(&AuthConfig {
            jwt_secret: "test-secret".to_string(),
            token_ttl_minutes: 60,
        })
    }

    #[test]
    fn issues_and_verifies_round_trip() {
        let svc = service();
        let id = Uuid::new_v4();

        let token = svc.issue(id, "a@b.c", Role::Instructor).unwrap();
        let claim = svc.verify(&token).unwrap();

        assert_eq!(claim.subject_id, id);
        assert_eq!(claim.email, "a@b.c");
        assert_eq!(claim.role, Role::Instructor);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let svc = service();
        let other = TokenService::new(&AuthConfig {
            jwt_secret: "different-secret".to_string(),
            token_ttl_minutes: 60,
        });

        let token = other.issue(Uuid::new_v4(), "a@b.c", Role::Student).unwrap();
        assert!(svc.verify(&token).is_err());
    }

    #[test]
    fn rejects_garbage() {
        assert!(service().verify("not-a-token").is_err());
    }
}
