use super::config::JwtConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Default lifetime of tokens minted by [`JwtAuth::create_token`].
pub const ACCESS_TOKEN_TTL: i64 = 900; // 15 minutes

/// Claims carried by a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    /// Subject (who the caller is)
    pub sub: String,
    /// Role claim; absent or non-string values decode as `None`
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub role: Option<String>,
    pub exp: i64,
    pub iat: i64,
    #[serde(default)]
    pub jti: String,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_str().map(str::to_owned)))
}

/// HS256 signer and verifier.
#[derive(Clone)]
pub struct JwtAuth {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtAuth {
    pub fn new(config: &JwtConfig) -> Self {
        tracing::info!("JWT auth initialized");
        Self {
            encoding: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding: DecodingKey::from_secret(config.secret.as_bytes()),
        }
    }

    /// Mint a token for `subject`.
    ///
    /// The service only consumes tokens; this exists for operators and tests.
    pub fn create_token(
        &self,
        subject: &str,
        role: Option<&str>,
        ttl_seconds: i64,
    ) -> eyre::Result<String> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: subject.to_string(),
            role: role.map(str::to_string),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Verify signature and expiry, then decode the claims.
    pub fn verify_token(&self, token: &str) -> eyre::Result<JwtClaims> {
        let data = decode::<JwtClaims>(token, &self.decoding, &Validation::new(Algorithm::HS256))?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> JwtAuth {
        JwtAuth::new(&JwtConfig::new("this-is-a-valid-secret-with-32-chars!").unwrap())
    }

    #[test]
    fn test_token_round_trip_keeps_role() {
        let auth = auth();
        let token = auth.create_token("operator-7", Some("admin"), ACCESS_TOKEN_TTL).unwrap();

        let claims = auth.verify_token(&token).unwrap();
        assert_eq!(claims.sub, "operator-7");
        assert_eq!(claims.role.as_deref(), Some("admin"));
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_token_without_role() {
        let auth = auth();
        let token = auth.create_token("operator-7", None, ACCESS_TOKEN_TTL).unwrap();

        assert_eq!(auth.verify_token(&token).unwrap().role, None);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let auth = auth();
        let token = auth.create_token("operator-7", Some("admin"), -3600).unwrap();

        assert!(auth.verify_token(&token).is_err());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = JwtAuth::new(&JwtConfig::new("another-secret-that-is-32-chars-long").unwrap());
        let token = other.create_token("operator-7", Some("admin"), ACCESS_TOKEN_TTL).unwrap();

        assert!(auth().verify_token(&token).is_err());
    }

    #[test]
    fn test_non_string_role_decodes_as_none() {
        let claims: JwtClaims = serde_json::from_value(serde_json::json!({
            "sub": "operator-7",
            "role": 42,
            "exp": 0,
            "iat": 0
        }))
        .unwrap();

        assert_eq!(claims.role, None);
        assert_eq!(claims.jti, "");
    }
}
