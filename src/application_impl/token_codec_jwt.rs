use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

pub const DEFAULT_ACCESS_TTL: Duration = Duration::from_secs(30 * 60); // 30 minutes
pub const DEFAULT_REFRESH_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60); // 7 days

#[derive(Clone)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
    pub signing_key: Vec<u8>,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String, // identifier
    auth: Authority,
    exp: i64,
    iat: i64,
    iss: String,
    aud: String,
    jti: String, // keeps two pairs minted in the same second distinct
}

pub struct JwtHs256Codec {
    cfg: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtHs256Codec {
    pub fn new(cfg: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(&cfg.signing_key);
        let decoding_key = DecodingKey::from_secret(&cfg.signing_key);
        JwtHs256Codec {
            cfg,
            encoding_key,
            decoding_key,
        }
    }

    /// Mints a pair as if issued at `issued_at`.
    pub fn generate_at(
        &self,
        identifier: &str,
        authority: Authority,
        issued_at: DateTime<Utc>,
    ) -> Result<TokenPair, AuthError> {
        let (access, access_exp) =
            self.encode_claims(identifier, authority, issued_at, self.cfg.access_ttl)?;
        let (refresh, refresh_exp) =
            self.encode_claims(identifier, authority, issued_at, self.cfg.refresh_ttl)?;

        Ok(TokenPair {
            grant_type: GRANT_TYPE_BEARER,
            access_token: AccessToken(access),
            refresh_token: RefreshToken(refresh),
            access_token_expires_at: access_exp,
            refresh_token_expires_at: refresh_exp,
        })
    }

    fn encode_claims(
        &self,
        identifier: &str,
        authority: Authority,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<(String, DateTime<Utc>), AuthError> {
        let expires_at = issued_at + ttl;
        let claims = Claims {
            sub: identifier.to_string(),
            auth: authority,
            exp: expires_at.timestamp(),
            iat: issued_at.timestamp(),
            iss: self.cfg.issuer.clone(),
            aud: self.cfg.audience.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::InternalError(e.to_string()))?;
        Ok((token, expires_at))
    }

    fn decode_claims(&self, token: &str, validate_exp: bool) -> Result<Claims, AuthError> {
        let mut v = Validation::new(Algorithm::HS256);
        v.validate_exp = validate_exp;
        v.leeway = 0;
        v.set_audience(&[self.cfg.audience.as_str()]);
        v.set_issuer(&[self.cfg.issuer.as_str()]);
        let data = decode::<Claims>(token, &self.decoding_key, &v)
            .map_err(|_| AuthError::InvalidToken)?;
        Ok(data.claims)
    }

    fn to_identity(claims: Claims) -> Result<IdentityClaim, AuthError> {
        let issued_at = DateTime::from_timestamp(claims.iat, 0).ok_or(AuthError::InvalidToken)?;
        let expires_at = DateTime::from_timestamp(claims.exp, 0).ok_or(AuthError::InvalidToken)?;
        Ok(IdentityClaim {
            identifier: claims.sub,
            authority: claims.auth,
            issued_at,
            expires_at,
        })
    }
}

impl TokenCodec for JwtHs256Codec {
    fn generate(&self, identifier: &str, authority: Authority) -> Result<TokenPair, AuthError> {
        self.generate_at(identifier, authority, Utc::now())
    }

    fn validate(&self, token: &str) -> bool {
        self.decode_claims(token, true).is_ok()
    }

    fn extract_identity(&self, token: &str) -> Result<IdentityClaim, AuthError> {
        Self::to_identity(self.decode_claims(token, false)?)
    }

    fn verify(&self, token: &str) -> Result<IdentityClaim, AuthError> {
        Self::to_identity(self.decode_claims(token, true)?)
    }
}
