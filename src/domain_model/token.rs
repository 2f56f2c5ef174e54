use chrono::{DateTime, Utc};
use serde::Serialize;

pub const GRANT_TYPE_BEARER: &str = "Bearer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshToken(pub String);

impl AccessToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl RefreshToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub grant_type: &'static str,
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// The single live refresh token of an identity, keyed by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRecord {
    pub key: String,
    pub value: String,
}

impl RefreshRecord {
    pub fn new(key: impl Into<String>, token: &RefreshToken) -> Self {
        RefreshRecord {
            key: key.into(),
            value: token.0.clone(),
        }
    }
}
