use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    pub fn new_v4() -> Self {
        UserId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(UserId)
    }
}

/// Role tag carried by an identity and by every token issued for it.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Authority {
    #[default]
    #[serde(rename = "ROLE_USER")]
    User,
    #[serde(rename = "ROLE_ADMIN")]
    Admin,
}

impl Authority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Authority::User => "ROLE_USER",
            Authority::Admin => "ROLE_ADMIN",
        }
    }
}

impl fmt::Display for Authority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown authority: {0}")]
pub struct UnknownAuthority(pub String);

impl std::str::FromStr for Authority {
    type Err = UnknownAuthority;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ROLE_USER" => Ok(Authority::User),
            "ROLE_ADMIN" => Ok(Authority::Admin),
            other => Err(UnknownAuthority(other.to_string())),
        }
    }
}

/// A registered account. `secret_hash` is a PHC string and never leaves the service.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: UserId,
    pub identifier: String,
    pub secret_hash: String,
    pub authority: Authority,
    pub created_at: DateTime<Utc>,
}

/// What a token says about its bearer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityClaim {
    pub identifier: String,
    pub authority: Authority,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
