use crate::domain_model::*;
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("identifier already registered")]
    DuplicateIdentity,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token invalid")]
    InvalidToken,
    #[error("no active session for identity")]
    SessionNotFound,
    #[error("refresh token does not match the active session")]
    TokenMismatch,
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub identifier: String,
    pub secret: String,
    pub authority: Option<Authority>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SignupOutput {
    pub id: UserId,
    pub identifier: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub identifier: String,
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct ReissueInput {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
}

/// Stateless signer/verifier for the access/refresh pair.
pub trait TokenCodec: Send + Sync {
    fn generate(&self, identifier: &str, authority: Authority) -> Result<TokenPair, AuthError>;

    /// Fails closed: any malformed, forged or expired token yields `false`.
    fn validate(&self, token: &str) -> bool;

    /// Checks the signature but tolerates expiry, so a just-expired access
    /// token still names its bearer during reissue.
    fn extract_identity(&self, token: &str) -> Result<IdentityClaim, AuthError>;

    /// Strict counterpart of `extract_identity`.
    fn verify(&self, token: &str) -> Result<IdentityClaim, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn signup(&self, request: SignupInput) -> Result<SignupOutput, AuthError>;
    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError>;
    async fn reissue(&self, request: ReissueInput) -> Result<TokenPair, AuthError>;
    async fn authenticate(&self, access_token: &str) -> Result<IdentityClaim, AuthError>;
    async fn logout(&self, access_token: &str) -> Result<(), AuthError>;
}
