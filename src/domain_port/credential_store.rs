use crate::application_port::*;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait CredentialStore: Send + Sync {
    async fn exists_by_identifier(&self, identifier: &str) -> Result<bool, AuthError>;

    /// Insert a new identity. A concurrent insert of the same identifier
    /// must fail with `AuthError::DuplicateIdentity`.
    async fn save(&self, identity: Identity) -> Result<Identity, AuthError>;

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Identity>, AuthError>;
}
