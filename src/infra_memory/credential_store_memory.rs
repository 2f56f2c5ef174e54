use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use dashmap::DashMap;

#[derive(Default)]
pub struct MemoryCredentialStore {
    by_identifier: DashMap<String, Identity>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn exists_by_identifier(&self, identifier: &str) -> Result<bool, AuthError> {
        Ok(self.by_identifier.contains_key(identifier))
    }

    async fn save(&self, identity: Identity) -> Result<Identity, AuthError> {
        let stored = self
            .by_identifier
            .entry(identity.identifier.clone())
            .or_insert_with(|| identity.clone());
        if stored.id != identity.id {
            return Err(AuthError::DuplicateIdentity);
        }
        Ok(identity)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<Identity>, AuthError> {
        Ok(self
            .by_identifier
            .get(identifier)
            .map(|entry| Identity::clone(&entry)))
    }
}
