use crate::application_port::*;
use crate::domain_model::*;

#[async_trait::async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Upsert by key; any previous value for the key stops being valid.
    async fn save(&self, record: &RefreshRecord, ttl_secs: u64) -> Result<(), AuthError>;

    async fn find_by_key(&self, key: &str) -> Result<Option<RefreshRecord>, AuthError>;

    /// Atomically overwrite the value only if it still equals `expected`.
    /// Returns `false` when the record is gone or holds another value.
    async fn replace(
        &self,
        record: &RefreshRecord,
        expected: &str,
        ttl_secs: u64,
    ) -> Result<bool, AuthError>;

    async fn remove(&self, key: &str) -> Result<(), AuthError>;
}
