use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::time::Duration;

struct StoredRefresh {
    value: String,
    expires_at: DateTime<Utc>,
}

impl StoredRefresh {
    fn new(value: &str, ttl_secs: u64) -> Self {
        StoredRefresh {
            value: value.to_string(),
            expires_at: Utc::now() + Duration::from_secs(ttl_secs),
        }
    }

    fn is_live(&self) -> bool {
        self.expires_at > Utc::now()
    }
}

/// Expired records are treated as absent on read; nothing evicts them.
#[derive(Default)]
pub struct MemoryRefreshTokenStore {
    records: DashMap<String, StoredRefresh>,
}

impl MemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for MemoryRefreshTokenStore {
    async fn save(&self, record: &RefreshRecord, ttl_secs: u64) -> Result<(), AuthError> {
        self.records
            .insert(record.key.clone(), StoredRefresh::new(&record.value, ttl_secs));
        Ok(())
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<RefreshRecord>, AuthError> {
        Ok(self
            .records
            .get(key)
            .filter(|stored| stored.is_live())
            .map(|stored| RefreshRecord {
                key: key.to_string(),
                value: stored.value.clone(),
            }))
    }

    async fn replace(
        &self,
        record: &RefreshRecord,
        expected: &str,
        ttl_secs: u64,
    ) -> Result<bool, AuthError> {
        let Some(mut current) = self.records.get_mut(&record.key) else {
            return Ok(false);
        };
        if !current.is_live() || current.value != expected {
            return Ok(false);
        }
        *current = StoredRefresh::new(&record.value, ttl_secs);
        Ok(true)
    }

    async fn remove(&self, key: &str) -> Result<(), AuthError> {
        self.records.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(key: &str, value: &str) -> RefreshRecord {
        RefreshRecord {
            key: key.to_string(),
            value: value.to_string(),
        }
    }

    #[tokio::test]
    async fn save_is_an_upsert() {
        let store = MemoryRefreshTokenStore::new();
        store.save(&record("alice", "r1"), 60).await.unwrap();
        store.save(&record("alice", "r2"), 60).await.unwrap();

        let found = store.find_by_key("alice").await.unwrap().unwrap();
        assert_eq!(found, record("alice", "r2"));
        assert!(store.find_by_key("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_requires_the_expected_value() {
        let store = MemoryRefreshTokenStore::new();
        assert!(!store.replace(&record("alice", "r2"), "r1", 60).await.unwrap());

        store.save(&record("alice", "r1"), 60).await.unwrap();
        assert!(!store.replace(&record("alice", "r2"), "r0", 60).await.unwrap());
        assert!(store.replace(&record("alice", "r2"), "r1", 60).await.unwrap());
        assert!(!store.replace(&record("alice", "r3"), "r1", 60).await.unwrap());

        let found = store.find_by_key("alice").await.unwrap().unwrap();
        assert_eq!(found.value, "r2");
    }

    #[tokio::test]
    async fn expired_record_reads_as_absent() {
        let store = MemoryRefreshTokenStore::new();
        store.records.insert(
            "alice".to_string(),
            StoredRefresh {
                value: "r1".to_string(),
                expires_at: Utc::now() - chrono::Duration::seconds(1),
            },
        );

        assert!(store.find_by_key("alice").await.unwrap().is_none());
        assert!(!store.replace(&record("alice", "r2"), "r1", 60).await.unwrap());
    }

    #[tokio::test]
    async fn remove_forgets_the_record() {
        let store = MemoryRefreshTokenStore::new();
        store.save(&record("alice", "r1"), 60).await.unwrap();
        store.remove("alice").await.unwrap();
        store.remove("alice").await.unwrap();
        assert!(store.find_by_key("alice").await.unwrap().is_none());
    }
}
