use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Script};

const REFRESH_REPLACE: &str = include_str!("refresh_replace.lua");

pub struct RedisRefreshTokenStore {
    conn: ConnectionManager,
    prefix: String,
    replace_script: Script,
}

impl RedisRefreshTokenStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisRefreshTokenStore {
            conn,
            prefix: prefix.into(),
            replace_script: Script::new(REFRESH_REPLACE),
        }
    }

    fn key(&self, key: &str) -> String {
        format!("{}:refresh:{}", self.prefix, key)
    }
}

#[async_trait::async_trait]
impl RefreshTokenStore for RedisRefreshTokenStore {
    async fn save(&self, record: &RefreshRecord, ttl_secs: u64) -> Result<(), AuthError> {
        let key = self.key(&record.key);
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(&key, &record.value, ttl_secs)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(())
    }

    async fn find_by_key(&self, key: &str) -> Result<Option<RefreshRecord>, AuthError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get(self.key(key))
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(value.map(|value| RefreshRecord {
            key: key.to_string(),
            value,
        }))
    }

    async fn replace(
        &self,
        record: &RefreshRecord,
        expected: &str,
        ttl_secs: u64,
    ) -> Result<bool, AuthError> {
        let mut conn = self.conn.clone();
        let swapped: i64 = self
            .replace_script
            .key(self.key(&record.key))
            .arg(expected)
            .arg(&record.value)
            .arg(ttl_secs)
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(swapped == 1)
    }

    async fn remove(&self, key: &str) -> Result<(), AuthError> {
        let mut conn = self.conn.clone();
        let _: () = conn
            .del(self.key(key))
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(())
    }
}

/// Needs a live server: `TURNSTILE_TEST_REDIS_DSN=redis://127.0.0.1:6379 cargo test -- --ignored`
#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> RedisRefreshTokenStore {
        let dsn = std::env::var("TURNSTILE_TEST_REDIS_DSN")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
        let conn = redis::Client::open(dsn)
            .unwrap()
            .get_connection_manager()
            .await
            .unwrap();
        RedisRefreshTokenStore::new(conn, format!("turnstile-test:{}", uuid::Uuid::new_v4()))
    }

    fn record(value: &str) -> RefreshRecord {
        RefreshRecord {
            key: "alice".to_string(),
            value: value.to_string(),
        }
    }

    #[tokio::test]
    #[ignore = "requires redis"]
    async fn replace_swaps_only_on_expected_value() {
        let store = store().await;
        assert!(!store.replace(&record("r1"), "r0", 60).await.unwrap());

        store.save(&record("r1"), 60).await.unwrap();
        assert!(!store.replace(&record("r2"), "r0", 60).await.unwrap());
        assert_eq!(store.find_by_key("alice").await.unwrap(), Some(record("r1")));

        assert!(store.replace(&record("r2"), "r1", 60).await.unwrap());
        assert!(!store.replace(&record("r3"), "r1", 60).await.unwrap());
        assert_eq!(store.find_by_key("alice").await.unwrap(), Some(record("r2")));

        store.remove("alice").await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires redis"]
    async fn replace_sets_a_fresh_ttl() {
        let store = store().await;
        store.save(&record("r1"), 5).await.unwrap();
        assert!(store.replace(&record("r2"), "r1", 600).await.unwrap());

        let mut conn = store.conn.clone();
        let ttl: i64 = conn.ttl(store.key("alice")).await.unwrap();
        assert!(ttl > 5 && ttl <= 600, "ttl was {ttl}");

        store.remove("alice").await.unwrap();
    }

    #[tokio::test]
    #[ignore = "requires redis"]
    async fn removed_record_is_gone() {
        let store = store().await;
        store.save(&record("r1"), 60).await.unwrap();
        store.remove("alice").await.unwrap();
        assert_eq!(store.find_by_key("alice").await.unwrap(), None);
        assert!(!store.replace(&record("r2"), "r1", 60).await.unwrap());
    }
}
