use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::settings::Settings;
use anyhow::anyhow;
use sqlx::{MySql, Pool};
use std::sync::Arc;
use std::time::Duration;

/// Wires the orchestrator to the stores named by `store.backend`.
pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: settings.jwt.issuer.clone(),
            audience: settings.jwt.audience.clone(),
            access_ttl: Duration::from_secs(settings.jwt.access_ttl_secs),
            refresh_ttl: Duration::from_secs(settings.jwt.refresh_ttl_secs),
            signing_key: settings.jwt.resolve_signing_key()?,
        }));
        let credential_hasher: Arc<dyn CredentialHasher> =
            Arc::new(Argon2PasswordHasher::default());

        let (credential_store, token_store, pool): (
            Arc<dyn CredentialStore>,
            Arc<dyn RefreshTokenStore>,
            Option<Pool<MySql>>,
        ) = match settings.store.backend.as_str() {
            "memory" => (
                Arc::new(MemoryCredentialStore::new()),
                Arc::new(MemoryRefreshTokenStore::new()),
                None,
            ),
            "real" => {
                let mysql_dsn = settings
                    .store
                    .mysql_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow!("store.mysql_dsn is required for the real backend"))?;
                let redis_dsn = settings
                    .store
                    .redis_dsn
                    .as_deref()
                    .ok_or_else(|| anyhow!("store.redis_dsn is required for the real backend"))?;

                let pool = Pool::<MySql>::connect(mysql_dsn).await?;
                let redis_client = redis::Client::open(redis_dsn)?;
                let redis_manager = redis_client.get_connection_manager().await?;

                (
                    Arc::new(MySqlCredentialStore::new(pool.clone())),
                    Arc::new(RedisRefreshTokenStore::new(
                        redis_manager,
                        settings.store.redis_prefix.clone(),
                    )),
                    Some(pool),
                )
            }
            other => return Err(anyhow!("Unknown store backend: {}", other)),
        };

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            credential_store,
            token_store,
            credential_hasher,
            token_codec,
        ));

        info!(backend = %settings.store.backend, "auth service ready");

        Ok(Self { auth_service, pool })
    }

    pub async fn shutdown(&self) {
        if let Some(pool) = &self.pool {
            pool.close().await;
        }
        debug!("server shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::*;
    use crate::settings::parse_settings_str;

    fn settings(backend: &str) -> Settings {
        parse_settings_str(&format!(
            r#"
[jwt]
issuer = "turnstile"
audience = "cli"
signing_key = "server-test-key"

[store]
backend = "{backend}"

[log]
filter = "info"
"#
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn memory_backend_serves_the_full_flow() {
        let server = Server::try_new(&settings("memory")).await.unwrap();
        let auth = server.auth_service.clone();

        auth.signup(SignupInput {
            identifier: "alice".to_string(),
            secret: "secret123".to_string(),
            authority: Some(Authority::Admin),
        })
        .await
        .unwrap();
        let pair = auth
            .login(LoginInput {
                identifier: "alice".to_string(),
                secret: "secret123".to_string(),
            })
            .await
            .unwrap();
        let next = auth
            .reissue(ReissueInput {
                access_token: pair.access_token.clone(),
                refresh_token: pair.refresh_token.clone(),
            })
            .await
            .unwrap();

        let claim = auth.authenticate(next.access_token.as_str()).await.unwrap();
        assert_eq!(claim.identifier, "alice");
        assert_eq!(claim.authority, Authority::Admin);

        server.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_backend_is_rejected() {
        assert!(Server::try_new(&settings("sqlite")).await.is_err());
    }

    #[tokio::test]
    async fn real_backend_requires_dsns() {
        let err = Server::try_new(&settings("real")).await.err().unwrap();
        assert!(err.to_string().contains("mysql_dsn"));
    }
}
