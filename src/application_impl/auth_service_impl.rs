use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use crate::logger::*;
use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use std::sync::Arc;

#[derive(Default)]
pub struct Argon2PasswordHasher {
    params: Params,
}

impl Argon2PasswordHasher {
    pub fn with_params(params: Params) -> Self {
        Self { params }
    }
}

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let password = password.to_owned();
        let params = self.params.clone();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            let argon2 = Argon2::new(argon2::Algorithm::Argon2id, argon2::Version::V0x13, params);
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AuthError::InternalError(e.to_string()))
        })
        .await
        .map_err(|e| AuthError::InternalError(e.to_string()))?
    }

    async fn verify_password(
        &self,
        password: &str,
        password_hash: &str,
    ) -> Result<bool, AuthError> {
        let password = password.to_owned();
        let password_hash = password_hash.to_owned();
        tokio::task::spawn_blocking(move || {
            let parsed = PasswordHash::new(&password_hash)
                .map_err(|e| AuthError::InternalError(format!("invalid PHC hash: {e}")))?;

            match Argon2::default().verify_password(password.as_bytes(), &parsed) {
                Ok(_) => Ok(true),
                Err(argon2::password_hash::Error::Password) => Ok(false),
                Err(e) => Err(AuthError::InternalError(format!("verify error: {e}"))),
            }
        })
        .await
        .map_err(|e| AuthError::InternalError(e.to_string()))?
    }
}

pub struct RealAuthService {
    credential_store: Arc<dyn CredentialStore>,
    token_store: Arc<dyn RefreshTokenStore>,
    credential_hasher: Arc<dyn CredentialHasher>,
    token_codec: Arc<dyn TokenCodec>,
}

impl RealAuthService {
    pub fn new(
        credential_store: Arc<dyn CredentialStore>,
        token_store: Arc<dyn RefreshTokenStore>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_codec: Arc<dyn TokenCodec>,
    ) -> Self {
        Self {
            credential_store,
            token_store,
            credential_hasher,
            token_codec,
        }
    }

    /// Looks the identifier up and checks the secret against its stored hash.
    /// `None` covers both an unknown identifier and a wrong secret.
    pub async fn verify_credentials(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<Option<Identity>, AuthError> {
        let Some(identity) = self.credential_store.find_by_identifier(identifier).await? else {
            return Ok(None);
        };

        let ok = self
            .credential_hasher
            .verify_password(secret, &identity.secret_hash)
            .await?;

        Ok(ok.then_some(identity))
    }

    fn ttl_secs(until: DateTime<Utc>) -> u64 {
        let now = Utc::now();
        let secs = (until - now).num_seconds();
        if secs <= 0 { 1 } else { secs as u64 }
    }

    /// Short digest for logs; refresh tokens are bearer secrets.
    fn fingerprint(token: &str) -> String {
        let digest = Sha256::digest(token.as_bytes());
        hex::encode(&digest.as_slice()[..6])
    }
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn signup(&self, request: SignupInput) -> Result<SignupOutput, AuthError> {
        let SignupInput {
            identifier,
            secret,
            authority,
        } = request;

        if self
            .credential_store
            .exists_by_identifier(&identifier)
            .await?
        {
            debug!(%identifier, "signup rejected, identifier taken");
            return Err(AuthError::DuplicateIdentity);
        }

        let secret_hash = self.credential_hasher.hash_password(&secret).await?;
        let identity = Identity {
            id: UserId::new_v4(),
            identifier,
            secret_hash,
            authority: authority.unwrap_or_default(),
            created_at: Utc::now(),
        };

        let saved = self.credential_store.save(identity).await?;
        info!(user_id = %saved.id, identifier = %saved.identifier, authority = %saved.authority, "identity registered");

        Ok(SignupOutput {
            id: saved.id,
            identifier: saved.identifier,
        })
    }

    async fn login(&self, request: LoginInput) -> Result<TokenPair, AuthError> {
        let LoginInput { identifier, secret } = request;

        let Some(identity) = self.verify_credentials(&identifier, &secret).await? else {
            debug!(%identifier, "login rejected");
            return Err(AuthError::InvalidCredentials);
        };

        let pair = self
            .token_codec
            .generate(&identity.identifier, identity.authority)?;

        // Replaces whatever session the identity had before.
        let record = RefreshRecord::new(identity.identifier.clone(), &pair.refresh_token);
        self.token_store
            .save(&record, Self::ttl_secs(pair.refresh_token_expires_at))
            .await?;

        info!(
            identifier = %identity.identifier,
            refresh = %Self::fingerprint(pair.refresh_token.as_str()),
            "login succeeded"
        );
        Ok(pair)
    }

    async fn reissue(&self, request: ReissueInput) -> Result<TokenPair, AuthError> {
        let ReissueInput {
            access_token,
            refresh_token,
        } = request;

        if !self.token_codec.validate(refresh_token.as_str()) {
            debug!("reissue rejected, refresh token invalid or expired");
            return Err(AuthError::InvalidToken);
        }

        let claim = self.token_codec.extract_identity(access_token.as_str())?;

        let record = self
            .token_store
            .find_by_key(&claim.identifier)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if record.value != refresh_token.0 {
            warn!(
                identifier = %claim.identifier,
                presented = %Self::fingerprint(refresh_token.as_str()),
                "superseded refresh token presented"
            );
            return Err(AuthError::TokenMismatch);
        }

        let pair = self
            .token_codec
            .generate(&claim.identifier, claim.authority)?;

        let rotated = RefreshRecord::new(claim.identifier.clone(), &pair.refresh_token);
        let swapped = self
            .token_store
            .replace(
                &rotated,
                refresh_token.as_str(),
                Self::ttl_secs(pair.refresh_token_expires_at),
            )
            .await?;
        if !swapped {
            warn!(identifier = %claim.identifier, "refresh token rotated concurrently");
            return Err(AuthError::TokenMismatch);
        }

        info!(
            identifier = %claim.identifier,
            previous = %Self::fingerprint(refresh_token.as_str()),
            current = %Self::fingerprint(pair.refresh_token.as_str()),
            "refresh token rotated"
        );
        Ok(pair)
    }

    async fn authenticate(&self, access_token: &str) -> Result<IdentityClaim, AuthError> {
        self.token_codec.verify(access_token)
    }

    async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        let claim = self.token_codec.verify(access_token)?;
        self.token_store.remove(&claim.identifier).await?;
        info!(identifier = %claim.identifier, "session closed");
        Ok(())
    }
}
