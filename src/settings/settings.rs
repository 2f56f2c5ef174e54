use anyhow::{Result, anyhow};
use config::{Config, ConfigBuilder, Environment, File, FileFormat, builder::DefaultState};
use serde::Deserialize;
use std::fmt;

pub const SIGNING_KEY_ENV: &str = "TURNSTILE_SIGNING_KEY";

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub jwt: Jwt,
    pub store: Store,
    pub log: Log,
}

#[derive(Deserialize)]
pub struct Jwt {
    pub issuer: String,
    pub audience: String,
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,
    #[serde(default = "default_refresh_ttl_secs")]
    pub refresh_ttl_secs: u64,
    pub signing_key: Option<String>,
}

impl fmt::Debug for Jwt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Jwt")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Jwt {
    /// `TURNSTILE_SIGNING_KEY` wins over the configured key.
    pub fn resolve_signing_key(&self) -> Result<Vec<u8>> {
        let key = std::env::var(SIGNING_KEY_ENV)
            .ok()
            .or_else(|| self.signing_key.clone())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| anyhow!("no signing key: set jwt.signing_key or {SIGNING_KEY_ENV}"))?;
        Ok(key.into_bytes())
    }
}

fn default_access_ttl_secs() -> u64 {
    30 * 60
}

fn default_refresh_ttl_secs() -> u64 {
    7 * 24 * 60 * 60
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "real"
    pub mysql_dsn: Option<String>,
    pub redis_dsn: Option<String>,
    #[serde(default = "default_redis_prefix")]
    pub redis_prefix: String,
}

fn default_redis_prefix() -> String {
    "turnstile".to_string()
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);
    build(Config::builder().add_source(File::with_name(path)))
}

pub fn parse_settings_str(toml: &str) -> Result<Settings> {
    build(Config::builder().add_source(File::from_str(toml, FileFormat::Toml)))
}

fn build(builder: ConfigBuilder<DefaultState>) -> Result<Settings> {
    let settings: Settings = builder
        .add_source(
            Environment::with_prefix("TURNSTILE")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
[jwt]
issuer = "turnstile"
audience = "cli"
signing_key = "dev-only-key"

[store]
backend = "memory"

[log]
filter = "debug"
"#;

    #[test]
    fn minimal_settings_fill_defaults() {
        let settings = parse_settings_str(MINIMAL).unwrap();
        assert_eq!(settings.jwt.access_ttl_secs, 30 * 60);
        assert_eq!(settings.jwt.refresh_ttl_secs, 7 * 24 * 60 * 60);
        assert_eq!(settings.store.backend, "memory");
        assert_eq!(settings.store.redis_prefix, "turnstile");
        assert!(settings.store.mysql_dsn.is_none());
    }

    #[test]
    fn debug_output_redacts_signing_key() {
        let settings = parse_settings_str(MINIMAL).unwrap();
        let rendered = format!("{:?}", settings);
        assert!(!rendered.contains("dev-only-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn missing_section_is_an_error() {
        assert!(parse_settings_str("[log]\nfilter = \"info\"\n").is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(parse_settings(Some("settings/does-not-exist.toml")).is_err());
    }
}
