use anyhow::{Result, anyhow};
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

const BOOTSTRAP_FILTER: &str = "info";

pub struct LogConfig {
    pub filter: String,
}

/// Logs go to stderr; stdout carries command output. A `RUST_LOG` set in the
/// environment pins the filter, so the configured `log.filter` is ignored.
pub struct Logger {
    reload_handle: reload::Handle<EnvFilter, Registry>,
    pinned_by_env: bool,
}

impl Logger {
    pub fn new_bootstrap() -> Self {
        let env_filter = std::env::var(EnvFilter::DEFAULT_ENV)
            .ok()
            .and_then(|directives| parse_filter(&directives).ok());
        let pinned_by_env = env_filter.is_some();
        let filter = env_filter.unwrap_or_else(|| EnvFilter::new(BOOTSTRAP_FILTER));
        let (filter, reload_handle) = reload::Layer::new(filter);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();

        Self {
            reload_handle,
            pinned_by_env,
        }
    }

    pub fn reload_from_config(&self, config: &LogConfig) -> Result<()> {
        let filter = parse_filter(&config.filter)?;
        if self.pinned_by_env {
            tracing::debug!(configured = %config.filter, "RUST_LOG set, keeping it");
            return Ok(());
        }
        self.reload_handle.reload(filter).map_err(|e| anyhow!(e))?;
        Ok(())
    }
}

/// Rejects filters that `EnvFilter::new` would silently drop directives from.
pub fn parse_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).map_err(|e| anyhow!("bad log filter {directives:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_level_and_target_directives() {
        assert!(parse_filter("info").is_ok());
        assert!(parse_filter("warn,turnstile=debug").is_ok());
    }

    #[test]
    fn rejects_malformed_directives() {
        let err = parse_filter("turnstile=loud").unwrap_err();
        assert!(err.to_string().contains("turnstile=loud"));
    }
}
