//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::timetable::CacheConfig;

/// Default listen address.
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Default feed snapshot path.
const DEFAULT_FEED: &str = "data/feed.json";

/// Error reading server configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServerConfigError {
    /// A variable is set but does not parse
    #[error("invalid {var}={value}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Where to find the feed and where to listen.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Feed snapshot path (`HIDEOUT_FEED`)
    pub feed_path: PathBuf,

    /// Listen address (`HIDEOUT_ADDR`)
    pub addr: SocketAddr,

    /// Timetable slice cache (`HIDEOUT_CACHE_CAPACITY`)
    pub cache: CacheConfig,
}

impl ServerConfig {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// unset variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ServerConfigError> {
        let feed_path = lookup("HIDEOUT_FEED").unwrap_or_else(|| DEFAULT_FEED.to_string());

        let addr_value = lookup("HIDEOUT_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = addr_value
            .parse::<SocketAddr>()
            .map_err(|e| ServerConfigError::Invalid {
                var: "HIDEOUT_ADDR",
                value: addr_value.clone(),
                reason: e.to_string(),
            })?;

        let mut cache = CacheConfig::default();
        if let Some(value) = lookup("HIDEOUT_CACHE_CAPACITY") {
            cache.max_capacity = value.parse::<u64>().map_err(|e| ServerConfigError::Invalid {
                var: "HIDEOUT_CACHE_CAPACITY",
                value: value.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(Self {
            feed_path: PathBuf::from(feed_path),
            addr,
            cache,
        })
    }
}
