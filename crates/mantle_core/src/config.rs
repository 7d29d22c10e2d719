//! # Configuration
//!
//! Optional caps on the reuse pools, loaded once at startup from TOML.
//!
//! Every cap defaults to unbounded. The delivery queue is never capped.
//!
//! ```toml
//! [pools]
//! max_cached_per_tag = 256
//!
//! [events]
//! max_cached_per_tag = 64
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{MantleError, MantleResult};

/// Caps for the component and entity pools.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PoolConfig {
    /// Max pooled objects per tag. `None` = unbounded.
    pub max_cached_per_tag: Option<usize>,
}

/// Caps for the event reuse cache.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EventConfig {
    /// Max cached events per tag. `None` = unbounded.
    pub max_cached_per_tag: Option<usize>,
}

/// Top-level runtime configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MantleConfig {
    /// Component and entity pools.
    pub pools: PoolConfig,
    /// Event channel.
    pub events: EventConfig,
}

impl MantleConfig {
    /// Parses a configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`MantleError::Config`] on malformed TOML, unknown keys or a
    /// zero cap.
    pub fn from_toml_str(text: &str) -> MantleResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`MantleError::Io`] if the file cannot be read, otherwise as
    /// [`MantleConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> MantleResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("loaded configuration from {}", path.as_ref().display());
        Ok(config)
    }

    /// A cap of zero would make a pool useless; reject it.
    fn validate(&self) -> MantleResult<()> {
        if self.pools.max_cached_per_tag == Some(0) {
            return Err(MantleError::Config(
                "pools.max_cached_per_tag must be at least 1".into(),
            ));
        }
        if self.events.max_cached_per_tag == Some(0) {
            return Err(MantleError::Config(
                "events.max_cached_per_tag must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
