//! Reader settings: where entities live and how values are expanded.
//!
//! [`ReaderConfig`] is a confique struct, so its defaults, doc comments, and
//! environment variable names are declared in one place. It can be loaded
//! from a TOML settings file and the environment, or built directly.
//!
//! [`StoreSettings`] pairs a `ReaderConfig` with the parser every store
//! created from it will use. Build it once and hand it to constructors.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use confique::Config;

use crate::error::ConfReaderError;
use crate::parser::{ConfigParser, TomlParser};

/// Stock system location for entity files.
pub const DEFAULT_BASEDIR: &str = "/etc/fail2ban";

/// Recursion limit for `%(name)s` expansion.
pub const DEFAULT_MAX_INTERPOLATION_DEPTH: usize = 10;

/// Settings shared by every store a reader creates.
#[derive(Config, Debug, Clone, PartialEq)]
pub struct ReaderConfig {
    /// Root directory searched for `{name}.conf`, `{name}.d/`, `{name}.local`.
    #[config(default = "/etc/fail2ban", env = "CONFREADER_BASEDIR")]
    pub basedir: PathBuf,

    /// Expand `%(name)s` references when values are read.
    #[config(default = true, env = "CONFREADER_INTERPOLATION")]
    pub interpolation: bool,

    /// How many nested references are followed before giving up.
    #[config(default = 10, env = "CONFREADER_MAX_INTERPOLATION_DEPTH")]
    pub max_interpolation_depth: usize,
}

impl ReaderConfig {
    /// Compiled defaults, with no file or environment lookup.
    pub fn with_basedir(basedir: impl Into<PathBuf>) -> Self {
        Self {
            basedir: basedir.into(),
            interpolation: true,
            max_interpolation_depth: DEFAULT_MAX_INTERPOLATION_DEPTH,
        }
    }

    /// Load from the environment on top of compiled defaults.
    pub fn from_env() -> Result<Self, ConfReaderError> {
        Ok(Self::builder().env().load()?)
    }

    /// Load from a TOML settings file. Environment variables win over the
    /// file, the file wins over compiled defaults. A missing file is skipped.
    pub fn from_file(path: &Path) -> Result<Self, ConfReaderError> {
        Ok(Self::builder().env().file(path).load()?)
    }
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self::with_basedir(DEFAULT_BASEDIR)
    }
}

/// Everything needed to construct an [`EntityStore`](crate::store::EntityStore).
#[derive(Clone)]
pub struct StoreSettings {
    pub config: ReaderConfig,
    pub parser: Arc<dyn ConfigParser>,
}

impl StoreSettings {
    pub fn new(config: ReaderConfig) -> Self {
        Self {
            config,
            parser: Arc::new(TomlParser),
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn ConfigParser>) -> Self {
        self.parser = parser;
        self
    }
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self::new(ReaderConfig::default())
    }
}

impl fmt::Debug for StoreSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreSettings")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
