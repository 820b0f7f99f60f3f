//! The unshared store behind every reader.
//!
//! An [`EntityStore`] owns one [`MergedConfig`]. Reading a name discovers its
//! files (see [`file`](crate::file)), feeds them to the parser in order, and
//! layers the result on top of whatever the store already holds. The store
//! also remembers the outcome of each name it has read, which is what makes
//! `once` reads free.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error};

use crate::error::ConfReaderError;
use crate::extract;
use crate::file;
use crate::merged::MergedConfig;
use crate::parser::ConfigParser;
use crate::settings::{DEFAULT_BASEDIR, StoreSettings};
use crate::types::{OptionSpec, OptionValues};

pub struct EntityStore {
    basedir: PathBuf,
    parser: Arc<dyn ConfigParser>,
    config: MergedConfig,
    read_cache: HashMap<String, bool>,
}

impl EntityStore {
    pub fn new(settings: &StoreSettings) -> Self {
        Self {
            basedir: settings.config.basedir.clone(),
            parser: Arc::clone(&settings.parser),
            config: MergedConfig::new(&settings.config),
            read_cache: HashMap::new(),
        }
    }

    /// Change the base directory; `None` restores the stock location.
    pub fn set_basedir(&mut self, basedir: Option<PathBuf>) {
        self.basedir = basedir.unwrap_or_else(|| PathBuf::from(DEFAULT_BASEDIR));
    }

    pub fn basedir(&self) -> &Path {
        &self.basedir
    }

    /// Discover and merge every file for `name`.
    ///
    /// Returns `Ok(true)` when at least one file merged, `Ok(false)` when no
    /// file exists or none parsed. Only a missing base directory is an error.
    pub fn read(&mut self, name: &str) -> Result<bool, ConfReaderError> {
        if !self.basedir.exists() {
            return Err(ConfReaderError::BaseDirMissing {
                path: self.basedir.clone(),
            });
        }
        debug!("Reading configs for {name} under {}", self.basedir.display());

        let files = file::existing_candidates(&self.basedir, name);
        if files.is_empty() {
            error!(
                "Found no accessible config files for '{name}' under {}",
                self.basedir.display()
            );
            return Ok(false);
        }

        debug!("Reading config files: {}", join_paths(&files));
        let parsed = self.parser.parse_files(&files, &mut self.config);

        let missed: Vec<PathBuf> = files.into_iter().filter(|f| !parsed.contains(f)).collect();
        if !missed.is_empty() {
            error!("Could not read config files: {}", join_paths(&missed));
        }
        if parsed.is_empty() {
            error!(
                "Found no accessible config files for '{name}' under {}",
                self.basedir.display()
            );
            return Ok(false);
        }
        Ok(true)
    }

    /// [`read`](Self::read) with a per-name result cache.
    ///
    /// With `once`, a name that was already read returns its recorded result
    /// without touching the filesystem. Without `once`, the name is read
    /// again and its recorded result is replaced. A missing base directory
    /// records nothing.
    pub fn read_once(&mut self, name: &str, once: bool) -> Result<bool, ConfReaderError> {
        if once && let Some(&cached) = self.read_cache.get(name) {
            debug!("Using cached result for {name}: {cached}");
            return Ok(cached);
        }
        let result = self.read(name)?;
        self.read_cache.insert(name.to_string(), result);
        Ok(result)
    }

    /// Parse exactly one file, bypassing discovery and the base directory.
    pub fn read_explicit(&mut self, path: &Path) -> bool {
        let files = [path.to_path_buf()];
        let parsed = self.parser.parse_files(&files, &mut self.config);
        if parsed.is_empty() {
            error!("Could not read config file: {}", path.display());
            return false;
        }
        true
    }

    /// The recorded outcome of an earlier read of `name`.
    pub fn read_result(&self, name: &str) -> Option<bool> {
        self.read_cache.get(name).copied()
    }

    pub fn config(&self) -> &MergedConfig {
        &self.config
    }

    pub fn get_options(
        &self,
        section: &str,
        specs: &[OptionSpec],
        exclude: Option<&BTreeSet<String>>,
    ) -> OptionValues {
        extract::extract_options(&self.config, section, specs, exclude)
    }
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
