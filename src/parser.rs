//! The text-format boundary: turn an ordered list of files into merged state.
//!
//! [`ConfigParser`] is the seam the stores depend on. [`TomlParser`] is the
//! stock implementation: every file is a TOML document whose top-level tables
//! are sections. A file may pull in others through an `[INCLUDES]` section:
//!
//! ```toml
//! [INCLUDES]
//! before = "common.conf"              # merged before this file
//! after = ["paths-overrides.local"]   # merged after this file
//! ```
//!
//! Include paths are relative to the including file. Missing, unreadable, or
//! cyclic includes are logged and skipped; the including file still counts as
//! parsed. The `INCLUDES` section itself is never exposed.

use std::fs;
use std::path::{Path, PathBuf};

use toml::{Table, Value};
use tracing::{debug, warn};

use crate::error::ConfReaderError;
use crate::merged::MergedConfig;

const INCLUDES_SECTION: &str = "INCLUDES";

/// Parses files in order into a [`MergedConfig`], last write wins.
pub trait ConfigParser: Send + Sync {
    /// Merge every path that parses into `target`, in the given order.
    /// Returns the subset of `paths` that was parsed successfully.
    fn parse_files(&self, paths: &[PathBuf], target: &mut MergedConfig) -> Vec<PathBuf>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TomlParser;

#[derive(Debug, Default, PartialEq)]
struct Includes {
    before: Vec<PathBuf>,
    after: Vec<PathBuf>,
}

impl ConfigParser for TomlParser {
    fn parse_files(&self, paths: &[PathBuf], target: &mut MergedConfig) -> Vec<PathBuf> {
        let mut parsed = Vec::with_capacity(paths.len());
        for path in paths {
            match self.parse_file(path, target) {
                Ok(()) => parsed.push(path.clone()),
                Err(e) => warn!("{e}"),
            }
        }
        parsed
    }
}

impl TomlParser {
    /// Parse one file, with its includes, into `target`.
    ///
    /// Nothing is merged when the file itself cannot be read or parsed.
    pub fn parse_file(&self, path: &Path, target: &mut MergedConfig) -> Result<(), ConfReaderError> {
        let mut stack = Vec::new();
        self.parse_with_includes(path, target, &mut stack)
    }

    fn parse_with_includes(
        &self,
        path: &Path,
        target: &mut MergedConfig,
        stack: &mut Vec<PathBuf>,
    ) -> Result<(), ConfReaderError> {
        let mut document = load_document(path)?;
        let includes = take_includes(&mut document, path);
        debug!("Parsed {}", path.display());

        stack.push(identity(path));
        for include in &includes.before {
            self.include(include, target, stack);
        }
        target.merge(document);
        for include in &includes.after {
            self.include(include, target, stack);
        }
        stack.pop();
        Ok(())
    }

    fn include(&self, path: &Path, target: &mut MergedConfig, stack: &mut Vec<PathBuf>) {
        if stack.contains(&identity(path)) {
            let e = ConfReaderError::IncludeCycle {
                path: path.to_path_buf(),
            };
            warn!("{e}, skipping");
            return;
        }
        if !path.exists() {
            warn!("Included file {} does not exist, skipping", path.display());
            return;
        }
        debug!("Including {}", path.display());
        if let Err(e) = self.parse_with_includes(path, target, stack) {
            warn!("{e}");
        }
    }
}

fn load_document(path: &Path) -> Result<Table, ConfReaderError> {
    let content = fs::read_to_string(path).map_err(|e| ConfReaderError::IoError {
        path: path.to_path_buf(),
        source: e,
    })?;
    toml::from_str(&content).map_err(|e| ConfReaderError::ParseError {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Remove the `INCLUDES` section from `document` and resolve its entries
/// against the directory of `path`.
fn take_includes(document: &mut Table, path: &Path) -> Includes {
    let Some(value) = document.remove(INCLUDES_SECTION) else {
        return Includes::default();
    };
    let Value::Table(section) = value else {
        warn!("{INCLUDES_SECTION} in {} is not a section, ignoring", path.display());
        return Includes::default();
    };

    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let resolve = |key: &str| -> Vec<PathBuf> {
        include_names(section.get(key), key, path)
            .into_iter()
            .map(|name| dir.join(name))
            .collect()
    };
    Includes {
        before: resolve("before"),
        after: resolve("after"),
    }
}

fn include_names(value: Option<&Value>, key: &str, path: &Path) -> Vec<String> {
    match value {
        None => vec![],
        Some(Value::String(s)) => s.split_whitespace().map(str::to_string).collect(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                other => {
                    warn!(
                        "Ignoring non-string include {other} under '{key}' in {}",
                        path.display()
                    );
                    None
                }
            })
            .collect(),
        Some(other) => {
            warn!(
                "Ignoring include '{key}' = {other} in {}: expected a string or list",
                path.display()
            );
            vec![]
        }
    }
}

/// Canonical form used for cycle detection; falls back to the path as given.
fn identity(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
