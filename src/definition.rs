//! Readers for entities split into `[Definition]` and `[Init]` sections.
//!
//! Filters and actions declare their own options under `[Definition]` and
//! expose overridable initialization values under `[Init]`. A calling
//! context (a jail) may pass its own values for some of those options:
//!
//! - names the caller supplies are excluded from `Definition` extraction;
//! - `Init` values are harvested first-write-wins, so values already present
//!   in the reader's [`InitOverrides`] (typically the caller's) are never
//!   replaced by the file's own.
//!
//! What the merged values turn into is up to the entity kind: see
//! [`EntityKind::convert`].

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::error::ConfReaderError;
use crate::reader::ConfigReader;
use crate::types::{InitOverrides, OptionSpec, OptionValues};

pub const DEFINITION_SECTION: &str = "Definition";
pub const INIT_SECTION: &str = "Init";

/// What a concrete entity kind (filter, action, ...) provides.
pub trait EntityKind {
    /// The domain object [`convert`](Self::convert) produces.
    type Output;

    /// Options expected in the `Definition` section.
    fn option_specs(&self) -> Vec<OptionSpec>;

    /// Turn the merged `Definition` and `Init` values into the kind's
    /// executable form.
    fn convert(&self, definition: &Definition<'_>) -> Result<Self::Output, ConfReaderError>;
}

/// Everything a [`DefinitionReader`] resolved, as seen by
/// [`EntityKind::convert`].
#[derive(Clone, Copy)]
pub struct Definition<'a> {
    pub file: &'a str,
    pub jail_name: &'a str,
    pub options: &'a OptionValues,
    pub init: &'a InitOverrides,
    pub reader: &'a ConfigReader,
}

pub struct DefinitionReader<K: EntityKind> {
    kind: K,
    file: String,
    jail_name: String,
    init: InitOverrides,
    options: OptionValues,
    reader: ConfigReader,
}

impl<K: EntityKind> DefinitionReader<K> {
    /// `init` seeds the Init overrides; harvested file values never replace
    /// its entries.
    pub fn new(kind: K, file: &str, jail_name: &str, init: InitOverrides, reader: ConfigReader) -> Self {
        Self {
            kind,
            file: file.to_string(),
            jail_name: jail_name.to_string(),
            init,
            options: OptionValues::new(),
            reader,
        }
    }

    /// Point the reader at another entity. Clears the Init overrides.
    pub fn set_file(&mut self, file: &str) {
        self.file = file.to_string();
        self.init.clear();
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn set_jail_name(&mut self, jail_name: &str) {
        self.jail_name = jail_name.to_string();
    }

    pub fn jail_name(&self) -> &str {
        &self.jail_name
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub fn reader(&self) -> &ConfigReader {
        &self.reader
    }

    /// `Definition` values from the last [`get_options`](Self::get_options).
    pub fn options(&self) -> &OptionValues {
        &self.options
    }

    pub fn init(&self) -> &InitOverrides {
        &self.init
    }

    /// Resolve the entity by name through the directory layout, once.
    pub fn read(&mut self) -> Result<bool, ConfReaderError> {
        self.reader.read(&self.file, true)
    }

    /// Parse `file` as a single path, without the directory layout.
    pub fn read_explicit(&mut self) -> bool {
        self.reader.read_explicit(Path::new(&self.file))
    }

    /// Extract `Definition` options not supplied by the caller, then harvest
    /// `Init` values not present yet.
    pub fn get_options(&mut self, caller_overrides: &InitOverrides) -> (OptionValues, InitOverrides) {
        let exclude: BTreeSet<String> = caller_overrides.keys().cloned().collect();
        self.options = self.reader.get_options(
            DEFINITION_SECTION,
            &self.kind.option_specs(),
            Some(&exclude),
        );

        if self.reader.has_section(INIT_SECTION)
            && let Ok(names) = self.reader.options(INIT_SECTION)
        {
            for name in names {
                if self.init.contains_key(&name) {
                    debug!("Keeping '{name}' already set for {}", self.file);
                    continue;
                }
                match self.reader.get(INIT_SECTION, &name) {
                    Ok(value) => {
                        self.init.insert(name, value);
                    }
                    Err(e) => warn!("Skipping '{name}' in [{INIT_SECTION}] of {}: {e}", self.file),
                }
            }
        }

        (self.options.clone(), self.init.clone())
    }

    pub fn convert(&self) -> Result<K::Output, ConfReaderError> {
        self.kind.convert(&Definition {
            file: &self.file,
            jail_name: &self.jail_name,
            options: &self.options,
            init: &self.init,
            reader: &self.reader,
        })
    }
}
