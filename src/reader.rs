//! The facade callers read entities through.
//!
//! A [`ConfigReader`] is backed either by a store of its own or by a
//! [`SharedCache`]. In shared mode nothing happens until the first
//! [`read`](ConfigReader::read): that call looks the name up in the cache,
//! registers a fresh store if there is none, and binds the reader to it.
//! Every query method behaves the same in both modes.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::builder::ReaderBuilder;
use crate::cache::{SharedCache, SharedStore, lock};
use crate::error::ConfReaderError;
use crate::settings::{DEFAULT_BASEDIR, StoreSettings};
use crate::store::EntityStore;
use crate::types::{OptionSpec, OptionValues};

enum Backing {
    Bound(SharedStore),
    Unbound(SharedCache),
}

pub struct ConfigReader {
    settings: StoreSettings,
    backing: Backing,
}

impl ConfigReader {
    pub fn builder() -> ReaderBuilder {
        ReaderBuilder::new()
    }

    /// A reader with a private store.
    pub fn new(settings: StoreSettings) -> Self {
        let store = Arc::new(Mutex::new(EntityStore::new(&settings)));
        Self {
            settings,
            backing: Backing::Bound(store),
        }
    }

    /// A reader that takes its store from `cache` on first read.
    pub fn shared(cache: &SharedCache, settings: StoreSettings) -> Self {
        Self {
            settings,
            backing: Backing::Unbound(cache.clone()),
        }
    }

    /// A reader over an existing store, sharing its parsed state and read
    /// cache.
    pub fn from_store(store: SharedStore, settings: StoreSettings) -> Self {
        Self {
            settings,
            backing: Backing::Bound(store),
        }
    }

    /// Whether the reader holds a store yet. Private readers always do.
    pub fn is_bound(&self) -> bool {
        matches!(self.backing, Backing::Bound(_))
    }

    /// The store this reader is bound to, if any.
    pub fn store(&self) -> Option<SharedStore> {
        match &self.backing {
            Backing::Bound(store) => Some(Arc::clone(store)),
            Backing::Unbound(_) => None,
        }
    }

    pub fn set_basedir(&mut self, basedir: Option<PathBuf>) {
        match &self.backing {
            Backing::Bound(store) => lock(store).set_basedir(basedir),
            Backing::Unbound(_) => {
                self.settings.config.basedir =
                    basedir.unwrap_or_else(|| PathBuf::from(DEFAULT_BASEDIR));
            }
        }
    }

    pub fn basedir(&self) -> PathBuf {
        self.inspect(|store| store.basedir().to_path_buf())
    }

    /// Read entity `name`.
    ///
    /// With `once`, a name this reader's store has already read returns the
    /// recorded result without touching the filesystem; in shared mode that
    /// holds across every reader built on the same cache. `once = false`
    /// always reads again.
    pub fn read(&mut self, name: &str, once: bool) -> Result<bool, ConfReaderError> {
        let store = self.bind(name);
        let mut store = lock(&store);
        store.read_once(name, once)
    }

    pub fn sections(&self) -> Vec<String> {
        self.inspect(|store| store.config().sections())
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.inspect(|store| store.config().has_section(section))
    }

    pub fn options(&self, section: &str) -> Result<Vec<String>, ConfReaderError> {
        self.inspect(|store| store.config().options(section))
    }

    pub fn get(&self, section: &str, option: &str) -> Result<String, ConfReaderError> {
        self.inspect(|store| store.config().get(section, option))
    }

    /// The value before `%(name)s` expansion.
    pub fn get_raw(&self, section: &str, option: &str) -> Result<String, ConfReaderError> {
        self.inspect(|store| store.config().get_raw(section, option))
    }

    pub fn get_options(
        &self,
        section: &str,
        specs: &[OptionSpec],
        exclude: Option<&BTreeSet<String>>,
    ) -> OptionValues {
        self.inspect(|store| store.get_options(section, specs, exclude))
    }

    /// Parse one file directly into the bound store (binding under `path`'s
    /// display name in shared mode).
    pub fn read_explicit(&mut self, path: &Path) -> bool {
        let store = self.bind(&path.display().to_string());
        let mut store = lock(&store);
        store.read_explicit(path)
    }

    fn bind(&mut self, name: &str) -> SharedStore {
        match &self.backing {
            Backing::Bound(store) => Arc::clone(store),
            Backing::Unbound(cache) => {
                let settings = &self.settings;
                let store = cache.get_or_create(name, || EntityStore::new(settings));
                self.backing = Backing::Bound(Arc::clone(&store));
                store
            }
        }
    }

    /// Run `f` against the bound store; an unbound reader answers as an
    /// empty store built from its settings.
    fn inspect<R>(&self, f: impl FnOnce(&EntityStore) -> R) -> R {
        match &self.backing {
            Backing::Bound(store) => f(&lock(store)),
            Backing::Unbound(_) => f(&EntityStore::new(&self.settings)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{CountingParser, layout};
    use crate::settings::ReaderConfig;

    fn settings(dir: &Path, parser: &CountingParser) -> StoreSettings {
        StoreSettings::new(ReaderConfig::with_basedir(dir)).with_parser(Arc::new(parser.clone()))
    }

    #[test]
    fn private_reader_caches_per_name() {
        let dir = layout(&[("sshd.conf", "[Definition]\nport = 22\n")]);
        let parser = CountingParser::default();
        let mut reader = ConfigReader::new(settings(dir.path(), &parser));

        assert!(reader.read("sshd", true).unwrap());
        assert!(reader.read("sshd", true).unwrap());
        assert_eq!(parser.calls(), 1);
        assert!(reader.read("sshd", false).unwrap());
        assert_eq!(parser.calls(), 2);
        assert_eq!(reader.get("Definition", "port").unwrap(), "22");
    }

    #[test]
    fn two_shared_readers_parse_once() {
        let dir = layout(&[("filter.d/sshd.conf", "[Definition]\nfailregex = \"x\"\n")]);
        let parser = CountingParser::default();
        let cache = SharedCache::new();

        let mut first = ConfigReader::shared(&cache, settings(dir.path(), &parser));
        let mut second = ConfigReader::shared(&cache, settings(dir.path(), &parser));
        assert!(!first.is_bound());

        assert!(first.read("filter.d/sshd", true).unwrap());
        assert!(second.read("filter.d/sshd", true).unwrap());
        assert_eq!(parser.calls(), 1);
        assert_eq!(cache.names(), vec!["filter.d/sshd"]);
        assert!(Arc::ptr_eq(&first.store().unwrap(), &second.store().unwrap()));
        assert_eq!(second.get("Definition", "failregex").unwrap(), "x");

        assert!(second.read("filter.d/sshd", false).unwrap());
        assert_eq!(parser.calls(), 2);
    }

    #[test]
    fn separate_caches_do_not_share() {
        let dir = layout(&[("sshd.conf", "[a]\nx = 1\n")]);
        let parser = CountingParser::default();

        let mut first = ConfigReader::shared(&SharedCache::new(), settings(dir.path(), &parser));
        let mut second = ConfigReader::shared(&SharedCache::new(), settings(dir.path(), &parser));
        first.read("sshd", true).unwrap();
        second.read("sshd", true).unwrap();
        assert_eq!(parser.calls(), 2);
    }

    #[test]
    fn missing_entity_stays_false() {
        let dir = layout(&[]);
        let cache = SharedCache::new();
        let mut reader = ConfigReader::shared(&cache, StoreSettings::new(ReaderConfig::with_basedir(dir.path())));
        assert!(!reader.read("nonexistent", true).unwrap());
        assert!(!reader.read("nonexistent", true).unwrap());
        assert!(reader.sections().is_empty());
        assert!(matches!(
            reader.get("Definition", "x"),
            Err(ConfReaderError::NoSection(_))
        ));
    }

    #[test]
    fn unbound_reader_answers_as_empty() {
        let reader = ConfigReader::shared(&SharedCache::new(), StoreSettings::default());
        assert!(reader.sections().is_empty());
        assert!(!reader.has_section("Definition"));
        assert!(reader.options("Definition").is_err());
        assert!(reader.get_options("Definition", &[], None).is_empty());
    }

    #[test]
    fn basedir_before_and_after_binding() {
        let dir = layout(&[("sshd.conf", "[a]\nx = 1\n")]);
        let mut reader = ConfigReader::shared(&SharedCache::new(), StoreSettings::default());
        reader.set_basedir(Some(dir.path().to_path_buf()));
        assert_eq!(reader.basedir(), dir.path());

        assert!(reader.read("sshd", true).unwrap());
        reader.set_basedir(None);
        assert_eq!(reader.basedir(), PathBuf::from(DEFAULT_BASEDIR));
    }

    #[test]
    fn missing_basedir_propagates() {
        let dir = layout(&[]);
        let mut reader = ConfigReader::new(StoreSettings::new(ReaderConfig::with_basedir(
            dir.path().join("nope"),
        )));
        assert!(matches!(
            reader.read("sshd", true),
            Err(ConfReaderError::BaseDirMissing { .. })
        ));
    }

    #[test]
    fn from_store_shares_read_cache() {
        let dir = layout(&[("sshd.conf", "[a]\nx = 1\n")]);
        let parser = CountingParser::default();
        let mut owner = ConfigReader::new(settings(dir.path(), &parser));
        owner.read("sshd", true).unwrap();

        let mut borrower = ConfigReader::from_store(owner.store().unwrap(), settings(dir.path(), &parser));
        assert!(borrower.read("sshd", true).unwrap());
        assert_eq!(parser.calls(), 1);
        assert_eq!(borrower.options("a").unwrap(), vec!["x"]);
    }

    #[test]
    fn queries_are_repeatable() {
        let dir = layout(&[("jail.conf", "[sshd]\nenabled = true\n[nginx]\nenabled = false\n")]);
        let mut reader = ConfigReader::new(StoreSettings::new(ReaderConfig::with_basedir(dir.path())));
        reader.read("jail", true).unwrap();
        let first = (reader.sections(), reader.get("sshd", "enabled").unwrap());
        let second = (reader.sections(), reader.get("sshd", "enabled").unwrap());
        assert_eq!(first, second);
        assert_eq!(first.0, vec!["nginx", "sshd"]);
    }

    #[test]
    fn concurrent_shared_reads_parse_once() {
        let dir = layout(&[("sshd.conf", "[Definition]\nport = 22\n")]);
        let parser = CountingParser::default();
        let cache = SharedCache::new();
        let settings = settings(dir.path(), &parser);

        let results: Vec<bool> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..16)
                .map(|_| {
                    let cache = &cache;
                    let settings = settings.clone();
                    scope.spawn(move || {
                        ConfigReader::shared(cache, settings)
                            .read("sshd", true)
                            .unwrap()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert!(results.iter().all(|&read| read));
        assert_eq!(parser.calls(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn shared_read_explicit_binds_under_path() {
        let dir = layout(&[("custom/sshd.conf", "[Definition]\nport = 22\n")]);
        let path = dir.path().join("custom/sshd.conf");
        let cache = SharedCache::new();
        let mut reader = ConfigReader::shared(
            &cache,
            StoreSettings::new(ReaderConfig::with_basedir(dir.path())),
        );

        assert!(reader.read_explicit(&path));
        assert!(reader.is_bound());
        assert_eq!(cache.names(), vec![path.display().to_string()]);
        assert_eq!(reader.get("Definition", "port").unwrap(), "22");
    }
}
