use std::path::PathBuf;
use std::sync::Arc;

use crate::cache::SharedCache;
use crate::error::ConfReaderError;
use crate::ops::{self, ReadResult};
use crate::parser::ConfigParser;
use crate::reader::ConfigReader;
use crate::settings::{ReaderConfig, StoreSettings};
use crate::types::ReadAction;

/// Builder for a [`ConfigReader`].
///
/// Collects the settings once and hands them to the reader at
/// [`build()`](Self::build):
///
/// - **Where**: [`basedir()`](Self::basedir), or a whole [`ReaderConfig`]
///   via [`config()`](Self::config) / [`from_env()`](Self::from_env).
/// - **How**: [`parser()`](Self::parser) swaps the text-format parser.
/// - **Sharing**: [`shared()`](Self::shared) backs the reader with a cache
///   instead of a private store.
pub struct ReaderBuilder {
    config: ReaderConfig,
    basedir: Option<PathBuf>,
    parser: Option<Arc<dyn ConfigParser>>,
    cache: Option<SharedCache>,
}

impl ReaderBuilder {
    pub(crate) fn new() -> Self {
        Self {
            config: ReaderConfig::default(),
            basedir: None,
            parser: None,
            cache: None,
        }
    }

    /// Replace every setting at once.
    pub fn config(mut self, config: ReaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Take settings from `CONFREADER_*` environment variables.
    pub fn from_env(self) -> Result<Self, ConfReaderError> {
        let config = ReaderConfig::from_env()?;
        Ok(self.config(config))
    }

    /// Override the base directory, whatever [`config()`](Self::config) said.
    pub fn basedir(mut self, basedir: impl Into<PathBuf>) -> Self {
        self.basedir = Some(basedir.into());
        self
    }

    pub fn parser(mut self, parser: Arc<dyn ConfigParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Back the reader with `cache`. Readers built on the same cache reuse
    /// each other's stores.
    pub fn shared(mut self, cache: &SharedCache) -> Self {
        self.cache = Some(cache.clone());
        self
    }

    /// Resolve the effective settings.
    fn effective_settings(&self) -> StoreSettings {
        let mut config = self.config.clone();
        if let Some(basedir) = &self.basedir {
            config.basedir = basedir.clone();
        }
        let settings = StoreSettings::new(config);
        match &self.parser {
            Some(parser) => settings.with_parser(Arc::clone(parser)),
            None => settings,
        }
    }

    pub fn build(self) -> ConfigReader {
        let settings = self.effective_settings();
        match &self.cache {
            Some(cache) => ConfigReader::shared(cache, settings),
            None => ConfigReader::new(settings),
        }
    }

    /// Handle a [`ReadAction`] and print the result to stdout.
    pub fn handle_and_print(self, action: &ReadAction) -> Result<(), ConfReaderError> {
        let result = self.handle(action)?;
        println!("{result}");
        Ok(())
    }

    /// Handle a [`ReadAction`] (list / sections / get).
    ///
    /// The action's base directory, when given, wins over the builder's.
    /// An entity with no readable files yields [`ReadResult::NotFound`].
    pub fn handle(self, action: &ReadAction) -> Result<ReadResult, ConfReaderError> {
        let builder = match action.basedir() {
            Some(basedir) => self.basedir(basedir),
            None => self,
        };
        let mut reader = builder.build();
        let name = action.name();
        if !reader.read(name, true)? {
            return Ok(ReadResult::NotFound { name: name.into() });
        }

        match action {
            ReadAction::List { .. } => ops::list_values(&reader),
            ReadAction::Sections { .. } => Ok(ops::list_sections(&reader)),
            ReadAction::Get {
                section, option, ..
            } => ops::get_value(&reader, section, option),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{CountingParser, layout};
    use crate::settings::DEFAULT_BASEDIR;

    #[test]
    fn defaults_to_stock_basedir() {
        let builder = ConfigReader::builder();
        let settings = builder.effective_settings();
        assert_eq!(settings.config.basedir, PathBuf::from(DEFAULT_BASEDIR));
    }

    #[test]
    fn basedir_wins_over_config() {
        let settings = ConfigReader::builder()
            .basedir("/srv/a")
            .config(ReaderConfig::with_basedir("/srv/b"))
            .effective_settings();
        assert_eq!(settings.config.basedir, PathBuf::from("/srv/a"));
    }

    #[test]
    fn config_carries_interpolation_settings() {
        let mut config = ReaderConfig::with_basedir("/srv");
        config.interpolation = false;
        let settings = ConfigReader::builder().config(config).effective_settings();
        assert!(!settings.config.interpolation);
    }

    #[test]
    fn private_by_default() {
        let reader = ConfigReader::builder().build();
        assert!(reader.is_bound());
    }

    #[test]
    fn shared_reader_starts_unbound() {
        let cache = SharedCache::new();
        let reader = ConfigReader::builder().shared(&cache).build();
        assert!(!reader.is_bound());
    }

    #[test]
    fn custom_parser_is_used() {
        let dir = layout(&[("sshd.conf", "[a]\nx = 1\n")]);
        let parser = CountingParser::default();
        let mut reader = ConfigReader::builder()
            .basedir(dir.path())
            .parser(Arc::new(parser.clone()))
            .build();
        assert!(reader.read("sshd", true).unwrap());
        assert_eq!(parser.calls(), 1);
    }

    #[test]
    fn handle_get_reads_the_entity() {
        let dir = layout(&[("action.d/iptables.conf", "[Init]\nport = \"ssh\"\n")]);
        let result = ConfigReader::builder()
            .basedir(dir.path())
            .handle(&ReadAction::Get {
                name: "action.d/iptables".into(),
                basedir: None,
                section: "Init".into(),
                option: "port".into(),
            })
            .unwrap();
        assert_eq!(
            result,
            ReadResult::Value {
                section: "Init".into(),
                option: "port".into(),
                value: "ssh".into(),
            }
        );
    }

    #[test]
    fn handle_action_basedir_wins() {
        let dir = layout(&[("jail.conf", "[sshd]\nenabled = true\n")]);
        let result = ConfigReader::builder()
            .basedir("/nonexistent/confreader")
            .handle(&ReadAction::Sections {
                name: "jail".into(),
                basedir: Some(dir.path().to_path_buf()),
            })
            .unwrap();
        assert_eq!(
            result,
            ReadResult::Sections {
                sections: vec!["sshd".into()]
            }
        );
    }

    #[test]
    fn handle_missing_entity_is_not_found() {
        let dir = layout(&[]);
        let result = ConfigReader::builder()
            .basedir(dir.path())
            .handle(&ReadAction::List {
                name: "filter.d/ghost".into(),
                basedir: None,
            })
            .unwrap();
        assert_eq!(
            result,
            ReadResult::NotFound {
                name: "filter.d/ghost".into()
            }
        );
    }

    #[test]
    fn handle_through_cache_parses_once() {
        let dir = layout(&[("jail.conf", "[sshd]\nenabled = true\n")]);
        let parser = CountingParser::default();
        let cache = SharedCache::new();
        for _ in 0..3 {
            ConfigReader::builder()
                .basedir(dir.path())
                .parser(Arc::new(parser.clone()))
                .shared(&cache)
                .handle(&ReadAction::List {
                    name: "jail".into(),
                    basedir: None,
                })
                .unwrap();
        }
        assert_eq!(parser.calls(), 1);
    }
}
