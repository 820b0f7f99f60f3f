//! Layered entity configuration for log-watching ban daemons. Name an
//! entity, point at a base directory, and read merged, typed values.
//!
//! An *entity* is a logical configuration unit addressed by a relative name
//! such as `jail`, `filter.d/sshd` or `action.d/iptables`. Confreader finds
//! the files that make up an entity, merges them in a fixed order, and hands
//! out values as strings or as typed option maps with defaults.
//!
//! ```ignore
//! let mut reader = ConfigReader::builder()
//!     .basedir("/etc/fail2ban")
//!     .build();
//! reader.read("filter.d/sshd", true)?;
//! let regex = reader.get("Definition", "failregex")?;
//! ```
//!
//! # File discovery
//!
//! For entity `name` under base directory `B`, these candidates are tried,
//! lowest priority first:
//!
//! ```text
//! B/name.conf
//! B/name.d/*.conf      sorted by file name
//! B/name.local
//! B/name.d/*.local     sorted by file name
//! ```
//!
//! Missing candidates are skipped. Every file found is a sparse overlay:
//! later files add sections and replace individual options, and never
//! delete anything. A `.local` file is where site administrators put the
//! handful of values they change; the `.conf` it overrides stays pristine.
//!
//! An entity with no files at all is not an error. [`ConfigReader::read`]
//! logs it and returns `Ok(false)`, and every later query answers as for an
//! empty configuration. Only a missing base directory is an error.
//!
//! # File format
//!
//! Files are TOML documents interpreted as INI-style sections:
//!
//! - each top-level table is a section;
//! - top-level scalars and the `[DEFAULT]` table are defaults, visible in
//!   every section;
//! - arrays of scalars become multi-line values, one element per line;
//! - values may reference other options of the same section (or the
//!   defaults) with `%(name)s`; `%%` is a literal percent sign;
//! - an `[INCLUDES]` table with `before` and `after` entries names further
//!   files, relative to the including file, parsed before or after it.
//!
//! The text format sits behind the [`ConfigParser`] trait, so a different
//! syntax can be plugged in through [`ReaderBuilder::parser`].
//!
//! # Sharing parsed entities
//!
//! Many jails reference the same filter or action. Readers built on one
//! [`SharedCache`] resolve a name to a single [`EntityStore`] and read it
//! once:
//!
//! ```ignore
//! let cache = SharedCache::new();
//! for jail in ["sshd", "sshd-ddos"] {
//!     let mut reader = ConfigReader::builder().shared(&cache).build();
//!     reader.read("filter.d/sshd", true)?; // parsed on the first pass only
//! }
//! ```
//!
//! A shared reader binds to its store on its first `read`. Before that it
//! behaves as an empty configuration.
//!
//! # Typed options
//!
//! [`ConfigReader::get_options`] extracts a list of [`OptionSpec`]s from one
//! section into [`OptionValues`]. Missing or malformed values fall back to
//! the declared default and are logged; options with no value and no default
//! are left out of the map.
//!
//! # Definition and Init
//!
//! Filters and actions keep their own options under `[Definition]` and
//! overridable values under `[Init]`. [`DefinitionReader`] extracts the
//! former, harvests the latter without replacing values the calling jail
//! already set, and hands both to an [`EntityKind`] for conversion into
//! the kind's own type.
//!
//! # Settings
//!
//! Reader settings are a confique struct, [`ReaderConfig`], loadable from
//! `CONFREADER_*` environment variables and a TOML file:
//!
//! | Env var | Setting | Default |
//! |---------|---------|---------|
//! | `CONFREADER_BASEDIR` | `basedir` | `/etc/fail2ban` |
//! | `CONFREADER_INTERPOLATION` | `interpolation` | `true` |
//! | `CONFREADER_MAX_INTERPOLATION_DEPTH` | `max_interpolation_depth` | `10` |
//!
//! # Clap adapter
//!
//! The `cli` module (behind the `clap` feature, on by default) provides
//! [`EntityArgs`], which converts into a [`ReadAction`] for
//! [`ReaderBuilder::handle`]. Without clap:
//!
//! ```toml
//! confreader = { version = "...", default-features = false }
//! ```
//!
//! # Error handling
//!
//! Fallible operations return [`ConfReaderError`]. Per-file problems while
//! reading (unreadable, malformed, include cycles) are logged through
//! `tracing` and the file is skipped, so one broken `.local` never hides
//! the rest of an entity.

pub mod error;
pub mod types;

mod builder;
mod cache;
#[cfg(feature = "clap")]
mod cli;
mod definition;
mod extract;
mod file;
pub(crate) mod merge;
mod merged;
mod ops;
mod parser;
mod reader;
mod settings;
mod store;

#[cfg(test)]
mod fixtures;

pub use builder::ReaderBuilder;
pub use cache::{SharedCache, SharedStore};
#[cfg(feature = "clap")]
pub use cli::{EntityArgs, EntitySubcommand};
pub use definition::{DEFINITION_SECTION, Definition, DefinitionReader, EntityKind, INIT_SECTION};
pub use error::ConfReaderError;
pub use extract::extract_options;
pub use file::candidate_files;
pub use merge::DEFAULT_SECTION;
pub use merged::MergedConfig;
pub use ops::ReadResult;
pub use parser::{ConfigParser, TomlParser};
pub use reader::ConfigReader;
pub use settings::{DEFAULT_BASEDIR, DEFAULT_MAX_INTERPOLATION_DEPTH, ReaderConfig, StoreSettings};
pub use store::EntityStore;
pub use types::{InitOverrides, OptionSpec, OptionType, OptionValue, OptionValues, ReadAction};
