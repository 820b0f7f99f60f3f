//! Clap adapter for confreader.
//!
//! Compiled only with the `clap` Cargo feature (on by default). It provides
//! [`EntityArgs`] and [`EntitySubcommand`], which embed into an application's
//! `#[derive(Parser)]` struct to give it `list|sections|get` subcommands over
//! entity configuration.
//!
//! [`EntityArgs::into_action()`] is the only bridge to the core: it turns the
//! parsed arguments into a [`ReadAction`](crate::ReadAction), which
//! [`ReaderBuilder::handle()`](crate::ReaderBuilder::handle) runs.

use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::types::ReadAction;

/// Clap-derived args for reading entity configuration.
///
/// ```ignore
/// #[derive(Parser)]
/// struct Cli {
///     #[command(subcommand)]
///     command: Commands,
/// }
///
/// #[derive(Subcommand)]
/// enum Commands {
///     Entity(EntityArgs),
/// }
/// ```
#[derive(Debug, Args)]
pub struct EntityArgs {
    /// Configuration base directory (defaults to the reader's own).
    #[arg(long, short = 'c', global = true)]
    pub basedir: Option<PathBuf>,

    #[command(subcommand)]
    pub action: EntitySubcommand,
}

#[derive(Debug, Subcommand)]
pub enum EntitySubcommand {
    /// Show every section of an entity with its resolved values.
    List {
        /// Entity name relative to the base directory (e.g. "filter.d/sshd").
        name: String,
    },
    /// Show the section names of an entity.
    Sections {
        /// Entity name relative to the base directory.
        name: String,
    },
    /// Show one resolved value.
    Get {
        /// Entity name relative to the base directory.
        name: String,
        section: String,
        option: String,
    },
}

impl EntityArgs {
    /// Convert clap-parsed args into a framework-agnostic `ReadAction`.
    pub fn into_action(self) -> ReadAction {
        let basedir = self.basedir;
        match self.action {
            EntitySubcommand::List { name } => ReadAction::List { name, basedir },
            EntitySubcommand::Sections { name } => ReadAction::Sections { name, basedir },
            EntitySubcommand::Get {
                name,
                section,
                option,
            } => ReadAction::Get {
                name,
                basedir,
                section,
                option,
            },
        }
    }
}
