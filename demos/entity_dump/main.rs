//! # entity_dump
//!
//! Inspect how confreader resolves an entity under a base directory.
//!
//! ```sh
//! cargo run --example entity_dump -- -c /etc/fail2ban sections jail
//! cargo run --example entity_dump -- -c /etc/fail2ban list filter.d/sshd
//! cargo run --example entity_dump -- get action.d/iptables Init port
//! CONFREADER_BASEDIR=/srv/f2b cargo run --example entity_dump -- --json list jail
//! RUST_LOG=confreader=trace cargo run --example entity_dump -- list filter.d/sshd
//! ```

use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use confreader::{ConfReaderError, ConfigReader, EntityArgs, ReadResult};

/// Print the merged configuration of an entity.
#[derive(Parser, Debug)]
#[command(name = "entity-dump")]
struct Cli {
    /// Log which files are read and how values resolve.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    entity: EntityArgs,
}

fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::WARN };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<ReadResult, ConfReaderError> {
    let action = cli.entity.into_action();
    ConfigReader::builder().from_env()?.handle(&action)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_tracing(cli.verbose);
    let json = cli.json;

    let result = match run(cli) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if json {
        match result.to_json() {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
    } else {
        println!("{result}");
    }

    match result {
        ReadResult::NotFound { .. } => ExitCode::from(2),
        _ => ExitCode::SUCCESS,
    }
}
