//! Typed option extraction with per-option defaulting.
//!
//! Each [`OptionSpec`] is resolved independently, so one bad option never
//! aborts the rest. The outcomes are kept apart because they mean different
//! things to whoever reads the logs:
//!
//! | Situation                         | Log level | Result               |
//! |-----------------------------------|-----------|----------------------|
//! | Section missing                   | error     | default, if any      |
//! | Option missing, default declared  | warning   | default              |
//! | Option missing, no default        | trace     | omitted              |
//! | Value fails coercion              | warning   | default, if any      |
//!
//! A `None` default never produces an entry: keys that would resolve to no
//! value are left out of the returned map.

use std::collections::BTreeSet;

use tracing::{error, trace, warn};

use crate::error::ConfReaderError;
use crate::merged::MergedConfig;
use crate::types::{OptionSpec, OptionType, OptionValue, OptionValues};

/// Resolve `specs` against `section`, skipping names listed in `exclude`.
pub fn extract_options(
    config: &MergedConfig,
    section: &str,
    specs: &[OptionSpec],
    exclude: Option<&BTreeSet<String>>,
) -> OptionValues {
    let mut values = OptionValues::new();
    for spec in specs {
        if exclude.is_some_and(|names| names.contains(&spec.name)) {
            continue;
        }

        let resolved = match coerce(config, section, spec) {
            Ok(value) => Some(value),
            Err(ConfReaderError::NoSection(_)) => {
                error!("No section: '{section}' (wanted option '{}')", spec.name);
                spec.default.clone()
            }
            Err(ConfReaderError::NoOption { .. }) => {
                match &spec.default {
                    Some(default) => warn!(
                        "'{}' not defined in '{section}'. Using default one: {default}",
                        spec.name
                    ),
                    None => trace!("Non essential option '{}' not defined in '{section}'.", spec.name),
                }
                spec.default.clone()
            }
            Err(e) => {
                warn!(
                    "Wrong value for '{}' in '{section}' ({e}). Using default one: {}",
                    spec.name,
                    describe(&spec.default)
                );
                spec.default.clone()
            }
        };

        if let Some(value) = resolved {
            values.insert(spec.name.clone(), value);
        }
    }
    values
}

fn coerce(
    config: &MergedConfig,
    section: &str,
    spec: &OptionSpec,
) -> Result<OptionValue, ConfReaderError> {
    match spec.kind {
        OptionType::Bool => config.get_bool(section, &spec.name).map(OptionValue::Bool),
        OptionType::Int => config.get_int(section, &spec.name).map(OptionValue::Int),
        OptionType::String => config.get(section, &spec.name).map(OptionValue::String),
    }
}

fn describe(default: &Option<OptionValue>) -> String {
    match default {
        Some(value) => value.to_string(),
        None => "none".to_string(),
    }
}
