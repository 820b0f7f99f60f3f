//! Read operations behind `list`, `sections`, and `get`, and the
//! `ReadResult` enum callers use to display results.

use std::fmt;

use serde::Serialize;

use crate::error::ConfReaderError;
use crate::reader::ConfigReader;

/// Result of a read operation. Returned to the caller for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadResult {
    /// The entity has no accessible files.
    NotFound { name: String },
    /// Section names of the merged entity.
    Sections { sections: Vec<String> },
    /// One option's resolved value.
    Value {
        section: String,
        option: String,
        value: String,
    },
    /// Every section with its resolved options.
    Listing {
        sections: Vec<(String, Vec<(String, String)>)>,
    },
}

impl ReadResult {
    pub fn to_json(&self) -> Result<String, ConfReaderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl fmt::Display for ReadResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadResult::NotFound { name } => write!(f, "No configuration found for '{name}'"),
            ReadResult::Sections { sections } => write!(f, "{}", sections.join("\n")),
            ReadResult::Value { value, .. } => write!(f, "{value}"),
            ReadResult::Listing { sections } => {
                for (i, (section, options)) in sections.iter().enumerate() {
                    if i > 0 {
                        writeln!(f)?;
                        writeln!(f)?;
                    }
                    write!(f, "[{section}]")?;
                    for (option, value) in options {
                        write!(f, "\n{option} = {}", indent_continuations(value))?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// Multi-line values are shown with indented continuation lines.
fn indent_continuations(value: &str) -> String {
    value.replace('\n', "\n    ")
}

/// Every section and option the reader currently holds. Values that fail
/// interpolation are shown raw.
pub fn list_values(reader: &ConfigReader) -> Result<ReadResult, ConfReaderError> {
    let mut sections = Vec::new();
    for section in reader.sections() {
        let mut entries = Vec::new();
        for option in reader.options(&section)? {
            let value = match reader.get(&section, &option) {
                Ok(value) => value,
                Err(_) => reader.get_raw(&section, &option)?,
            };
            entries.push((option, value));
        }
        sections.push((section, entries));
    }
    Ok(ReadResult::Listing { sections })
}

pub fn list_sections(reader: &ConfigReader) -> ReadResult {
    ReadResult::Sections {
        sections: reader.sections(),
    }
}

pub fn get_value(
    reader: &ConfigReader,
    section: &str,
    option: &str,
) -> Result<ReadResult, ConfReaderError> {
    let value = reader.get(section, option)?;
    Ok(ReadResult::Value {
        section: section.into(),
        option: option.into(),
        value,
    })
}
