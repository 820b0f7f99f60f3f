//! Merged key/value state shared by every file an entity is built from.
//!
//! Values are exposed as strings whatever their TOML type, the way an
//! INI-style reader would see them. Lookups in a section fall back to the
//! `DEFAULT` section. [`MergedConfig::get`] expands `%(name)s` references
//! against the same section (then the defaults); `%%` is a literal percent.

use toml::{Table, Value};

use crate::error::ConfReaderError;
use crate::merge;
use crate::settings::{DEFAULT_MAX_INTERPOLATION_DEPTH, ReaderConfig};

/// Sections of options accumulated from one or more parsed files.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedConfig {
    sections: Table,
    defaults: Table,
    interpolation: bool,
    max_depth: usize,
}

impl Default for MergedConfig {
    fn default() -> Self {
        Self {
            sections: Table::new(),
            defaults: Table::new(),
            interpolation: true,
            max_depth: DEFAULT_MAX_INTERPOLATION_DEPTH,
        }
    }
}

impl MergedConfig {
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            interpolation: config.interpolation,
            max_depth: config.max_interpolation_depth,
            ..Self::default()
        }
    }

    /// Layer a parsed document on top of the current state.
    pub fn merge(&mut self, document: Table) {
        merge::merge_layer(&mut self.sections, &mut self.defaults, document);
    }

    /// Section names, excluding `DEFAULT`, in lexicographic order.
    pub fn sections(&self) -> Vec<String> {
        self.sections.keys().cloned().collect()
    }

    pub fn has_section(&self, section: &str) -> bool {
        self.sections.contains_key(section)
    }

    /// Option names visible in `section`, including inherited defaults.
    pub fn options(&self, section: &str) -> Result<Vec<String>, ConfReaderError> {
        let table = self.section(section)?;
        let mut names: Vec<String> = table.keys().cloned().collect();
        for key in self.defaults.keys() {
            if !table.contains_key(key) {
                names.push(key.clone());
            }
        }
        names.sort();
        Ok(names)
    }

    /// The raw value, before interpolation.
    pub fn get_raw(&self, section: &str, option: &str) -> Result<String, ConfReaderError> {
        let table = self.section(section)?;
        table
            .get(option)
            .or_else(|| self.defaults.get(option))
            .map(value_to_string)
            .ok_or_else(|| ConfReaderError::NoOption {
                section: section.into(),
                option: option.into(),
            })
    }

    /// The value with `%(name)s` references expanded.
    pub fn get(&self, section: &str, option: &str) -> Result<String, ConfReaderError> {
        let raw = self.get_raw(section, option)?;
        if !self.interpolation {
            return Ok(raw);
        }
        self.interpolate(section, option, &raw, 1)
    }

    /// Boolean literal forms: `1/yes/true/on` and `0/no/false/off`.
    pub fn get_bool(&self, section: &str, option: &str) -> Result<bool, ConfReaderError> {
        let value = self.get(section, option)?;
        parse_bool(&value).ok_or_else(|| ConfReaderError::InvalidValue {
            section: section.into(),
            option: option.into(),
            reason: format!("not a boolean: {value:?}"),
        })
    }

    pub fn get_int(&self, section: &str, option: &str) -> Result<i64, ConfReaderError> {
        let value = self.get(section, option)?;
        value
            .trim()
            .parse::<i64>()
            .map_err(|e| ConfReaderError::InvalidValue {
                section: section.into(),
                option: option.into(),
                reason: format!("{value:?}: {e}"),
            })
    }

    fn section(&self, section: &str) -> Result<&Table, ConfReaderError> {
        self.sections
            .get(section)
            .and_then(Value::as_table)
            .ok_or_else(|| ConfReaderError::NoSection(section.into()))
    }

    fn interpolate(
        &self,
        section: &str,
        option: &str,
        raw: &str,
        depth: usize,
    ) -> Result<String, ConfReaderError> {
        if !raw.contains('%') {
            return Ok(raw.to_string());
        }
        if depth > self.max_depth {
            return Err(ConfReaderError::InterpolationDepth {
                section: section.into(),
                option: option.into(),
                limit: self.max_depth,
            });
        }

        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(pos) = rest.find('%') {
            out.push_str(&rest[..pos]);
            let tail = &rest[pos..];
            if let Some(after) = tail.strip_prefix("%%") {
                out.push('%');
                rest = after;
            } else if let Some(reference) = tail.strip_prefix("%(")
                && let Some(end) = reference.find(")s")
            {
                let name = &reference[..end];
                let value = self.get_raw(section, name).map_err(|_| {
                    ConfReaderError::InterpolationMissing {
                        section: section.into(),
                        option: option.into(),
                        reference: name.into(),
                    }
                })?;
                out.push_str(&self.interpolate(section, option, &value, depth + 1)?);
                rest = &reference[end + 2..];
            } else {
                // Lone percent sign: kept literally.
                out.push('%');
                rest = &tail[1..];
            }
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Accepted boolean literals, case-insensitive.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

/// Render a TOML value the way it is exposed to readers.
/// Arrays become one element per line.
fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => format!("{f:?}"),
        Value::Boolean(b) => b.to_string(),
        Value::Datetime(d) => d.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        Value::Table(_) => value.to_string(),
    }
}
