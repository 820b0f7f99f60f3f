use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// How a raw option string is coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionType {
    Bool,
    Int,
    String,
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Bool => write!(f, "bool"),
            OptionType::Int => write!(f, "int"),
            OptionType::String => write!(f, "string"),
        }
    }
}

/// A typed option value after coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Int(i64),
    String(String),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            OptionValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionValue::Bool(b) => write!(f, "{b}"),
            OptionValue::Int(i) => write!(f, "{i}"),
            OptionValue::String(s) => write!(f, "{s:?}"),
        }
    }
}

/// One expected option: its type, its name, and the value used when it is
/// missing or invalid. A `None` default marks the option as optional.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSpec {
    pub kind: OptionType,
    pub name: String,
    pub default: Option<OptionValue>,
}

impl OptionSpec {
    pub fn bool(name: &str, default: Option<bool>) -> Self {
        Self {
            kind: OptionType::Bool,
            name: name.to_string(),
            default: default.map(OptionValue::Bool),
        }
    }

    pub fn int(name: &str, default: Option<i64>) -> Self {
        Self {
            kind: OptionType::Int,
            name: name.to_string(),
            default: default.map(OptionValue::Int),
        }
    }

    pub fn string(name: &str, default: Option<&str>) -> Self {
        Self {
            kind: OptionType::String,
            name: name.to_string(),
            default: default.map(|s| OptionValue::String(s.to_string())),
        }
    }
}

/// Resolved option values keyed by option name. Options that resolve to no
/// value at all are absent rather than present as a null.
pub type OptionValues = BTreeMap<String, OptionValue>;

/// Raw initialization values a calling context may override.
pub type InitOverrides = BTreeMap<String, String>;

/// A read operation, independent of any CLI framework.
/// The CLI layer converts parsed clap args into this.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadAction {
    /// Every section with its options and values.
    List { name: String, basedir: Option<PathBuf> },
    /// Section names only.
    Sections { name: String, basedir: Option<PathBuf> },
    /// A single value.
    Get {
        name: String,
        basedir: Option<PathBuf>,
        section: String,
        option: String,
    },
}

impl ReadAction {
    /// The entity every action reads first.
    pub fn name(&self) -> &str {
        match self {
            ReadAction::List { name, .. }
            | ReadAction::Sections { name, .. }
            | ReadAction::Get { name, .. } => name,
        }
    }

    pub fn basedir(&self) -> Option<&Path> {
        match self {
            ReadAction::List { basedir, .. }
            | ReadAction::Sections { basedir, .. }
            | ReadAction::Get { basedir, .. } => basedir.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_constructors_carry_typed_defaults() {
        assert_eq!(
            OptionSpec::int("maxretry", Some(3)).default,
            Some(OptionValue::Int(3))
        );
        assert_eq!(OptionSpec::string("logpath", None).default, None);
        assert_eq!(OptionSpec::bool("enabled", Some(false)).kind, OptionType::Bool);
    }

    #[test]
    fn option_value_serializes_untagged() {
        let mut values = OptionValues::new();
        values.insert("enabled".into(), OptionValue::Bool(true));
        values.insert("maxretry".into(), OptionValue::Int(5));
        values.insert("logpath".into(), OptionValue::String("/var/log/auth.log".into()));
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(
            json,
            r#"{"enabled":true,"logpath":"/var/log/auth.log","maxretry":5}"#
        );
    }

    #[test]
    fn accessors_match_variant() {
        assert_eq!(OptionValue::Int(7).as_int(), Some(7));
        assert_eq!(OptionValue::Int(7).as_bool(), None);
        assert_eq!(OptionValue::String("x".into()).as_str(), Some("x"));
    }

    #[test]
    fn action_accessors_cover_every_variant() {
        let get = ReadAction::Get {
            name: "action.d/iptables".into(),
            basedir: Some(PathBuf::from("/srv")),
            section: "Init".into(),
            option: "port".into(),
        };
        assert_eq!(get.name(), "action.d/iptables");
        assert_eq!(get.basedir(), Some(Path::new("/srv")));

        let list = ReadAction::List {
            name: "jail".into(),
            basedir: None,
        };
        assert_eq!(list.name(), "jail");
        assert_eq!(list.basedir(), None);
    }
}
