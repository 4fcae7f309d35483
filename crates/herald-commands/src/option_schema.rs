use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `OptionKind` values.
pub enum OptionKind {
    String,
    Integer,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Number,
    Attachment,
}

impl OptionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::User => "user",
            Self::Channel => "channel",
            Self::Role => "role",
            Self::Mentionable => "mentionable",
            Self::Number => "number",
            Self::Attachment => "attachment",
        }
    }

    /// Application-command option type code used by the host platform.
    pub fn wire_code(self) -> u8 {
        match self {
            Self::String => 3,
            Self::Integer => 4,
            Self::Boolean => 5,
            Self::User => 6,
            Self::Channel => 7,
            Self::Role => 8,
            Self::Mentionable => 9,
            Self::Number => 10,
            Self::Attachment => 11,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `OptionSpec` declaring one typed command parameter.
pub struct OptionSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub kind: OptionKind,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_message: Option<String>,
}

impl OptionSpec {
    pub fn required(
        name: impl Into<String>,
        kind: OptionKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind,
            required: true,
            missing_message: None,
        }
    }

    pub fn optional(
        name: impl Into<String>,
        kind: OptionKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            required: false,
            ..Self::required(name, kind, description)
        }
    }

    /// Overrides the user-facing message emitted when this option is missing or blank.
    pub fn with_missing_message(mut self, message: impl Into<String>) -> Self {
        self.missing_message = Some(message.into());
        self
    }

    pub fn missing_message(&self) -> String {
        match &self.missing_message {
            Some(message) => message.clone(),
            None => format!("Missing required option `{}`.", self.name),
        }
    }

    fn is_blank(&self, value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(text) if self.kind == OptionKind::String => text.trim().is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `RawOption` carrying one supplied `(name, value)` pair.
pub struct RawOption {
    pub name: String,
    pub value: Value,
}

impl RawOption {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Validation failure naming the offending option.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ValidationFailure {
    pub option: String,
    pub message: String,
}

/// Validated option values keyed by option name.
///
/// Values keep the shape they were supplied in; handlers apply any deeper
/// semantic checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandArguments {
    values: BTreeMap<String, Value>,
}

impl CommandArguments {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn string(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn boolean(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    pub fn integer(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Returns the opaque user identifier carried by a USER option.
    pub fn user_id(&self, name: &str) -> Option<String> {
        match self.get(name)? {
            Value::String(raw) => Some(raw.trim().to_string()),
            Value::Number(number) => Some(number.to_string()),
            _ => None,
        }
    }
}

/// Validates supplied options against `schema` and extracts the declared values.
///
/// Matching is by exact name; the first supplied pair wins and unknown names
/// are ignored. A required option that is absent, null, or (for strings)
/// blank after trimming fails validation.
pub fn validate_options(
    schema: &[OptionSpec],
    supplied: &[RawOption],
) -> Result<CommandArguments, ValidationFailure> {
    for option in supplied {
        if !schema.iter().any(|spec| spec.name == option.name) {
            debug!(option = %option.name, "ignoring unknown command option");
        }
    }

    let mut values = BTreeMap::new();
    for spec in schema {
        let value = supplied
            .iter()
            .find(|option| option.name == spec.name)
            .map(|option| &option.value);
        match value {
            Some(value) if !spec.is_blank(value) => {
                values.insert(spec.name.clone(), value.clone());
            }
            _ if spec.required => {
                return Err(ValidationFailure {
                    option: spec.name.clone(),
                    message: spec.missing_message(),
                });
            }
            Some(Value::Null) | None => {}
            Some(value) => {
                values.insert(spec.name.clone(), value.clone());
            }
        }
    }
    Ok(CommandArguments { values })
}
