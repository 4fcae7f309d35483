use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::command_error::CommandResult;
use crate::host::CommandServices;
use crate::invocation::{CommandReply, InvocationContext};
use crate::option_schema::{CommandArguments, OptionSpec};

pub const MAX_COMMAND_NAME_CHARS: usize = 32;
pub const DEFAULT_FAILURE_LABEL: &str = "Command failed";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `CommandInputType` values.
pub enum CommandInputType {
    #[default]
    BuiltIn,
    BuiltInText,
    BuiltInIntegration,
    Bot,
    Placeholder,
}

/// Trait contract for `CommandHandler` behavior.
///
/// Handlers receive validated arguments and may call host collaborators, but
/// never send messages themselves: the returned reply (or error) becomes the
/// invocation's single outbound message.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn execute(
        &self,
        arguments: &CommandArguments,
        context: &InvocationContext,
        services: &CommandServices,
    ) -> CommandResult<CommandReply>;
}

/// Registered definition of a command: name, schema, and handler.
#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub description: String,
    pub input_type: CommandInputType,
    pub options: Vec<OptionSpec>,
    pub failure_label: String,
    pub handler: Arc<dyn CommandHandler>,
}

impl CommandDescriptor {
    pub fn new<H>(name: impl Into<String>, description: impl Into<String>, handler: H) -> Self
    where
        H: CommandHandler + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            input_type: CommandInputType::default(),
            options: Vec::new(),
            failure_label: DEFAULT_FAILURE_LABEL.to_string(),
            handler: Arc::new(handler),
        }
    }

    pub fn with_option(mut self, option: OptionSpec) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_input_type(mut self, input_type: CommandInputType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Sets the prefix used when a host failure is reported for this command.
    pub fn with_failure_label(mut self, label: impl Into<String>) -> Self {
        self.failure_label = label.into();
        self
    }

    /// Renders `/name <required> [optional]`.
    pub fn usage(&self) -> String {
        let mut usage = format!("/{}", self.name);
        for option in &self.options {
            if option.required {
                usage.push_str(&format!(" <{}>", option.name));
            } else {
                usage.push_str(&format!(" [{}]", option.name));
            }
        }
        usage
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_type", &self.input_type)
            .field("options", &self.options)
            .field("failure_label", &self.failure_label)
            .finish_non_exhaustive()
    }
}

/// Enumerates supported `RegistryError` values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("command '{0}' is already registered")]
    DuplicateCommand(String),
    #[error("command '{0}' is not registered")]
    NotFound(String),
    #[error("invalid command name '{0}'")]
    InvalidCommandName(String),
    #[error("command '{command}' has invalid option name '{option}'")]
    InvalidOptionName { command: String, option: String },
    #[error("command '{command}' declares option '{option}' more than once")]
    DuplicateOption { command: String, option: String },
    #[error("command '{command}' declares required option '{option}' after an optional one")]
    RequiredAfterOptional { command: String, option: String },
}

/// Catalog of command descriptors keyed by unique name, in registration order.
#[derive(Debug, Default)]
pub struct CommandRegistry {
    descriptors: Vec<Arc<CommandDescriptor>>,
    index: HashMap<String, usize>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `descriptor`, rejecting duplicate names and malformed schemas.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        validate_command_descriptor(&descriptor)?;
        if self.index.contains_key(descriptor.name.as_str()) {
            return Err(RegistryError::DuplicateCommand(descriptor.name));
        }
        self.index
            .insert(descriptor.name.clone(), self.descriptors.len());
        self.descriptors.push(Arc::new(descriptor));
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Result<Arc<CommandDescriptor>, RegistryError> {
        self.index
            .get(name)
            .and_then(|position| self.descriptors.get(*position))
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.descriptors
            .iter()
            .map(|descriptor| descriptor.name.as_str())
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.descriptors.iter().map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

pub fn is_valid_command_name(raw: &str) -> bool {
    if raw.is_empty() || raw.chars().count() > MAX_COMMAND_NAME_CHARS {
        return false;
    }
    let mut chars = raw.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_lowercase() {
        return false;
    }
    chars.all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_' || ch == '-')
}

fn validate_command_descriptor(descriptor: &CommandDescriptor) -> Result<(), RegistryError> {
    if !is_valid_command_name(descriptor.name.as_str()) {
        return Err(RegistryError::InvalidCommandName(descriptor.name.clone()));
    }

    let mut seen = HashSet::new();
    let mut optional_seen = false;
    for option in &descriptor.options {
        if !is_valid_command_name(option.name.as_str()) {
            return Err(RegistryError::InvalidOptionName {
                command: descriptor.name.clone(),
                option: option.name.clone(),
            });
        }
        if !seen.insert(option.name.as_str()) {
            return Err(RegistryError::DuplicateOption {
                command: descriptor.name.clone(),
                option: option.name.clone(),
            });
        }
        if option.required && optional_seen {
            return Err(RegistryError::RequiredAfterOptional {
                command: descriptor.name.clone(),
                option: option.name.clone(),
            });
        }
        optional_seen |= !option.required;
    }
    Ok(())
}

/// Renders a usage line per registered command.
pub fn render_command_catalog(registry: &CommandRegistry) -> String {
    let mut lines = vec!["commands:".to_string()];
    for descriptor in registry.iter() {
        lines.push(format!(
            "  {:<34} {}",
            descriptor.usage(),
            descriptor.description
        ));
    }
    lines.join("\n")
}
