use herald_commands::{
    CommandDescriptor, CommandInputType, CommandRegistry, OptionKind, OptionSpec, RegistryError,
};
use serde::Serialize;
use tracing::info;

use crate::community_commands::{CheckPermCommand, ModListCommand, OwnerCommand};
use crate::profile_commands::{HelloCommand, PreviewCommand, StatusCommand, UserInfoCommand};

pub const EXTENSION_NAME: &str = "multi-commands";
pub const EXTENSION_DESCRIPTION: &str =
    "Adds /hello, /preview, /userinfo, /status, /checkperm, /owner, and /modlist commands";

pub const PREVIEW_MISSING_TEXT_MESSAGE: &str = "Please provide some text to preview!";
pub const STATUS_MISSING_TEXT_MESSAGE: &str = "Please provide a status text.";

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
/// Public struct `ExtensionManifest` identifying the built-in command bundle.
pub struct ExtensionManifest {
    pub name: String,
    pub description: String,
    pub authors: Vec<String>,
    pub commands: Vec<String>,
}

pub fn builtin_manifest() -> ExtensionManifest {
    ExtensionManifest {
        name: EXTENSION_NAME.to_string(),
        description: EXTENSION_DESCRIPTION.to_string(),
        authors: vec!["herald contributors".to_string()],
        commands: builtin_descriptors()
            .into_iter()
            .map(|descriptor| descriptor.name)
            .collect(),
    }
}

/// Returns the built-in command descriptors in registration order.
pub fn builtin_descriptors() -> Vec<CommandDescriptor> {
    vec![
        CommandDescriptor::new("hello", "Say hello as yourself", HelloCommand),
        CommandDescriptor::new(
            "preview",
            "Send a preview message as a custom bot user (optionally as embed)",
            PreviewCommand,
        )
        .with_option(
            OptionSpec::required("text", OptionKind::String, "Text to preview")
                .with_missing_message(PREVIEW_MISSING_TEXT_MESSAGE),
        )
        .with_option(OptionSpec::optional(
            "embed",
            OptionKind::Boolean,
            "Send message as an embed",
        )),
        CommandDescriptor::new(
            "userinfo",
            "Get info about a user by ID or mention",
            UserInfoCommand,
        )
        .with_option(OptionSpec::required(
            "user",
            OptionKind::User,
            "User to get info for",
        ))
        .with_failure_label("Error fetching user info"),
        CommandDescriptor::new("status", "Set your custom Discord status", StatusCommand)
            .with_option(
                OptionSpec::required("text", OptionKind::String, "The status text")
                    .with_missing_message(STATUS_MISSING_TEXT_MESSAGE),
            )
            .with_failure_label("Failed to set status"),
        CommandDescriptor::new(
            "checkperm",
            "Check if a user has a specific permission",
            CheckPermCommand,
        )
        .with_option(OptionSpec::required(
            "user",
            OptionKind::User,
            "User to check",
        ))
        .with_option(OptionSpec::required(
            "permission",
            OptionKind::String,
            "Permission to check (e.g., ADMINISTRATOR)",
        ))
        .with_failure_label("Error checking permission"),
        CommandDescriptor::new("owner", "Show the owner of this server", OwnerCommand),
        CommandDescriptor::new("modlist", "List all moderators on the server", ModListCommand),
    ]
    .into_iter()
    .map(|descriptor| descriptor.with_input_type(CommandInputType::BuiltIn))
    .collect()
}

/// Registers every built-in command into `registry`.
pub fn register_builtin_commands(registry: &mut CommandRegistry) -> Result<(), RegistryError> {
    for descriptor in builtin_descriptors() {
        registry.register(descriptor)?;
    }
    Ok(())
}

/// Builds a registry holding only the built-in commands.
pub fn builtin_registry() -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    register_builtin_commands(&mut registry)?;
    info!(
        extension = EXTENSION_NAME,
        commands = registry.len(),
        "registered built-in commands"
    );
    Ok(registry)
}
