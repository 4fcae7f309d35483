use serde::{Deserialize, Serialize};

use crate::host::{Embed, OutboundMessage, User};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Per-dispatch context: where the command ran and who ran it.
pub struct InvocationContext {
    pub channel_id: String,
    pub principal_id: String,
    #[serde(default)]
    pub guild_id: Option<String>,
}

impl InvocationContext {
    pub fn new(channel_id: impl Into<String>, principal_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            principal_id: principal_id.into(),
            guild_id: None,
        }
    }

    pub fn in_guild(mut self, guild_id: impl Into<String>) -> Self {
        self.guild_id = Some(guild_id.into());
        self
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Enumerates supported `InvocationState` values.
pub enum InvocationState {
    Received,
    Validating,
    Executing,
    Succeeded,
    Failed,
}

impl InvocationState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Validating => "validating",
            Self::Executing => "executing",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Successful handler output, turned into the invocation's single outbound message.
///
/// `author` overrides the default attribution to the current principal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandReply {
    pub content: Option<String>,
    pub embeds: Vec<Embed>,
    pub author: Option<User>,
}

impl CommandReply {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn embed(embed: Embed) -> Self {
        Self {
            embeds: vec![embed],
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: User) -> Self {
        self.author = Some(author);
        self
    }

    pub fn into_message(self, default_author: impl FnOnce() -> User) -> OutboundMessage {
        OutboundMessage {
            content: self.content,
            embeds: self.embeds,
            author: self.author.unwrap_or_else(default_author),
        }
    }
}
