use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Opaque failure raised by a host collaborator (store lookup, transport, status mutation).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct HostError {
    message: String,
}

impl HostError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        self.message.as_str()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `User` describing a host account.
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default = "default_discriminator")]
    pub discriminator: String,
    #[serde(default)]
    pub bot: bool,
    #[serde(default)]
    pub avatar: Option<String>,
}

fn default_discriminator() -> String {
    "0".to_string()
}

impl User {
    /// Renders the host mention markup for this user.
    pub fn mention(&self) -> String {
        mention(self.id.as_str())
    }
}

/// Renders the host mention markup for a user id.
pub fn mention(user_id: &str) -> String {
    format!("<@{user_id}>")
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `GuildMember` pairing a user id with its aggregate permission mask.
pub struct GuildMember {
    pub user_id: String,
    #[serde(deserialize_with = "deserialize_permission_mask")]
    pub permissions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `Guild` describing a community and its members in iteration order.
pub struct Guild {
    pub id: String,
    pub owner_id: String,
    #[serde(default)]
    pub members: Vec<GuildMember>,
}

impl Guild {
    pub fn member(&self, user_id: &str) -> Option<&GuildMember> {
        self.members.iter().find(|member| member.user_id == user_id)
    }
}

/// Accepts permission masks as JSON numbers or decimal strings.
pub fn deserialize_permission_mask<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawMask {
        Number(u64),
        Text(String),
    }

    match RawMask::deserialize(deserializer)? {
        RawMask::Number(value) => Ok(value),
        RawMask::Text(raw) => raw.trim().parse::<u64>().map_err(|error| {
            serde::de::Error::custom(format!("invalid permission mask '{raw}': {error}"))
        }),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `Embed` for a single structured message panel.
pub struct Embed {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `OutboundMessage` delivered through a [`MessageSink`].
pub struct OutboundMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    pub author: User,
}

impl OutboundMessage {
    pub fn text(content: impl Into<String>, author: User) -> Self {
        Self {
            content: Some(content.into()),
            embeds: Vec::new(),
            author,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
/// Public struct `CustomStatus` applied to the current principal's presence.
pub struct CustomStatus {
    pub text: String,
}

#[async_trait]
/// Trait contract for `MessageSink` behavior.
pub trait MessageSink: Send + Sync {
    async fn send(&self, channel_id: &str, message: OutboundMessage) -> Result<(), HostError>;
}

#[async_trait]
/// Trait contract for `UserDirectory` behavior.
pub trait UserDirectory: Send + Sync {
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, HostError>;
}

#[async_trait]
/// Trait contract for `StatusMutator` behavior.
pub trait StatusMutator: Send + Sync {
    async fn set_custom_status(&self, status: CustomStatus) -> Result<(), HostError>;
}

#[async_trait]
/// Trait contract for `CommunityDirectory` behavior.
pub trait CommunityDirectory: Send + Sync {
    async fn get_guild(&self, guild_id: &str) -> Result<Option<Guild>, HostError>;
}

/// Trait contract for `CurrentUserAccessor` behavior.
pub trait CurrentUserAccessor: Send + Sync {
    fn current_user(&self) -> User;
}

/// Host collaborators available to command handlers.
///
/// Messaging is deliberately absent: only the dispatcher sends, which keeps
/// every invocation at exactly one outbound message.
#[derive(Clone)]
pub struct CommandServices {
    pub users: Arc<dyn UserDirectory>,
    pub status: Arc<dyn StatusMutator>,
    pub communities: Arc<dyn CommunityDirectory>,
    pub principal: Arc<dyn CurrentUserAccessor>,
}

impl CommandServices {
    /// Builds services from a single host object implementing every collaborator.
    pub fn from_host<H>(host: Arc<H>) -> Self
    where
        H: UserDirectory + StatusMutator + CommunityDirectory + CurrentUserAccessor + 'static,
    {
        Self {
            users: host.clone(),
            status: host.clone(),
            communities: host.clone(),
            principal: host,
        }
    }
}
