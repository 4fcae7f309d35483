use async_trait::async_trait;
use herald_commands::{
    CommandArguments, CommandError, CommandHandler, CommandReply, CommandResult, CommandServices,
    CustomStatus, Embed, InvocationContext, LookupTarget, User, ValidationFailure,
};

use crate::builtin_catalog::{PREVIEW_MISSING_TEXT_MESSAGE, STATUS_MISSING_TEXT_MESSAGE};

pub const PREVIEW_ACCENT_COLOR: u32 = 0x5865F2;
pub const PREVIEW_SENDER_ID: &str = "643945264868098049";
const PREVIEW_SENDER_USERNAME: &str = "Discord UwU";
const PREVIEW_SENDER_DISCRIMINATOR: &str = "6969";
const PREVIEW_SENDER_AVATAR: &str = "https://cdn.discordapp.com/avatars/643945264868098049/c6a249645d46209f337279cd2ca998c7.webp?size=80";
const AVATAR_CDN_BASE: &str = "https://cdn.discordapp.com/avatars";

/// Synthetic identity that `/preview` messages are attributed to.
pub fn preview_sender() -> User {
    User {
        id: PREVIEW_SENDER_ID.to_string(),
        username: PREVIEW_SENDER_USERNAME.to_string(),
        discriminator: PREVIEW_SENDER_DISCRIMINATOR.to_string(),
        bot: false,
        avatar: Some(PREVIEW_SENDER_AVATAR.to_string()),
    }
}

/// Reads a string option that must carry non-blank text.
fn required_text<'a>(
    arguments: &'a CommandArguments,
    option: &str,
    missing_message: &str,
) -> CommandResult<&'a str> {
    arguments
        .string(option)
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| {
            CommandError::Validation(ValidationFailure {
                option: option.to_string(),
                message: missing_message.to_string(),
            })
        })
}

pub(crate) fn required_user_id(
    arguments: &CommandArguments,
    option: &str,
) -> CommandResult<String> {
    arguments
        .user_id(option)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| {
            CommandError::Validation(ValidationFailure {
                option: option.to_string(),
                message: format!("Missing required option `{option}`."),
            })
        })
}

/// `/hello`: static greeting from the invoking principal.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelloCommand;

#[async_trait]
impl CommandHandler for HelloCommand {
    async fn execute(
        &self,
        _arguments: &CommandArguments,
        _context: &InvocationContext,
        _services: &CommandServices,
    ) -> CommandResult<CommandReply> {
        Ok(CommandReply::text("Hello"))
    }
}

/// `/preview`: echoes text as plain content or as one accent-colored embed.
#[derive(Debug, Clone, Copy, Default)]
pub struct PreviewCommand;

#[async_trait]
impl CommandHandler for PreviewCommand {
    async fn execute(
        &self,
        arguments: &CommandArguments,
        _context: &InvocationContext,
        _services: &CommandServices,
    ) -> CommandResult<CommandReply> {
        let text = required_text(arguments, "text", PREVIEW_MISSING_TEXT_MESSAGE)?;
        let reply = if arguments.boolean("embed").unwrap_or(false) {
            CommandReply::embed(Embed {
                description: Some(text.to_string()),
                color: Some(PREVIEW_ACCENT_COLOR),
            })
        } else {
            CommandReply::text(text)
        };
        Ok(reply.with_author(preview_sender()))
    }
}

/// `/userinfo`: resolves a user id through the user directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct UserInfoCommand;

#[async_trait]
impl CommandHandler for UserInfoCommand {
    async fn execute(
        &self,
        arguments: &CommandArguments,
        _context: &InvocationContext,
        services: &CommandServices,
    ) -> CommandResult<CommandReply> {
        let user_id = required_user_id(arguments, "user")?;
        let user = services
            .users
            .get_user(user_id.as_str())
            .await?
            .ok_or(CommandError::NotFound(LookupTarget::User))?;
        Ok(CommandReply::text(render_user_info(&user)))
    }
}

pub fn render_user_info(user: &User) -> String {
    let avatar = match user.avatar.as_deref() {
        Some(hash) => format!("[Link]({AVATAR_CDN_BASE}/{}/{hash}.png)", user.id),
        None => "none".to_string(),
    };
    [
        "**User Info**".to_string(),
        format!("**Username:** {}#{}", user.username, user.discriminator),
        format!("**ID:** {}", user.id),
        format!("**Bot:** {}", if user.bot { "Yes" } else { "No" }),
        format!("**Avatar:** {avatar}"),
    ]
    .join("  \n")
}

/// `/status`: sets the principal's custom presence text.
///
/// The mutation is not rolled back if the confirmation later fails to send.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusCommand;

#[async_trait]
impl CommandHandler for StatusCommand {
    async fn execute(
        &self,
        arguments: &CommandArguments,
        _context: &InvocationContext,
        services: &CommandServices,
    ) -> CommandResult<CommandReply> {
        let text = required_text(arguments, "text", STATUS_MISSING_TEXT_MESSAGE)?;
        services
            .status
            .set_custom_status(CustomStatus {
                text: text.to_string(),
            })
            .await?;
        Ok(CommandReply::text(format!("Status updated to: \"{text}\"")))
    }
}
