use std::collections::HashSet;

use async_trait::async_trait;
use herald_commands::{
    mention, CommandArguments, CommandError, CommandHandler, CommandReply, CommandResult,
    CommandServices, Guild, InvocationContext, LookupTarget, ValidationFailure,
};
use herald_permissions::{
    has_any_permission, has_flag, normalize_permission_name, resolve_permission,
    MODERATOR_PERMISSIONS,
};
use tracing::debug;

use crate::profile_commands::required_user_id;

/// Resolves the community an invocation runs in.
///
/// A missing guild id and an unknown guild both mean the command ran outside
/// a server.
pub async fn require_guild(
    context: &InvocationContext,
    services: &CommandServices,
) -> CommandResult<Guild> {
    let Some(guild_id) = context
        .guild_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
    else {
        return Err(CommandError::ContextMissing);
    };
    services
        .communities
        .get_guild(guild_id)
        .await?
        .ok_or(CommandError::ContextMissing)
}

/// Returns the member ids classified as moderators, deduplicated, in member order.
pub fn moderator_ids(guild: &Guild) -> Vec<&str> {
    let mut seen = HashSet::new();
    guild
        .members
        .iter()
        .filter(|member| has_any_permission(member.permissions, &MODERATOR_PERMISSIONS))
        .map(|member| member.user_id.as_str())
        .filter(|user_id| seen.insert(*user_id))
        .collect()
}

/// `/checkperm`: user → guild → permission name → membership → exact-bit check.
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckPermCommand;

#[async_trait]
impl CommandHandler for CheckPermCommand {
    async fn execute(
        &self,
        arguments: &CommandArguments,
        context: &InvocationContext,
        services: &CommandServices,
    ) -> CommandResult<CommandReply> {
        let user_id = required_user_id(arguments, "user")?;
        let raw_permission = arguments.string("permission").ok_or_else(|| {
            CommandError::Validation(ValidationFailure {
                option: "permission".to_string(),
                message: "Missing required option `permission`.".to_string(),
            })
        })?;

        let user = services
            .users
            .get_user(user_id.as_str())
            .await?
            .ok_or(CommandError::NotFound(LookupTarget::User))?;
        let guild = require_guild(context, services).await?;
        let flag = resolve_permission(raw_permission)?;
        let member = guild
            .member(user.id.as_str())
            .ok_or(CommandError::NotFound(LookupTarget::Member))?;

        let granted = has_flag(member.permissions, flag);
        debug!(
            user_id = %user.id,
            guild_id = %guild.id,
            permission = raw_permission,
            granted,
            "evaluated member permission"
        );
        Ok(CommandReply::text(format!(
            "User {} {} the permission **{}**.",
            user.mention(),
            if granted { "has" } else { "does NOT have" },
            normalize_permission_name(raw_permission)
        )))
    }
}

/// `/owner`: reports the community's designated owner.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerCommand;

#[async_trait]
impl CommandHandler for OwnerCommand {
    async fn execute(
        &self,
        _arguments: &CommandArguments,
        context: &InvocationContext,
        services: &CommandServices,
    ) -> CommandResult<CommandReply> {
        let guild = require_guild(context, services).await?;
        Ok(CommandReply::text(format!(
            "The owner of this server is {}.",
            mention(guild.owner_id.as_str())
        )))
    }
}

/// `/modlist`: lists members holding any moderator permission.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModListCommand;

#[async_trait]
impl CommandHandler for ModListCommand {
    async fn execute(
        &self,
        _arguments: &CommandArguments,
        context: &InvocationContext,
        services: &CommandServices,
    ) -> CommandResult<CommandReply> {
        let guild = require_guild(context, services).await?;
        let moderators = moderator_ids(&guild);
        if moderators.is_empty() {
            return Ok(CommandReply::text("No moderators detected on this server."));
        }
        let mentions = moderators
            .into_iter()
            .map(mention)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(CommandReply::text(format!("Current moderators: {mentions}")))
    }
}
