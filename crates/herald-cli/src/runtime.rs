use std::sync::Arc;

use anyhow::{bail, Context, Result};
use herald_builtins::builtin_registry;
use herald_commands::{
    render_command_catalog, CommandServices, DispatchError, Dispatcher, InvocationContext,
    OutboundMessage,
};
use herald_fixture_host::{load_host_fixture, FixtureHost};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use crate::cli_args::Cli;
use crate::command_text::{parse_command, parse_option_tokens, unknown_command_message};

pub(crate) async fn run_cli(cli: Cli) -> Result<()> {
    let registry = builtin_registry().context("failed to register built-in commands")?;
    if cli.list_commands {
        println!("{}", render_command_catalog(&registry));
        return Ok(());
    }

    let Some(fixture_path) = cli.fixture.as_deref() else {
        bail!("--fixture is required unless --list-commands is set");
    };
    let fixture = load_host_fixture(fixture_path)?;
    let host = Arc::new(FixtureHost::new(fixture));
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        host.clone(),
        CommandServices::from_host(host.clone()),
    );

    let principal_id = host.fixture().current_user.id.clone();
    let mut context = InvocationContext::new(cli.channel_id.clone(), principal_id);
    if let Some(guild_id) = cli.guild_id.as_deref() {
        context = context.in_guild(guild_id);
    }
    let mut session = CommandSession::new(dispatcher, context, cli.json);

    if cli.commands.is_empty() {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines
            .next_line()
            .await
            .context("failed to read command from stdin")?
        {
            if let Some(output) = session.handle_line(&line).await? {
                println!("{output}");
            }
        }
    } else {
        for line in &cli.commands {
            if let Some(output) = session.handle_line(line).await? {
                println!("{output}");
            }
        }
    }

    info!(
        dispatched = session.dispatched,
        rejected = session.rejected,
        "command session finished"
    );
    if session.rejected > 0 {
        bail!(
            "{} command line(s) could not be dispatched",
            session.rejected
        );
    }
    Ok(())
}

/// Dispatches command lines one at a time against a fixed invocation context.
pub(crate) struct CommandSession {
    dispatcher: Dispatcher,
    context: InvocationContext,
    json: bool,
    pub(crate) dispatched: usize,
    pub(crate) rejected: usize,
}

impl CommandSession {
    pub(crate) fn new(dispatcher: Dispatcher, context: InvocationContext, json: bool) -> Self {
        Self {
            dispatcher,
            context,
            json,
            dispatched: 0,
            rejected: 0,
        }
    }

    /// Returns the text to print for `line`, or `None` for blank and `#` comment lines.
    ///
    /// Lines that cannot reach the dispatcher are reported and counted as
    /// rejected rather than aborting the session.
    pub(crate) async fn handle_line(&mut self, line: &str) -> Result<Option<String>> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return Ok(None);
        }

        let Some(parsed) = parse_command(trimmed) else {
            self.rejected += 1;
            warn!(line = trimmed, "ignoring line without a slash command");
            return Ok(Some(format!("expected a slash command, got: {trimmed}")));
        };

        let descriptor = match self.dispatcher.registry().lookup(parsed.name) {
            Ok(descriptor) => descriptor,
            Err(_) => {
                self.rejected += 1;
                let names = self.dispatcher.registry().names();
                return Ok(Some(unknown_command_message(parsed.name, &names)));
            }
        };
        let options = match parse_option_tokens(parsed.args, &descriptor) {
            Ok(options) => options,
            Err(error) => {
                self.rejected += 1;
                return Ok(Some(error.to_string()));
            }
        };

        let report = match self
            .dispatcher
            .dispatch(parsed.name, &options, self.context.clone())
            .await
        {
            Ok(report) => report,
            Err(DispatchError::UnknownCommand(name)) => {
                self.rejected += 1;
                let names = self.dispatcher.registry().names();
                return Ok(Some(unknown_command_message(&name, &names)));
            }
        };
        self.dispatched += 1;

        if self.json {
            let rendered = serde_json::to_string(&report)
                .context("failed to serialize dispatch report")?;
            return Ok(Some(rendered));
        }
        let mut rendered = render_message(&report.message);
        if !report.delivery.is_delivered() {
            rendered.push_str("\n(delivery failed)");
        }
        Ok(Some(rendered))
    }
}

/// Renders an outbound message as `[author] content`, one line per embed.
pub(crate) fn render_message(message: &OutboundMessage) -> String {
    let author = message.author.username.as_str();
    let mut lines = Vec::new();
    if let Some(content) = message.content.as_deref() {
        lines.push(format!("[{author}] {content}"));
    }
    for embed in &message.embeds {
        let description = embed.description.as_deref().unwrap_or_default();
        match embed.color {
            Some(color) => lines.push(format!("[{author}] embed #{color:06X}: {description}")),
            None => lines.push(format!("[{author}] embed: {description}")),
        }
    }
    if lines.is_empty() {
        lines.push(format!("[{author}] (empty message)"));
    }
    lines.join("\n")
}
