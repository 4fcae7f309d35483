use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "herald",
    about = "Slash-command dispatch engine driven by a local host fixture",
    version
)]
pub struct Cli {
    #[arg(
        long = "fixture",
        env = "HERALD_FIXTURE",
        required_unless_present = "list_commands",
        help = "Path to the host fixture JSON (users, guilds, simulated faults)"
    )]
    pub fixture: Option<PathBuf>,

    #[arg(
        long = "channel-id",
        env = "HERALD_CHANNEL_ID",
        default_value = "local",
        help = "Channel id that invocations originate from"
    )]
    pub channel_id: String,

    #[arg(
        long = "guild-id",
        env = "HERALD_GUILD_ID",
        help = "Community id attached to invocations; omit to run outside a server"
    )]
    pub guild_id: Option<String>,

    #[arg(
        long = "command",
        action = ArgAction::Append,
        value_name = "LINE",
        help = "Slash command to dispatch, e.g. '/checkperm user:123 permission:ADMINISTRATOR'. Repeatable; reads stdin lines when absent"
    )]
    pub commands: Vec<String>,

    #[arg(
        long = "list-commands",
        default_value_t = false,
        help = "Print the registered command catalog and exit"
    )]
    pub list_commands: bool,

    #[arg(
        long = "json",
        default_value_t = false,
        help = "Print one JSON dispatch report per command instead of the rendered message"
    )]
    pub json: bool,
}
