use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use async_trait::async_trait;
use herald_builtins::{builtin_registry, preview_sender, PREVIEW_ACCENT_COLOR};
use herald_commands::{
    CommandArguments, CommandDescriptor, CommandErrorKind, CommandHandler, CommandReply,
    CommandResult, CommandServices, DeliveryOutcome, DispatchError, DispatchReport, Dispatcher,
    Guild, GuildMember, InvocationContext, InvocationState, OptionKind, OptionSpec, RawOption,
    User,
};
use herald_fixture_host::{parse_host_fixture, FixtureHost, HostFaults, HostFixture};
use herald_permissions::{has_any_permission, has_permission, Permissions, MODERATOR_PERMISSIONS};
use serde_json::Value;

const COMMUNITY_FIXTURE: &str = r#"{
    "schema_version": 1,
    "current_user": {"id": "100", "username": "operator", "discriminator": "0001"},
    "users": [
        {"id": "200", "username": "ada", "discriminator": "1815", "avatar": "a1b2"},
        {"id": "300", "username": "grace", "discriminator": "1906"},
        {"id": "400", "username": "linus", "discriminator": "1969", "bot": true}
    ],
    "guilds": [
        {
            "id": "g1",
            "owner_id": "200",
            "members": [
                {"user_id": "200", "permissions": "8"},
                {"user_id": "300", "permissions": 2},
                {"user_id": "400", "permissions": "1099511627776"}
            ]
        },
        {
            "id": "g2",
            "owner_id": "300",
            "members": [{"user_id": "300", "permissions": 2048}]
        }
    ]
}"#;

fn community_fixture() -> HostFixture {
    parse_host_fixture(COMMUNITY_FIXTURE).expect("community fixture should parse")
}

fn stack(fixture: HostFixture) -> (Arc<FixtureHost>, Dispatcher) {
    let host = Arc::new(FixtureHost::new(fixture));
    let registry = builtin_registry().expect("built-in registry");
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        host.clone(),
        CommandServices::from_host(host.clone()),
    );
    (host, dispatcher)
}

fn outside_server() -> InvocationContext {
    InvocationContext::new("dm-1", "100")
}

fn inside(guild_id: &str) -> InvocationContext {
    InvocationContext::new("general", "100").in_guild(guild_id)
}

async fn run(
    dispatcher: &Dispatcher,
    command: &str,
    options: Vec<RawOption>,
    context: InvocationContext,
) -> DispatchReport {
    dispatcher
        .dispatch(command, &options, context)
        .await
        .expect("built-in command should dispatch")
}

#[tokio::test]
async fn integration_preview_with_empty_text_sends_only_the_prompt() {
    let (host, dispatcher) = stack(community_fixture());
    let report = run(
        &dispatcher,
        "preview",
        vec![RawOption::new("text", "")],
        outside_server(),
    )
    .await;

    assert_eq!(report.state, InvocationState::Failed);
    assert_eq!(
        report.transitions,
        vec![
            InvocationState::Received,
            InvocationState::Validating,
            InvocationState::Failed,
        ]
    );
    let sent = host.sent_messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0].message.content.as_deref(),
        Some("Please provide some text to preview!")
    );
    assert!(sent[0].message.embeds.is_empty());
    assert_eq!(sent[0].channel_id, "dm-1");
}

#[tokio::test]
async fn integration_preview_embed_uses_accent_panel_and_synthetic_sender() {
    let (host, dispatcher) = stack(community_fixture());
    let report = run(
        &dispatcher,
        "preview",
        vec![RawOption::new("text", "hi"), RawOption::new("embed", true)],
        outside_server(),
    )
    .await;

    assert_eq!(report.state, InvocationState::Succeeded);
    let sent = host.sent_messages();
    assert_eq!(sent.len(), 1);
    let message = &sent[0].message;
    assert_eq!(message.content, None);
    assert_eq!(message.embeds.len(), 1);
    assert_eq!(message.embeds[0].description.as_deref(), Some("hi"));
    assert_eq!(message.embeds[0].color, Some(PREVIEW_ACCENT_COLOR));
    assert_eq!(message.author, preview_sender());
}

#[tokio::test]
async fn integration_checkperm_outside_server_never_reaches_permission_resolution() {
    let (host, dispatcher) = stack(community_fixture());
    let report = run(
        &dispatcher,
        "checkperm",
        vec![
            RawOption::new("user", "200"),
            RawOption::new("permission", "this is not a permission"),
        ],
        outside_server(),
    )
    .await;

    assert_eq!(report.failure, Some(CommandErrorKind::ContextMissing));
    assert_eq!(
        report.message.content.as_deref(),
        Some("This command must be run inside a server.")
    );
    assert_eq!(host.guild_lookup_count(), 0);
    assert_eq!(host.sent_messages().len(), 1);
}

#[tokio::test]
async fn integration_checkperm_accepts_string_masks_from_fixture() {
    let (_host, dispatcher) = stack(community_fixture());
    let admin = run(
        &dispatcher,
        "checkperm",
        vec![
            RawOption::new("user", "200"),
            RawOption::new("permission", " Administrator "),
        ],
        inside("g1"),
    )
    .await;
    assert_eq!(
        admin.message.content.as_deref(),
        Some("User <@200> has the permission **ADMINISTRATOR**.")
    );

    let timeout = run(
        &dispatcher,
        "checkperm",
        vec![
            RawOption::new("user", "400"),
            RawOption::new("permission", "MODERATE_MEMBERS"),
        ],
        inside("g1"),
    )
    .await;
    assert_eq!(
        timeout.message.content.as_deref(),
        Some("User <@400> has the permission **MODERATE_MEMBERS**.")
    );
}

#[tokio::test]
async fn integration_modlist_reports_none_then_members_in_order() {
    let fixture = community_fixture().with_guild(Guild {
        id: "g3".to_string(),
        owner_id: "200".to_string(),
        members: vec![
            GuildMember {
                user_id: "300".to_string(),
                permissions: Permissions::BAN_MEMBERS.bits(),
            },
            GuildMember {
                user_id: "200".to_string(),
                permissions: (Permissions::MANAGE_ROLES | Permissions::SEND_MESSAGES).bits(),
            },
            GuildMember {
                user_id: "300".to_string(),
                permissions: Permissions::KICK_MEMBERS.bits(),
            },
        ],
    });
    let (host, dispatcher) = stack(fixture);

    let none = run(&dispatcher, "modlist", Vec::new(), inside("g2")).await;
    assert_eq!(
        none.message.content.as_deref(),
        Some("No moderators detected on this server.")
    );

    let two = run(&dispatcher, "modlist", Vec::new(), inside("g3")).await;
    assert_eq!(
        two.message.content.as_deref(),
        Some("Current moderators: <@300>, <@200>")
    );
    assert_eq!(host.sent_messages().len(), 2);
}

#[tokio::test]
async fn integration_hello_twice_emits_two_independent_greetings() {
    let (host, dispatcher) = stack(community_fixture());
    let first = run(&dispatcher, "hello", Vec::new(), outside_server()).await;
    let second = run(&dispatcher, "hello", Vec::new(), outside_server()).await;

    assert_eq!(first.state, InvocationState::Succeeded);
    assert_eq!(second.state, InvocationState::Succeeded);
    let sent = host.sent_messages();
    assert_eq!(sent.len(), 2);
    for entry in sent {
        assert_eq!(entry.message.content.as_deref(), Some("Hello"));
        assert_eq!(entry.message.author.id, "100");
    }
}

#[tokio::test]
async fn integration_userinfo_distinguishes_missing_user_from_store_failure() {
    let (_host, dispatcher) = stack(community_fixture());
    let found = run(
        &dispatcher,
        "userinfo",
        vec![RawOption::new("user", "200")],
        outside_server(),
    )
    .await;
    assert_eq!(
        found.message.content.as_deref(),
        Some(
            "**User Info**  \n**Username:** ada#1815  \n**ID:** 200  \n**Bot:** No  \n**Avatar:** [Link](https://cdn.discordapp.com/avatars/200/a1b2.png)"
        )
    );

    let missing = run(
        &dispatcher,
        "userinfo",
        vec![RawOption::new("user", "999")],
        outside_server(),
    )
    .await;
    assert_eq!(missing.failure, Some(CommandErrorKind::LookupNotFound));
    assert_eq!(missing.message.content.as_deref(), Some("User not found."));

    let (_host, failing) = stack(community_fixture().with_faults(HostFaults {
        fail_user_lookup: true,
        ..HostFaults::default()
    }));
    let broken = run(
        &failing,
        "userinfo",
        vec![RawOption::new("user", "200")],
        outside_server(),
    )
    .await;
    assert_eq!(broken.failure, Some(CommandErrorKind::TransportOrHostFailure));
    assert_eq!(
        broken.message.content.as_deref(),
        Some("Error fetching user info: simulated user store failure")
    );
}

#[tokio::test]
async fn integration_status_side_effect_survives_failed_confirmation() {
    let (host, dispatcher) = stack(community_fixture().with_faults(HostFaults {
        fail_message_send: true,
        ..HostFaults::default()
    }));
    let report = run(
        &dispatcher,
        "status",
        vec![RawOption::new("text", "shipping")],
        outside_server(),
    )
    .await;

    assert_eq!(report.state, InvocationState::Succeeded);
    assert_eq!(
        report.message.content.as_deref(),
        Some("Status updated to: \"shipping\"")
    );
    assert!(matches!(report.delivery, DeliveryOutcome::Failed { .. }));
    assert_eq!(
        host.custom_status().map(|status| status.text),
        Some("shipping".to_string())
    );
    assert!(host.sent_messages().is_empty());
}

#[tokio::test]
async fn integration_unknown_command_sends_nothing() {
    let (host, dispatcher) = stack(community_fixture());
    let error = dispatcher
        .dispatch("teleport", &[], outside_server())
        .await
        .expect_err("unregistered command");
    assert_eq!(error, DispatchError::UnknownCommand("teleport".to_string()));
    assert!(host.sent_messages().is_empty());
}

#[tokio::test]
async fn integration_owner_reports_owner_per_community() {
    let (_host, dispatcher) = stack(community_fixture());
    let g1 = run(&dispatcher, "owner", Vec::new(), inside("g1")).await;
    let g2 = run(&dispatcher, "owner", Vec::new(), inside("g2")).await;
    assert_eq!(
        g1.message.content.as_deref(),
        Some("The owner of this server is <@200>.")
    );
    assert_eq!(
        g2.message.content.as_deref(),
        Some("The owner of this server is <@300>.")
    );
}

struct CountingHandler {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl CommandHandler for CountingHandler {
    async fn execute(
        &self,
        _arguments: &CommandArguments,
        _context: &InvocationContext,
        _services: &CommandServices,
    ) -> CommandResult<CommandReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(CommandReply::text("counted"))
    }
}

#[tokio::test]
async fn integration_missing_required_option_never_runs_custom_handler() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = builtin_registry().expect("registry");
    registry
        .register(
            CommandDescriptor::new(
                "count",
                "Counts invocations",
                CountingHandler {
                    calls: calls.clone(),
                },
            )
            .with_option(OptionSpec::required("amount", OptionKind::Integer, "How many")),
        )
        .expect("custom command registers");

    let host = Arc::new(FixtureHost::new(community_fixture()));
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        host.clone(),
        CommandServices::from_host(host.clone()),
    );

    let rejected = run(
        &dispatcher,
        "count",
        vec![RawOption::new("amount", Value::Null)],
        outside_server(),
    )
    .await;
    assert_eq!(rejected.failure, Some(CommandErrorKind::ValidationFailure));
    assert_eq!(
        rejected.message.content.as_deref(),
        Some("Missing required option `amount`.")
    );
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let accepted = run(
        &dispatcher,
        "count",
        vec![RawOption::new("amount", 3), RawOption::new("ignored", "x")],
        outside_server(),
    )
    .await;
    assert_eq!(accepted.state, InvocationState::Succeeded);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(host.sent_messages().len(), 2);
}

#[tokio::test]
async fn integration_concurrent_invocations_do_not_share_state() {
    let (host, dispatcher) = stack(community_fixture());
    let (hello, owner, modlist) = tokio::join!(
        run(&dispatcher, "hello", Vec::new(), outside_server()),
        run(&dispatcher, "owner", Vec::new(), inside("g1")),
        run(&dispatcher, "modlist", Vec::new(), inside("g1")),
    );

    assert_eq!(hello.message.content.as_deref(), Some("Hello"));
    assert_eq!(
        owner.message.content.as_deref(),
        Some("The owner of this server is <@200>.")
    );
    assert_eq!(
        modlist.message.content.as_deref(),
        Some("Current moderators: <@300>, <@400>")
    );
    assert_eq!(host.sent_messages().len(), 3);
}

#[test]
fn integration_permission_resolver_matches_moderator_policy() {
    let moderator = (Permissions::KICK_MEMBERS | Permissions::VIEW_CHANNEL).bits();
    assert!(has_any_permission(moderator, &MODERATOR_PERMISSIONS));
    assert_eq!(has_permission(moderator, "kick_members"), Ok(true));
    assert_eq!(has_permission(moderator, "ban_members"), Ok(false));
    assert!(has_permission(moderator, "SUMMON_DRAGONS").is_err());

    let regular: User = serde_json::from_value(serde_json::json!({
        "id": "500",
        "username": "guest"
    }))
    .expect("user with defaults");
    assert_eq!(regular.discriminator, "0");
    assert!(!regular.bot);
}
