use std::sync::Arc;

use herald_commands::{
    CommandServices, DispatchReport, Dispatcher, InvocationContext, RawOption, User,
};
use herald_fixture_host::{FixtureHost, HostFixture};

use crate::builtin_catalog::builtin_registry;

pub(crate) fn fixture_user(id: &str, username: &str) -> User {
    User {
        id: id.to_string(),
        username: username.to_string(),
        discriminator: "0001".to_string(),
        bot: false,
        avatar: None,
    }
}

pub(crate) fn operator() -> User {
    fixture_user("100", "operator")
}

pub(crate) fn harness(fixture: HostFixture) -> (Arc<FixtureHost>, Dispatcher) {
    let host = Arc::new(FixtureHost::new(fixture));
    let registry = builtin_registry().expect("built-in registry");
    let dispatcher = Dispatcher::new(
        Arc::new(registry),
        host.clone(),
        CommandServices::from_host(host.clone()),
    );
    (host, dispatcher)
}

pub(crate) fn text_context() -> InvocationContext {
    InvocationContext::new("channel-1", "100")
}

pub(crate) fn guild_context(guild_id: &str) -> InvocationContext {
    text_context().in_guild(guild_id)
}

pub(crate) async fn dispatch(
    dispatcher: &Dispatcher,
    command: &str,
    options: &[RawOption],
    context: InvocationContext,
) -> DispatchReport {
    dispatcher
        .dispatch(command, options, context)
        .await
        .unwrap_or_else(|error| panic!("dispatch of {command} failed: {error}"))
}
