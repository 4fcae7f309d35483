use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures_util::FutureExt;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::command_error::{CommandError, CommandErrorKind, CommandResult};
use crate::command_registry::{CommandDescriptor, CommandRegistry};
use crate::host::{CommandServices, HostError, MessageSink, OutboundMessage};
use crate::invocation::{CommandReply, InvocationContext, InvocationState};
use crate::option_schema::{validate_options, CommandArguments, RawOption};

/// Enumerates supported `DispatchError` values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("command '{0}' is not registered")]
    UnknownCommand(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
/// Enumerates supported `DeliveryOutcome` values.
pub enum DeliveryOutcome {
    Delivered,
    Failed { error: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// Observable result of one invocation.
pub struct DispatchReport {
    pub command: String,
    pub state: InvocationState,
    pub transitions: Vec<InvocationState>,
    pub failure: Option<CommandErrorKind>,
    pub message: OutboundMessage,
    pub delivery: DeliveryOutcome,
}

/// Runs invocations against a frozen registry and injected host collaborators.
///
/// Cloning is cheap; concurrent dispatches share only the read-only registry
/// and the collaborator handles.
#[derive(Clone)]
pub struct Dispatcher {
    registry: Arc<CommandRegistry>,
    messages: Arc<dyn MessageSink>,
    services: CommandServices,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<CommandRegistry>,
        messages: Arc<dyn MessageSink>,
        services: CommandServices,
    ) -> Self {
        Self {
            registry,
            messages,
            services,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        self.registry.as_ref()
    }

    /// Dispatches one invocation and emits exactly one outbound message.
    ///
    /// Only an unregistered command name is returned as an error, and in that
    /// case nothing is sent. Validation failures, lookup misses, host failures,
    /// and handler panics all end in a `Failed` report with a user-facing message.
    #[tracing::instrument(
        level = "debug",
        skip(self, raw_options, context),
        fields(channel_id = %context.channel_id)
    )]
    pub async fn dispatch(
        &self,
        command_name: &str,
        raw_options: &[RawOption],
        context: InvocationContext,
    ) -> Result<DispatchReport, DispatchError> {
        let mut transitions = vec![InvocationState::Received];
        let descriptor = self
            .registry
            .lookup(command_name)
            .map_err(|_| DispatchError::UnknownCommand(command_name.to_string()))?;

        transitions.push(InvocationState::Validating);
        debug!(state = InvocationState::Validating.as_str(), "invocation transition");
        let outcome = match validate_options(&descriptor.options, raw_options) {
            Ok(arguments) => {
                transitions.push(InvocationState::Executing);
                debug!(state = InvocationState::Executing.as_str(), "invocation transition");
                self.execute(&descriptor, &arguments, &context).await
            }
            Err(failure) => {
                debug!(option = %failure.option, "option validation failed");
                Err(CommandError::Validation(failure))
            }
        };

        let (state, failure, message) = match outcome {
            Ok(reply) => (
                InvocationState::Succeeded,
                None,
                reply.into_message(|| self.services.principal.current_user()),
            ),
            Err(error) => {
                if error.kind() == CommandErrorKind::TransportOrHostFailure {
                    warn!(command = command_name, %error, "command handler failed");
                }
                let text = error.user_message(descriptor.failure_label.as_str());
                (
                    InvocationState::Failed,
                    Some(error.kind()),
                    OutboundMessage::text(text, self.services.principal.current_user()),
                )
            }
        };
        transitions.push(state);
        debug!(state = state.as_str(), "invocation transition");

        let delivery = match self
            .messages
            .send(context.channel_id.as_str(), message.clone())
            .await
        {
            Ok(()) => DeliveryOutcome::Delivered,
            Err(error) => {
                warn!(
                    command = command_name,
                    channel_id = %context.channel_id,
                    %error,
                    "failed to deliver command response"
                );
                DeliveryOutcome::Failed {
                    error: error.to_string(),
                }
            }
        };

        Ok(DispatchReport {
            command: descriptor.name.clone(),
            state,
            transitions,
            failure,
            message,
            delivery,
        })
    }

    async fn execute(
        &self,
        descriptor: &CommandDescriptor,
        arguments: &CommandArguments,
        context: &InvocationContext,
    ) -> CommandResult<CommandReply> {
        let execution = descriptor
            .handler
            .execute(arguments, context, &self.services);
        match AssertUnwindSafe(execution).catch_unwind().await {
            Ok(result) => result,
            Err(payload) => Err(CommandError::Host(HostError::new(format!(
                "handler panicked: {}",
                panic_message(payload.as_ref())
            )))),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
