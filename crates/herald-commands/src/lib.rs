//! Command registration, option validation, and dispatch for chat slash commands.
//!
//! A [`CommandRegistry`] is filled once at startup and frozen behind an `Arc`.
//! The [`Dispatcher`] resolves each invocation against it, validates options,
//! runs the handler under a uniform error boundary, and emits exactly one
//! outbound message through the injected [`MessageSink`].

pub mod command_error;
pub mod command_registry;
pub mod dispatcher;
pub mod host;
pub mod invocation;
pub mod option_schema;

pub use command_error::*;
pub use command_registry::*;
pub use dispatcher::*;
pub use host::*;
pub use invocation::*;
pub use option_schema::*;
