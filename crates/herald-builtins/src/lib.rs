//! Built-in chat commands: `/hello`, `/preview`, `/userinfo`, `/status`,
//! `/checkperm`, `/owner`, and `/modlist`.

pub mod builtin_catalog;
pub mod community_commands;
pub mod profile_commands;

pub use builtin_catalog::*;
pub use community_commands::*;
pub use profile_commands::*;

#[cfg(test)]
mod test_support;
