//! Permission resolution for community members.
//!
//! Maps host permission names to bit flags and evaluates aggregate member
//! bitmasks with exact-containment semantics.

pub mod permission_flags;
pub mod permission_resolver;

pub use permission_flags::*;
pub use permission_resolver::*;
