//! # Convoy Core
//!
//! Core abstractions for the convoy action-execution engine.
//!
//! This crate contains:
//! - Action: the polymorphic, undoable unit of work
//! - ActionList: a composite Action that owns and schedules children
//! - Flag / ActionContext: tri-state policy flags resolved along the
//!   owner chain
//!
//! This crate does NOT care about:
//! - What any individual action actually does
//! - How action instances are constructed from external documents
//! - Where diagnostic output ends up (events go through `tracing`)

pub mod action;
pub mod error;
pub mod list;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::action::{Action, ActionContext, Flag};
    pub use crate::error::ActionError;
    pub use crate::list::ActionList;
}
