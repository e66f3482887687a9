//! Action abstraction module
//!
//! This module defines the Action trait and related types:
//! - Action: the core trait for executable, undoable units of work
//! - Flag: tri-state policy value resolved along the owner chain
//! - ActionContext: policy already resolved by the enclosing lists

mod context;
mod flag;

use async_trait::async_trait;

pub use context::ActionContext;
pub use flag::Flag;

use crate::error::ActionError;

/// Action trait - the polymorphic unit of work
///
/// Actions are black boxes to their owning list. They can perform
/// arbitrary external side effects and, if they declare themselves
/// undoable, compensate for them.
///
/// An action is attached to a list by moving it into
/// [`ActionList::add`](crate::list::ActionList::add); ownership transfer
/// is the attachment, so an action is attached exactly once.
#[async_trait]
pub trait Action: Send + Sync {
    /// Human-readable description, used only in diagnostics.
    fn description(&self) -> &str;

    /// Verbosity flag for this action. `Inherit` resolves through the
    /// owner chain; with no owner it resolves to off.
    fn verbosity(&self) -> Flag {
        Flag::Inherit
    }

    /// Whether this action can reverse its own effect. Sampled once by
    /// the owning list at attach time. Implementations that cannot
    /// guarantee any reversal must return false rather than attempt a
    /// lossy undo.
    fn undoable(&self) -> bool;

    /// Perform the action's effect.
    ///
    /// Fails with [`ActionError::Data`] for invalid configuration and
    /// [`ActionError::Runtime`] when an external operation fails.
    async fn execute(&mut self, ctx: &ActionContext) -> Result<(), ActionError>;

    /// Reverse the effect of a prior `execute`.
    ///
    /// Must be a harmless no-op when the action never executed, was
    /// already undone, or executed only partially before failing. Leaf
    /// implementations must not return an error.
    async fn undo(&mut self) -> Result<(), ActionError> {
        Ok(())
    }

    /// Resolved verbosity for this action given the ancestor context.
    fn is_verbose(&self, ctx: &ActionContext) -> bool {
        self.verbosity().resolve(ctx.verbose)
    }
}

impl std::fmt::Debug for dyn Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Action")
            .field("description", &self.description())
            .finish_non_exhaustive()
    }
}
