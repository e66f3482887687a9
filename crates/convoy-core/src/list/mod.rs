//! ActionList module
//!
//! The ActionList is a composite [`Action`] that owns an ordered
//! collection of child actions and is responsible for:
//! - scheduling children sequentially or in parallel
//! - applying the abort-on-error / continue failure policies
//! - best-effort rollback of attached children via `undo`
//! - releasing children once a cycle completes, so the list is reusable

use std::collections::VecDeque;
use std::time::Instant;

use async_trait::async_trait;
use tokio::task::JoinSet;

use crate::action::{Action, ActionContext, Flag};
use crate::error::ActionError;

/// Default cap on concurrently running children in parallel mode.
const DEFAULT_MAX_PARALLEL: usize = 4;

/// A composite action that owns and schedules an ordered sequence of
/// child actions.
///
/// Children execute in insertion order in the sequential modes. An
/// `ActionList` is single-writer per cycle: it is not meant to be shared
/// between concurrent callers of `add`/`execute`.
pub struct ActionList {
    description: String,
    verbosity: Flag,
    abort_on_error: Flag,
    sequential: Flag,
    max_parallel: usize,
    can_undo: bool,
    children: Vec<Box<dyn Action>>,
}

impl ActionList {
    /// Create a new empty list.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            verbosity: Flag::Inherit,
            abort_on_error: Flag::Inherit,
            sequential: Flag::Inherit,
            max_parallel: DEFAULT_MAX_PARALLEL,
            can_undo: true,
            children: Vec::new(),
        }
    }

    /// Set the verbosity flag.
    pub fn with_verbosity(mut self, verbosity: Flag) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set the abort-on-error flag.
    pub fn with_abort_on_error(mut self, abort_on_error: Flag) -> Self {
        self.abort_on_error = abort_on_error;
        self
    }

    /// Set the scheduling flag. Resolved `false` runs children in
    /// parallel.
    pub fn with_sequential(mut self, sequential: Flag) -> Self {
        self.sequential = sequential;
        self
    }

    /// Cap the number of concurrently running children in parallel mode.
    /// Values below 1 are treated as 1.
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel.max(1);
        self
    }

    /// Attach a child action. Tail insertion; insertion order is
    /// execution order. The child's undoability is sampled here and
    /// folded into the list's own.
    pub fn add(&mut self, child: Box<dyn Action>) {
        if !child.undoable() {
            self.can_undo = false;
        }
        self.children.push(child);
    }

    /// Number of currently attached children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Whether the list has no attached children.
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Whether every attached child reported itself undoable at attach
    /// time.
    pub fn can_undo(&self) -> bool {
        self.can_undo
    }

    /// Execute the list as the root of an owner chain.
    pub async fn run(&mut self) -> Result<(), ActionError> {
        self.execute(&ActionContext::root()).await
    }

    /// Release all children and start a fresh cycle.
    fn release_children(&mut self) {
        self.children.clear();
        self.can_undo = true;
    }

    /// Sequential execution, aborting at the first failure. If the list
    /// is undoable, every attached child is unwound.
    async fn execute_abort(&mut self, ctx: &ActionContext) {
        let mut failed = false;
        for child in self.children.iter_mut() {
            if let Err(err) = child.execute(ctx).await {
                tracing::error!(
                    action = child.description(),
                    error = %err,
                    "action failed, aborting remaining actions"
                );
                failed = true;
                break;
            }
        }
        if failed && self.can_undo {
            // Checked can_undo above, so this cannot fail.
            let _ = self.undo().await;
        }
    }

    /// Sequential execution, continuing past failures. A failing child
    /// is handled locally, exactly like a parallel task handles its own.
    async fn execute_continue(&mut self, ctx: &ActionContext) {
        for child in self.children.iter_mut() {
            execute_guarded(child.as_mut(), ctx).await;
        }
    }

    /// Parallel execution with a bounded task group and a join-all
    /// barrier. Each task captures its own child's outcome; a failing
    /// child never affects its siblings and there is no cross-task abort.
    async fn execute_parallel(&mut self, ctx: ActionContext) -> Result<(), ActionError> {
        let mut pending: VecDeque<Box<dyn Action>> = self.children.drain(..).collect();

        // A single child runs on the calling task; behaviorally identical,
        // no task overhead.
        if pending.len() == 1 {
            if let Some(mut child) = pending.pop_front() {
                execute_guarded(child.as_mut(), &ctx).await;
            }
            return Ok(());
        }

        let mut tasks: JoinSet<()> = JoinSet::new();
        let mut join_failure: Option<String> = None;
        loop {
            while tasks.len() < self.max_parallel {
                let Some(mut child) = pending.pop_front() else {
                    break;
                };
                tasks.spawn(async move {
                    execute_guarded(child.as_mut(), &ctx).await;
                });
            }
            match tasks.join_next().await {
                Some(Ok(())) => {}
                Some(Err(err)) => {
                    tracing::error!(
                        list = %self.description,
                        error = %err,
                        "action task failed for an unclassified reason"
                    );
                    join_failure = Some(err.to_string());
                }
                // Every started task has been awaited.
                None => break,
            }
        }

        match join_failure {
            Some(err) => Err(ActionError::runtime(format!(
                "failed to join action task: {err}"
            ))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Action for ActionList {
    fn description(&self) -> &str {
        &self.description
    }

    fn verbosity(&self) -> Flag {
        self.verbosity
    }

    /// A list is undoable only while every attached child is.
    fn undoable(&self) -> bool {
        self.can_undo
    }

    async fn execute(&mut self, ctx: &ActionContext) -> Result<(), ActionError> {
        let child_ctx = ActionContext {
            verbose: self.verbosity.resolve(ctx.verbose),
            abort_on_error: self.abort_on_error.resolve(ctx.abort_on_error),
            sequential: self.sequential.resolve(ctx.sequential),
        };

        if child_ctx.verbose {
            tracing::info!(
                list = %self.description,
                children = self.children.len(),
                "start executing action list"
            );
        }
        let started = Instant::now();

        let result = if !child_ctx.sequential {
            self.execute_parallel(child_ctx).await
        } else if child_ctx.abort_on_error {
            self.execute_abort(&child_ctx).await;
            Ok(())
        } else {
            self.execute_continue(&child_ctx).await;
            Ok(())
        };

        // Release after executing ALL actions, whatever the outcome; the
        // list returns to an empty, reusable state.
        self.release_children();

        if child_ctx.verbose {
            tracing::info!(
                list = %self.description,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "finished executing action list"
            );
        }
        result
    }

    async fn undo(&mut self) -> Result<(), ActionError> {
        // Don't even try to undo a list which can't be undone; the
        // children collection is left unmodified.
        if !self.can_undo {
            return Err(ActionError::runtime(
                "trying to undo an action list which contains non-undoable actions",
            ));
        }

        // Children are unwound in forward insertion order, not reverse;
        // callers rely on this order. Undoing a child that never executed
        // or was already undone is a harmless no-op.
        for child in self.children.iter_mut() {
            if let Err(err) = child.undo().await {
                tracing::error!(
                    action = child.description(),
                    error = %err,
                    "undo failed"
                );
            }
        }
        self.release_children();
        Ok(())
    }
}

impl Drop for ActionList {
    fn drop(&mut self) {
        if !self.children.is_empty() {
            tracing::warn!(
                list = %self.description,
                children = self.children.len(),
                "dropping an action list with actions that were never executed or undone"
            );
        }
    }
}

/// Execute a single child, capturing its outcome locally: a failure is
/// logged and, if that child alone is undoable, compensated by that
/// child's own undo.
async fn execute_guarded(child: &mut dyn Action, ctx: &ActionContext) {
    if let Err(err) = child.execute(ctx).await {
        tracing::error!(
            action = child.description(),
            error = %err,
            "action failed"
        );
        if child.undoable() {
            if let Err(err) = child.undo().await {
                tracing::error!(
                    action = child.description(),
                    error = %err,
                    "undo failed"
                );
            }
        }
    }
}
