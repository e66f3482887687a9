/// Execution context carrying policy already resolved by the owner chain.
///
/// Each [`ActionList`](crate::list::ActionList) resolves its own tri-state
/// flags against the context it received, then passes the resolved values
/// down to its children. At the root of the chain (an action executed
/// with no owner) the stated defaults apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionContext {
    /// Resolved verbosity; root default is off.
    pub verbose: bool,
    /// Resolved abort-on-error policy; root default is abort.
    pub abort_on_error: bool,
    /// Resolved scheduling mode; root default is sequential.
    pub sequential: bool,
}

impl ActionContext {
    /// Context for an action with no owner.
    pub fn root() -> Self {
        Self {
            verbose: false,
            abort_on_error: true,
            sequential: true,
        }
    }
}

impl Default for ActionContext {
    fn default() -> Self {
        Self::root()
    }
}
