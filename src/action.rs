use std::fmt;

use futures::future::BoxFuture;

/// A tagged, immutable record describing something that happened.
///
/// Actions are moved into [`crate::Store::dispatch`], consumed once by the
/// middleware chain and the reducers, then dropped. Unknown kinds are legal:
/// reducers leave their state unchanged for them.
pub trait Action: fmt::Debug + Send + 'static {
    /// Stable tag naming the action. Must be non-empty.
    fn kind(&self) -> &'static str;

    /// Whether this action reports a failed asynchronous resolution. Error
    /// actions carry failure details where the success payload would be.
    fn is_error(&self) -> bool {
        false
    }
}

/// Resolution of a pending payload: a future yielding the settled
/// success-or-failure action, fed back through the full chain.
pub type DeferredAction<A> = BoxFuture<'static, A>;

/// Result of [`AsyncAction::split_pending`].
pub enum SplitPending<A> {
    /// Nothing left to resolve; forward the action as-is.
    Ready(A),
    /// The payload is still pending. `resolve` yields the settled action.
    Pending {
        kind: &'static str,
        resolve: DeferredAction<A>,
    },
}

/// Actions whose payload may still be pending when dispatched.
///
/// [`crate::ResolveAsync`] relies on this trait to keep unsettled payloads
/// away from the reducers: it splits the pending work off, announces it with
/// [`AsyncAction::async_started`], and re-dispatches the settled action once
/// the work completes.
pub trait AsyncAction: Action + Sized {
    /// Synthetic marker dispatched while `kind`'s payload resolves, so
    /// reducers can flip their in-flight flags. By convention tagged
    /// `"ASYNC_START"`.
    fn async_started(kind: &'static str) -> Self;

    /// Split any still-pending payload off the action.
    fn split_pending(self) -> SplitPending<Self>;
}
