use crate::action::{AsyncAction, SplitPending};
use crate::middleware::{Chain, Middleware};

/// Middleware that keeps pending payloads away from the reducers.
///
/// A dispatched action whose payload is still pending is split in two:
/// the synthetic in-flight marker runs through the whole chain immediately
/// (inside the same `dispatch` call), and the settled action follows through
/// the whole chain once the work completes on the runtime. The original
/// action never reaches the reducer. Settled payloads pass through
/// untouched.
///
/// Place this stage ahead of anything that inspects payloads.
pub struct ResolveAsync {
    runtime: tokio::runtime::Handle,
}

impl ResolveAsync {
    /// Captures the current Tokio runtime. Panics outside of one; use
    /// [`ResolveAsync::with_runtime`] to inject a handle explicitly.
    pub fn new() -> Self {
        Self::with_runtime(tokio::runtime::Handle::current())
    }

    pub fn with_runtime(runtime: tokio::runtime::Handle) -> Self {
        Self { runtime }
    }
}

impl Default for ResolveAsync {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: AsyncAction> Middleware<A> for ResolveAsync {
    fn handle(&self, action: A, chain: &Chain<'_, A>) {
        match action.split_pending() {
            SplitPending::Ready(action) => chain.next(action),
            SplitPending::Pending { kind, resolve } => {
                // Queued ahead of the spawn: the in-flight marker is always
                // observed strictly before the settled action.
                chain.dispatch(A::async_started(kind));
                let sender = chain.sender();
                self.runtime.spawn(async move {
                    sender.send(resolve.await);
                });
            }
        }
    }
}
