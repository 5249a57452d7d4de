use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::action::Action;
use crate::dispatcher::{Dispatcher, EngineCore};
use crate::engine::{StoreEngine, Subscribers};
use crate::error::StoreError;
use crate::middleware::Middleware;
use crate::reducer::Reducer;

/// The single writer of the state tree. Holds the current snapshot and
/// mediates every transition: `dispatch` runs the action through the
/// middleware chain and the root reducer, swaps the state atomically, and
/// notifies subscribers.
///
/// There is no ambient instance; construct one and pass it to whatever
/// needs it. Dropping the last reference disposes the store; asynchronous
/// resolutions arriving afterwards are dropped.
pub struct Store<S, A: Action> {
    engine: Arc<StoreEngine<S, A>>,
}

impl<S, A> Store<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    pub fn new<R>(reducer: R) -> Self
    where
        R: Reducer<S, A> + Send + Sync + 'static,
    {
        Self::with_middleware(reducer, Vec::new())
    }

    /// Builds a store with a middleware chain, fixed in the given order.
    /// Order matters: [`crate::ResolveAsync`] must precede any stage that
    /// inspects payloads, such as [`crate::TokenSync`].
    pub fn with_middleware<R>(reducer: R, middleware: Vec<Box<dyn Middleware<A>>>) -> Self
    where
        R: Reducer<S, A> + Send + Sync + 'static,
    {
        Self {
            engine: StoreEngine::new(reducer, middleware),
        }
    }

    /// Feeds `action` through the chain. Fire-and-forget beyond validation:
    /// `Ok(())` does not mean the action reached the reducer, since middleware
    /// may have deferred or dropped it.
    ///
    /// Reentrant dispatch (from middleware or from a subscriber callback) is
    /// supported and deferred: the action queues behind the cycle in
    /// progress and completes before the outermost `dispatch` returns. A
    /// panicking reducer aborts its cycle with the previous state intact and
    /// no notification sent.
    pub fn dispatch(&self, action: A) -> Result<(), StoreError> {
        if action.kind().is_empty() {
            return Err(StoreError::InvalidAction);
        }
        self.engine.submit(action);
        Ok(())
    }

    /// Current state snapshot. Snapshots are immutable and stay valid after
    /// later dispatches, so they can be retained for debugging or
    /// time-travel.
    pub fn state(&self) -> Arc<S> {
        self.engine.snapshot()
    }

    /// Registers a change callback, invoked with no arguments after every
    /// completed dispatch cycle, in registration order. Callbacks read
    /// [`Store::state`] themselves. A callback registered while a
    /// notification loop is running first fires on the next cycle.
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = self.engine.add_subscriber(Arc::new(callback));
        Subscription {
            id,
            list: Arc::downgrade(self.engine.subscriber_list()),
        }
    }

    /// Detached handle for feeding actions in from other threads or tasks.
    pub fn dispatcher(&self) -> Dispatcher<A> {
        self.engine.dispatcher()
    }
}

/// Handle returned by [`Store::subscribe`].
#[must_use = "dropping the handle keeps the callback registered; call cancel() to unsubscribe"]
pub struct Subscription {
    id: u64,
    list: Weak<Mutex<Subscribers>>,
}

impl Subscription {
    /// Stops further notifications for this registration. A no-op once the
    /// store is gone.
    pub fn cancel(self) {
        if let Some(list) = self.list.upgrade() {
            list.lock().remove(self.id);
        }
    }
}
