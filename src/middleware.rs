//! Interceptors that sit between `dispatch` and the root reducer.
//!
//! The chain is fixed when the store is built and its order is part of the
//! store's contract: [`crate::ResolveAsync`] must come before any stage that
//! inspects payloads (such as [`crate::TokenSync`]), so later stages only
//! ever see settled payloads.

use crate::action::Action;
use crate::dispatcher::{Dispatcher, EngineCore};

/// One stage of the middleware chain.
pub trait Middleware<A: Action>: Send + Sync {
    /// Inspect `action` and either forward it (possibly transformed) with
    /// [`Chain::next`], drop it by returning without calling `next`, or feed
    /// replacement actions through the whole chain with [`Chain::dispatch`]
    /// or a [`Chain::sender`] handle.
    fn handle(&self, action: A, chain: &Chain<'_, A>);
}

/// The remainder of the chain, ending in the root reducer.
pub struct Chain<'a, A: Action> {
    core: &'a dyn EngineCore<A>,
    rest: &'a [Box<dyn Middleware<A>>],
}

impl<'a, A: Action> Chain<'a, A> {
    pub(crate) fn new(core: &'a dyn EngineCore<A>, rest: &'a [Box<dyn Middleware<A>>]) -> Self {
        Self { core, rest }
    }

    /// Passes `action` to the next stage, or to the root reducer when this
    /// was the last one.
    pub fn next(&self, action: A) {
        match self.rest.split_first() {
            Some((stage, rest)) => stage.handle(action, &Chain::new(self.core, rest)),
            None => self.core.finish(action),
        }
    }

    /// Queues `action` to run through the entire chain from the top, after
    /// the current dispatch cycle completes.
    pub fn dispatch(&self, action: A) {
        self.core.enqueue(action);
    }

    /// Detached handle for feeding actions in later, e.g. from a spawned
    /// task.
    pub fn sender(&self) -> Dispatcher<A> {
        self.core.dispatcher()
    }
}
