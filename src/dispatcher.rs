use std::sync::Weak;

use crate::action::Action;

/// Crate-internal dispatch surface of the store engine, kept behind a trait
/// object so handles and the middleware chain stay independent of the state
/// type.
pub(crate) trait EngineCore<A: Action>: Send + Sync {
    /// Queue `action` and drain the queue unless a drain is already running.
    fn submit(&self, action: A);
    /// Queue `action` for the drain currently in progress.
    fn enqueue(&self, action: A);
    /// Terminal chain stage: root reducer, state swap, notification.
    fn finish(&self, action: A);
    fn dispatcher(&self) -> Dispatcher<A>;
}

/// Clonable handle that feeds actions into the full middleware chain from
/// outside the synchronous dispatch path: spawned resolution tasks, other
/// threads, subscribers.
///
/// The handle holds a weak reference: an action sent after the store is gone
/// is dropped and logged, which is also how late asynchronous resolutions
/// die once nobody owns the store anymore.
pub struct Dispatcher<A: Action> {
    core: Weak<dyn EngineCore<A>>,
}

impl<A: Action> Dispatcher<A> {
    pub(crate) fn new(core: Weak<dyn EngineCore<A>>) -> Self {
        Self { core }
    }

    pub fn send(&self, action: A) {
        let Some(core) = self.core.upgrade() else {
            log::debug!("dropping {:?}: store is gone", action.kind());
            return;
        };
        if action.kind().is_empty() {
            log::warn!("ignoring action with empty kind: {action:?}");
            return;
        }
        core.submit(action);
    }
}

impl<A: Action> Clone for Dispatcher<A> {
    fn clone(&self) -> Self {
        Self {
            core: self.core.clone(),
        }
    }
}
