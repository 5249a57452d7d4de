use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::action::Action;
use crate::dispatcher::{Dispatcher, EngineCore};
use crate::middleware::{Chain, Middleware};
use crate::reducer::Reducer;

/// The store's dispatch core: current state, the fixed middleware chain, a
/// FIFO action queue with a single active drainer, and the subscriber list.
///
/// The draining thread runs each cycle to completion (chain, root reducer,
/// state swap, notification); concurrent submitters enqueue and return, so
/// subscribers always observe a fully-applied state.
pub(crate) struct StoreEngine<S, A: Action> {
    reducer: Box<dyn Reducer<S, A> + Send + Sync>,
    middleware: Vec<Box<dyn Middleware<A>>>,
    state: Mutex<Arc<S>>,
    queue: Mutex<DispatchQueue<A>>,
    subscribers: Arc<Mutex<Subscribers>>,
    weak_self: Weak<StoreEngine<S, A>>,
}

struct DispatchQueue<A> {
    pending: VecDeque<A>,
    draining: bool,
}

pub(crate) struct Subscribers {
    next_id: u64,
    entries: Vec<(u64, Arc<dyn Fn() + Send + Sync>)>,
}

impl Subscribers {
    fn add(&mut self, callback: Arc<dyn Fn() + Send + Sync>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    pub(crate) fn remove(&mut self, id: u64) {
        self.entries.retain(|(entry_id, _)| *entry_id != id);
    }

    fn snapshot(&self) -> Vec<Arc<dyn Fn() + Send + Sync>> {
        self.entries
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect()
    }
}

impl<S, A> StoreEngine<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    pub(crate) fn new<R>(reducer: R, middleware: Vec<Box<dyn Middleware<A>>>) -> Arc<Self>
    where
        R: Reducer<S, A> + Send + Sync + 'static,
    {
        let initial = Arc::new(reducer.initial());
        Arc::new_cyclic(|weak_self| StoreEngine {
            reducer: Box::new(reducer),
            middleware,
            state: Mutex::new(initial),
            queue: Mutex::new(DispatchQueue {
                pending: VecDeque::new(),
                draining: false,
            }),
            subscribers: Arc::new(Mutex::new(Subscribers {
                next_id: 0,
                entries: Vec::new(),
            })),
            weak_self: weak_self.clone(),
        })
    }

    pub(crate) fn snapshot(&self) -> Arc<S> {
        self.state.lock().clone()
    }

    pub(crate) fn add_subscriber(&self, callback: Arc<dyn Fn() + Send + Sync>) -> u64 {
        self.subscribers.lock().add(callback)
    }

    pub(crate) fn subscriber_list(&self) -> &Arc<Mutex<Subscribers>> {
        &self.subscribers
    }

    fn drain(&self) {
        let _guard = DrainGuard { queue: &self.queue };
        while let Some(action) = self.take_next() {
            log::debug!("handling {:?}", action);
            Chain::new(self, &self.middleware).next(action);
        }
    }

    fn take_next(&self) -> Option<A> {
        let mut queue = self.queue.lock();
        let next = queue.pending.pop_front();
        // The draining flag must drop in the same critical section that saw
        // the queue empty, or a concurrent submit could strand its action.
        if next.is_none() {
            queue.draining = false;
        }
        next
    }

    fn notify(&self) {
        // Snapshot before the loop: subscribers registered during a
        // notification first fire on the next cycle.
        let callbacks = self.subscribers.lock().snapshot();
        for callback in callbacks {
            callback();
        }
    }
}

impl<S, A> EngineCore<A> for StoreEngine<S, A>
where
    S: Send + Sync + 'static,
    A: Action,
{
    fn submit(&self, action: A) {
        {
            let mut queue = self.queue.lock();
            queue.pending.push_back(action);
            if queue.draining {
                return;
            }
            queue.draining = true;
        }
        self.drain();
    }

    fn enqueue(&self, action: A) {
        self.queue.lock().pending.push_back(action);
    }

    fn finish(&self, action: A) {
        let next = {
            let prev = self.snapshot();
            Arc::new(self.reducer.reduce(&prev, &action))
        };
        *self.state.lock() = next;
        self.notify();
    }

    fn dispatcher(&self) -> Dispatcher<A> {
        let core: Weak<dyn EngineCore<A>> = self.weak_self.clone();
        Dispatcher::new(core)
    }
}

/// Re-arms the queue when a reducer panic unwinds through the drain loop,
/// so the store stays usable afterwards.
struct DrainGuard<'a, A> {
    queue: &'a Mutex<DispatchQueue<A>>,
}

impl<A> Drop for DrainGuard<'_, A> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.queue.lock().draining = false;
        }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use crate::reducer::Reducer;
    use crate::store::Store;
    use crate::Action;

    #[derive(Clone, Debug, Default, PartialEq)]
    struct Counter {
        count: u64,
    }

    #[derive(Debug)]
    enum CounterAction {
        Increment,
    }

    impl Action for CounterAction {
        fn kind(&self) -> &'static str {
            "INCREMENT"
        }
    }

    struct CounterReducer;

    impl Reducer<Counter, CounterAction> for CounterReducer {
        fn initial(&self) -> Counter {
            Counter::default()
        }

        fn reduce(&self, state: &Counter, action: &CounterAction) -> Counter {
            match action {
                CounterAction::Increment => Counter {
                    count: state.count + 1,
                },
            }
        }
    }

    #[test]
    fn dispatches_from_many_threads_are_serialized() {
        let store = Arc::new(Store::new(CounterReducer));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for _ in 0..100 {
                        store.dispatch(CounterAction::Increment).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.state().count, 800);
    }
}
