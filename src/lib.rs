//! Predictable state container: one immutable state tree, pure reducers,
//! and a middleware chain that folds asynchronous results back into the
//! dispatch stream.

mod action;
mod combine;
mod dispatcher;
mod engine;
mod error;
mod middleware;
mod payload;
mod reducer;
mod resolve_async;
mod state_tree;
mod store;
mod token_sync;

pub use action::{Action, AsyncAction, DeferredAction, SplitPending};
pub use combine::Slices;
pub use dispatcher::Dispatcher;
pub use error::StoreError;
pub use middleware::{Chain, Middleware};
pub use payload::{Async, Deferred, ErrorBody};
pub use reducer::Reducer;
pub use resolve_async::ResolveAsync;
pub use state_tree::{SliceState, StateTree};
pub use store::{Store, Subscription};
pub use token_sync::{MemoryTokenStorage, TokenEvent, TokenStorage, TokenSync};
