/// Errors surfaced by [`crate::Store::dispatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The action's kind tag was empty. The action never entered the
    /// dispatch queue and store state is untouched.
    #[error("invalid action: kind must be a non-empty string")]
    InvalidAction,
}
