use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;

/// Structured failure detail forwarded from an asynchronous collaborator:
/// a mapping from field name to messages, carried through error actions
/// as-is so slices can render it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ErrorBody {
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ErrorBody {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single-field body, the common case for validation failures.
    pub fn message(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut body = Self::new();
        body.push(field, message);
        body
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Asynchronous work that has not settled yet.
pub struct Deferred<T>(BoxFuture<'static, Result<T, ErrorBody>>);

impl<T> Deferred<T> {
    pub fn new<F>(load: F) -> Self
    where
        F: Future<Output = Result<T, ErrorBody>> + Send + 'static,
    {
        Self(Box::pin(load))
    }

    /// Drives the work to completion and folds the outcome back into a
    /// settled payload.
    pub async fn settle(self) -> Async<T> {
        match self.0.await {
            Ok(value) => Async::Ready(value),
            Err(errors) => Async::Failed(errors),
        }
    }
}

/// Payload of an action that may involve asynchronous work.
///
/// `Pending` never reaches a reducer when [`crate::ResolveAsync`] is in the
/// chain; reducers only observe `Ready` and `Failed`.
pub enum Async<T> {
    Pending(Deferred<T>),
    Ready(T),
    Failed(ErrorBody),
}

impl<T> Async<T> {
    pub fn pending<F>(load: F) -> Self
    where
        F: Future<Output = Result<T, ErrorBody>> + Send + 'static,
    {
        Async::Pending(Deferred::new(load))
    }

    pub fn ready(value: T) -> Self {
        Async::Ready(value)
    }

    pub fn failed(errors: ErrorBody) -> Self {
        Async::Failed(errors)
    }

    /// `Ok` when already settled, `Err` with the deferred work otherwise.
    pub fn split(self) -> Result<Self, Deferred<T>> {
        match self {
            Async::Pending(deferred) => Err(deferred),
            settled => Ok(settled),
        }
    }

    pub fn as_ready(&self) -> Option<&T> {
        match self {
            Async::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_failed(&self) -> Option<&ErrorBody> {
        match self {
            Async::Failed(errors) => Some(errors),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Async::Pending(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Async::Failed(_))
    }
}

impl<T: fmt::Debug> fmt::Debug for Async<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Async::Pending(_) => f.write_str("Pending"),
            Async::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Async::Failed(errors) => f.debug_tuple("Failed").field(errors).finish(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn split_keeps_settled_payloads() {
        assert!(Async::ready(1).split().is_ok());
        assert!(Async::<i32>::failed(ErrorBody::message("id", "unknown"))
            .split()
            .is_ok());
        assert!(Async::<i32>::pending(async { Ok(1) }).split().is_err());
    }

    #[test]
    fn settle_folds_the_outcome() {
        let ready = futures::executor::block_on(Deferred::new(async { Ok(7) }).settle());
        assert_eq!(ready.as_ready(), Some(&7));

        let failed = futures::executor::block_on(
            Deferred::<i32>::new(async { Err(ErrorBody::message("fetch", "timed out")) }).settle(),
        );
        assert_eq!(
            failed.as_failed(),
            Some(&ErrorBody::message("fetch", "timed out"))
        );
    }

    #[test]
    fn debug_hides_the_future() {
        let pending = Async::<i32>::pending(async { Ok(1) });
        assert_eq!(format!("{:?}", pending), "Pending");
        assert_eq!(format!("{:?}", Async::ready(1)), "Ready(1)");
    }

    #[test]
    fn messages_default_to_empty() {
        let body = ErrorBody::message("email", "is invalid");
        assert_eq!(body.messages("email"), ["is invalid".to_string()]);
        assert!(body.messages("password").is_empty());
    }
}
