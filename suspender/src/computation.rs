use std::{fmt, future::Future};

use crate::BoxFut;

/// What a suspender implementation hands back for one invocation.
///
/// A plain value (or a synchronous failure) is [`Computation::Ready`]; anything that
/// still has to be awaited is [`Computation::Deferred`]. Both take the same path
/// into the operation's state: a synchronous `Err` is indistinguishable from a
/// deferred rejection.
pub enum Computation<T, E> {
    Ready(Result<T, E>),
    Deferred(BoxFut<'static, Result<T, E>>),
}

impl<T, E> Computation<T, E> {
    pub fn value(value: T) -> Self {
        Self::Ready(Ok(value))
    }

    pub fn failure(error: E) -> Self {
        Self::Ready(Err(error))
    }

    pub fn deferred<F>(fut: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Self::Deferred(Box::pin(fut))
    }
}

impl<T, E> From<Result<T, E>> for Computation<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Self::Ready(result)
    }
}

impl<T, E> fmt::Debug for Computation<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Computation::Ready(Ok(_)) => f.write_str("Computation::Ready(Ok(..))"),
            Computation::Ready(Err(_)) => f.write_str("Computation::Ready(Err(..))"),
            Computation::Deferred(_) => f.write_str("Computation::Deferred(..)"),
        }
    }
}
