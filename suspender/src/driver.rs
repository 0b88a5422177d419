use std::sync::Arc;

use tracing::trace;
use use_suspender_core::DeepEq;

use crate::{outcome::Outcome, suspender::Suspender};

impl<A, T, E, C> Suspender<A, T, E, C>
where
    A: DeepEq + Clone + Send + 'static,
    T: Send + 'static,
    E: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    /// Keeps calling [`Suspender::use_suspender`] until the operation settles.
    ///
    /// This is the simplest host for the pending signal: wait for the suspension, then
    /// ask again. If another caller consumes the value first, a new operation is
    /// started and awaited in turn.
    pub async fn resolve(&self, args: A) -> Result<T, Arc<E>> {
        loop {
            match self.use_suspender(args.clone()) {
                Outcome::Resolved(value) => return Ok(value),
                Outcome::Rejected(error) => return Err(error),
                Outcome::Pending(suspension) => {
                    trace!(suspender = self.config().name, "Waiting for operation to settle");
                    suspension.await;
                }
            }
        }
    }
}
