use std::{
    fmt,
    future::IntoFuture,
    sync::Arc,
};

use tokio::sync::watch;

use crate::BoxFut;

/// The completion handle of one operation.
///
/// Every call that observes the same pending operation receives a clone of the same
/// handle, so hosts can coalesce waiters with [`Suspension::ptr_eq`]. Awaiting it
/// yields `()` once the underlying computation has settled, whether it succeeded or
/// failed; the outcome itself is read by calling the suspender again.
#[derive(Clone)]
pub struct Suspension {
    settled: Arc<watch::Sender<bool>>,
}

impl Suspension {
    pub(crate) fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            settled: Arc::new(tx),
        }
    }

    /// Returns `true` if this call flipped the signal.
    pub(crate) fn settle(&self) -> bool {
        !self.settled.send_replace(true)
    }

    pub fn is_settled(&self) -> bool {
        *self.settled.borrow()
    }

    /// Whether both handles belong to the same operation.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.settled, &other.settled)
    }

    pub async fn wait(&self) {
        let mut rx = self.settled.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|settled| *settled).await;
    }
}

impl IntoFuture for Suspension {
    type Output = ();
    type IntoFuture = BoxFut<'static, ()>;

    fn into_future(self) -> Self::IntoFuture {
        Box::pin(async move { self.wait().await })
    }
}

impl fmt::Debug for Suspension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suspension")
            .field("settled", &self.is_settled())
            .finish()
    }
}
