use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

use futures::FutureExt;
use parking_lot::{Mutex, MutexGuard};
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};
use use_suspender_core::DeepEq;

use crate::{
    computation::Computation,
    error::SuspenderError,
    outcome::{Outcome, PotentialResult},
    signal::Suspension,
    store::{Found, OperationId, OperationState, OperationStore, Settled},
};

type Implementation<A, T, E, C> =
    Arc<dyn Fn(Option<&C>, A) -> Computation<T, E> + Send + Sync + 'static>;

type SharedStore<A, T, E> = Arc<Mutex<OperationStore<A, T, E>>>;

/// How [`Suspender::call_early`] treats an argument list that already has an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrefetchPolicy {
    /// Leave the existing operation alone, whatever its state.
    #[default]
    Deduplicate,
    /// Always start a fresh computation. Lookups keep serving the oldest match.
    AlwaysStart,
}

#[derive(Debug, Clone)]
pub struct SuspenderConfig {
    /// Attached to every tracing event as `suspender`.
    pub name: &'static str,
    pub prefetch: PrefetchPolicy,
    /// Drop a rejected operation once its error has been read, like resolved ones.
    pub evict_rejected_on_read: bool,
    /// Where deferred computations are spawned. Falls back to the ambient runtime.
    pub runtime: Option<Handle>,
}

impl Default for SuspenderConfig {
    fn default() -> Self {
        Self {
            name: "suspender",
            prefetch: PrefetchPolicy::default(),
            evict_rejected_on_read: false,
            runtime: None,
        }
    }
}

/// Wraps a computation so that concurrent calls with equal arguments share one run.
///
/// Calling [`Suspender::use_suspender`] never blocks. The first call for an argument
/// list starts the computation and reports [`Outcome::Pending`]; calls made before it
/// settles get the same [`Suspension`] back. Once settled, the next call receives the
/// value, which also removes the operation, so the call after that starts over. A
/// failure keeps being reported until the cache is cleared.
///
/// Clones share the same cache. Separately built suspenders never share operations.
///
/// ```ignore
/// let get_user = Suspender::new(|(id,): (u32,)| {
///     Computation::deferred(async move { fetch_user(id).await })
/// });
///
/// match get_user.use_suspender((42,)) {
///     Outcome::Pending(suspension) => suspension.await, // then call again
///     Outcome::Resolved(user) => render(user),
///     Outcome::Rejected(error) => show(error),
/// }
/// ```
///
/// # Panics
///
/// Starting a [`Computation::Deferred`] spawns it on tokio, which panics outside of a
/// runtime unless one was configured with [`SuspenderBuilder::runtime`].
///
/// If the implementation panics, its operation is dropped and every waiter is woken,
/// so the next call starts over. A panic raised while creating the computation is
/// passed on to the caller; one raised by a deferred computation ends its task.
pub struct Suspender<A, T, E, C = ()> {
    implementation: Implementation<A, T, E, C>,
    receiver: Option<Arc<C>>,
    config: Arc<SuspenderConfig>,
    store: SharedStore<A, T, E>,
}

impl<A, T, E, C> Clone for Suspender<A, T, E, C> {
    fn clone(&self) -> Self {
        Self {
            implementation: self.implementation.clone(),
            receiver: self.receiver.clone(),
            config: self.config.clone(),
            store: self.store.clone(),
        }
    }
}

impl<A, T, E, C> Suspender<A, T, E, C> {
    fn from_parts(
        implementation: Implementation<A, T, E, C>,
        receiver: Option<C>,
        config: SuspenderConfig,
    ) -> Self {
        Self {
            implementation,
            receiver: receiver.map(Arc::new),
            config: Arc::new(config),
            store: Arc::new(Mutex::new(OperationStore::new())),
        }
    }
}

impl<A, T, E> Suspender<A, T, E>
where
    A: DeepEq + Clone + Send + 'static,
    T: Send + 'static,
    E: Send + Sync + 'static,
{
    /// Creates a suspender without a receiver.
    pub fn new<F>(implementation: F) -> Self
    where
        F: Fn(A) -> Computation<T, E> + Send + Sync + 'static,
    {
        Self::from_parts(
            Arc::new(move |_: Option<&()>, args: A| implementation(args)),
            None,
            SuspenderConfig::default(),
        )
    }

    pub fn builder() -> SuspenderBuilder<A, T, E> {
        SuspenderBuilder::new()
    }
}

impl<A, T, E, C> Suspender<A, T, E, C>
where
    A: DeepEq + Clone + Send + 'static,
    T: Send + 'static,
    E: Send + Sync + 'static,
    C: Send + Sync + 'static,
{
    /// Creates a suspender whose implementation is always handed `receiver`.
    pub fn with_receiver<F>(implementation: F, receiver: C) -> Self
    where
        F: Fn(Option<&C>, A) -> Computation<T, E> + Send + Sync + 'static,
    {
        Self::from_parts(
            Arc::new(implementation),
            Some(receiver),
            SuspenderConfig::default(),
        )
    }

    pub fn config(&self) -> &SuspenderConfig {
        &self.config
    }

    /// Looks up the operation for `args`, starting one if there is none.
    pub fn use_suspender(&self, args: A) -> Outcome<T, E> {
        let name = self.config.name;
        let mut store = self.store.lock();

        trace!(suspender = name, size = store.len(), "Looking up operation");
        let found = store.lookup(&args, self.config.evict_rejected_on_read);

        match found {
            Some((id, Found::Pending(suspension))) => {
                debug!(suspender = name, operation = %id, "Operation still pending");
                Outcome::Pending(suspension)
            }
            Some((id, Found::Rejected(error))) => {
                debug!(suspender = name, operation = %id, "Reporting rejected operation");
                Outcome::Rejected(error)
            }
            Some((id, Found::Resolved(value))) => {
                debug!(suspender = name, operation = %id, size = store.len(), "Consumed resolved operation");
                Outcome::Resolved(value)
            }
            None => Outcome::Pending(self.start(store, args)),
        }
    }

    /// [`Suspender::use_suspender`], shaped for `?`.
    pub fn read(&self, args: A) -> PotentialResult<T, E> {
        self.use_suspender(args).into_result()
    }

    /// Starts the computation for `args` ahead of the first read.
    ///
    /// Never reports anything back; a failure is kept for the next read. See
    /// [`PrefetchPolicy`] for what happens when `args` already has an operation.
    pub fn call_early(&self, args: A) {
        let store = self.store.lock();

        if self.config.prefetch == PrefetchPolicy::Deduplicate && store.contains(&args) {
            debug!(suspender = self.config.name, "Operation already exists, skipping prefetch");
            return;
        }

        self.start(store, args);
    }

    /// The state of the operation `args` would hit, without consuming it.
    pub fn state(&self, args: &A) -> Option<OperationState> {
        self.store.lock().state_of(args)
    }

    pub fn cache(&self) -> CacheView<'_, A, T, E> {
        CacheView {
            name: self.config.name,
            store: &self.store,
        }
    }

    /// Registers the operation while still holding the lock, then runs the
    /// implementation with the lock released so it may call back into this suspender.
    fn start(&self, mut store: MutexGuard<'_, OperationStore<A, T, E>>, args: A) -> Suspension {
        let name = self.config.name;
        let (id, suspension) = store.insert(args.clone());
        debug!(suspender = name, operation = %id, size = store.len(), "Started operation");
        drop(store);

        let computation = match panic::catch_unwind(AssertUnwindSafe(|| {
            (self.implementation)(self.receiver.as_deref(), args)
        })) {
            Ok(computation) => computation,
            Err(payload) => {
                abandon(&self.store, name, id, &suspension);
                panic::resume_unwind(payload);
            }
        };

        match computation {
            Computation::Ready(result) => complete(&self.store, name, id, &suspension, result),
            Computation::Deferred(fut) => {
                let store = self.store.clone();
                let signal = suspension.clone();
                let task = async move {
                    match AssertUnwindSafe(fut).catch_unwind().await {
                        Ok(result) => complete(&store, name, id, &signal, result),
                        Err(_) => abandon(&store, name, id, &signal),
                    }
                };

                match &self.config.runtime {
                    Some(runtime) => drop(runtime.spawn(task)),
                    None => drop(tokio::spawn(task)),
                }
            }
        }

        suspension
    }
}

fn complete<A, T, E>(
    store: &Mutex<OperationStore<A, T, E>>,
    name: &'static str,
    id: OperationId,
    signal: &Suspension,
    result: Result<T, E>,
) where
    A: DeepEq,
{
    match store.lock().settle(id, signal, result) {
        Settled::Resolved => debug!(suspender = name, operation = %id, "Operation resolved"),
        Settled::Rejected => debug!(suspender = name, operation = %id, "Operation rejected"),
        Settled::Detached => {
            debug!(suspender = name, operation = %id, "Operation settled after being cleared, dropping outcome")
        }
    }
}

fn abandon<A, T, E>(
    store: &Mutex<OperationStore<A, T, E>>,
    name: &'static str,
    id: OperationId,
    signal: &Suspension,
) where
    A: DeepEq,
{
    let removed = store.lock().abandon(id, signal);
    warn!(suspender = name, operation = %id, removed, "Implementation panicked, dropping operation");
}

impl<A, T, E, C> fmt::Debug for Suspender<A, T, E, C>
where
    A: DeepEq,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Suspender")
            .field("name", &self.config.name)
            .field("size", &self.store.lock().len())
            .field("has_receiver", &self.receiver.is_some())
            .finish()
    }
}

/// Manual control over a suspender's cached operations.
pub struct CacheView<'a, A, T, E> {
    name: &'static str,
    store: &'a Mutex<OperationStore<A, T, E>>,
}

impl<'a, A, T, E> CacheView<'a, A, T, E>
where
    A: DeepEq,
{
    /// Pending, rejected and resolved-but-unread operations.
    pub fn size(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Forgets every operation. Computations still in flight run to completion, but
    /// their outcome is dropped and the next call with the same arguments starts over.
    pub fn clear(&self) {
        let cleared = self.store.lock().clear();
        debug!(suspender = self.name, cleared, "Cleared cache");
    }
}

/// Assembles a [`Suspender`]. The only thing that can go wrong is not providing an
/// implementation.
pub struct SuspenderBuilder<A, T, E, C = ()> {
    implementation: Option<Implementation<A, T, E, C>>,
    receiver: Option<C>,
    config: SuspenderConfig,
}

impl<A, T, E> SuspenderBuilder<A, T, E> {
    pub fn new() -> Self {
        Self {
            implementation: None,
            receiver: None,
            config: SuspenderConfig::default(),
        }
    }
}

impl<A, T, E> Default for SuspenderBuilder<A, T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, T, E, C> SuspenderBuilder<A, T, E, C> {
    pub fn with_receiver(receiver: C) -> Self {
        Self {
            implementation: None,
            receiver: Some(receiver),
            config: SuspenderConfig::default(),
        }
    }

    /// Binds `receiver` to every call of the implementation.
    ///
    /// The implementation's signature depends on the receiver type, so set the
    /// receiver first. An implementation supplied before this call is discarded and
    /// [`SuspenderBuilder::build`] fails until a new one is given.
    pub fn receiver<C2>(self, receiver: C2) -> SuspenderBuilder<A, T, E, C2> {
        if self.implementation.is_some() {
            debug!(
                suspender = self.config.name,
                "Receiver changed, discarding implementation"
            );
        }

        SuspenderBuilder {
            implementation: None,
            receiver: Some(receiver),
            config: self.config,
        }
    }

    pub fn implementation<F>(mut self, implementation: F) -> Self
    where
        F: Fn(Option<&C>, A) -> Computation<T, E> + Send + Sync + 'static,
    {
        self.implementation = Some(Arc::new(implementation));
        self
    }

    pub fn name(mut self, name: &'static str) -> Self {
        self.config.name = name;
        self
    }

    pub fn prefetch(mut self, prefetch: PrefetchPolicy) -> Self {
        self.config.prefetch = prefetch;
        self
    }

    pub fn evict_rejected_on_read(mut self, evict: bool) -> Self {
        self.config.evict_rejected_on_read = evict;
        self
    }

    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.config.runtime = Some(runtime);
        self
    }

    pub fn config(mut self, config: SuspenderConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Result<Suspender<A, T, E, C>, SuspenderError> {
        let Some(implementation) = self.implementation else {
            return Err(SuspenderError::NotCallable);
        };

        Ok(Suspender::from_parts(
            implementation,
            self.receiver,
            self.config,
        ))
    }
}
