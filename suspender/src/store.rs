use std::{fmt, sync::Arc};

use use_suspender_core::DeepEq;

use crate::signal::Suspension;

/// Identifies an operation within one store. Never reused, so a completion that
/// arrives after [`OperationStore::clear`] cannot land on a newer operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OperationId(u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The observable state of an operation, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationState {
    Pending,
    Resolved,
    Rejected,
}

enum State<T, E> {
    Pending,
    Resolved(T),
    Rejected(Arc<E>),
}

impl<T, E> State<T, E> {
    fn tag(&self) -> OperationState {
        match self {
            State::Pending => OperationState::Pending,
            State::Resolved(_) => OperationState::Resolved,
            State::Rejected(_) => OperationState::Rejected,
        }
    }
}

struct Operation<A, T, E> {
    id: OperationId,
    args: A,
    state: State<T, E>,
    signal: Suspension,
}

impl<A, T, E> Operation<A, T, E> {
    fn into_found(self) -> Found<T, E> {
        match self.state {
            State::Pending => Found::Pending(self.signal),
            State::Resolved(value) => Found::Resolved(value),
            State::Rejected(error) => Found::Rejected(error),
        }
    }
}

/// What a lookup found, already decided for the caller.
pub(crate) enum Found<T, E> {
    Pending(Suspension),
    Resolved(T),
    Rejected(Arc<E>),
}

pub(crate) enum Settled {
    Resolved,
    Rejected,
    /// The operation was cleared away while its computation was in flight.
    Detached,
}

/// All operations of one suspender that have not been consumed yet.
///
/// Kept in creation order, so when several operations match (only possible with
/// [`PrefetchPolicy::AlwaysStart`](crate::PrefetchPolicy::AlwaysStart)) the oldest one
/// is served first.
pub(crate) struct OperationStore<A, T, E> {
    operations: Vec<Operation<A, T, E>>,
    next_id: u64,
}

impl<A, T, E> OperationStore<A, T, E> {
    pub fn new() -> Self {
        Self {
            operations: Vec::new(),
            next_id: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn clear(&mut self) -> usize {
        let cleared = self.operations.len();
        self.operations.clear();
        cleared
    }
}

impl<A, T, E> OperationStore<A, T, E>
where
    A: DeepEq,
{
    fn position(&self, args: &A) -> Option<usize> {
        self.operations.iter().position(|op| op.args.deep_eq(args))
    }

    pub fn state_of(&self, args: &A) -> Option<OperationState> {
        self.position(args).map(|idx| self.operations[idx].state.tag())
    }

    pub fn contains(&self, args: &A) -> bool {
        self.position(args).is_some()
    }

    /// Looks up the operation matching `args`.
    ///
    /// A resolved operation is removed as part of the read. A rejected one is only
    /// removed if `evict_rejected` is set.
    pub fn lookup(&mut self, args: &A, evict_rejected: bool) -> Option<(OperationId, Found<T, E>)> {
        let idx = self.position(args)?;

        let op = &self.operations[idx];
        match &op.state {
            State::Pending => return Some((op.id, Found::Pending(op.signal.clone()))),
            State::Rejected(error) if !evict_rejected => {
                return Some((op.id, Found::Rejected(error.clone())))
            }
            State::Resolved(_) | State::Rejected(_) => {}
        }

        let op = self.operations.remove(idx);
        Some((op.id, op.into_found()))
    }

    /// Registers a new pending operation and returns its id and completion handle.
    pub fn insert(&mut self, args: A) -> (OperationId, Suspension) {
        let id = OperationId(self.next_id);
        self.next_id += 1;

        let signal = Suspension::new();
        self.operations.push(Operation {
            id,
            args,
            state: State::Pending,
            signal: signal.clone(),
        });

        (id, signal)
    }

    /// Records the outcome of the computation behind `id` and wakes its waiters.
    ///
    /// Only a pending operation transitions; the signal is fired even when the
    /// operation is no longer in the store, since callers may still hold it.
    pub fn settle(&mut self, id: OperationId, signal: &Suspension, result: Result<T, E>) -> Settled {
        let op = self
            .operations
            .iter_mut()
            .find(|op| op.id == id && matches!(op.state, State::Pending));

        let settled = match (op, result) {
            (Some(op), Ok(value)) => {
                op.state = State::Resolved(value);
                Settled::Resolved
            }
            (Some(op), Err(error)) => {
                op.state = State::Rejected(Arc::new(error));
                Settled::Rejected
            }
            (None, _) => Settled::Detached,
        };

        signal.settle();
        settled
    }

    /// Drops the pending operation behind `id` without an outcome and wakes its
    /// waiters, whose next call starts over. Used when the computation panicked.
    pub fn abandon(&mut self, id: OperationId, signal: &Suspension) -> bool {
        let idx = self
            .operations
            .iter()
            .position(|op| op.id == id && matches!(op.state, State::Pending));

        if let Some(idx) = idx {
            self.operations.remove(idx);
        }

        signal.settle();
        idx.is_some()
    }
}
