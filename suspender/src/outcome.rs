use std::sync::Arc;

use crate::signal::Suspension;

/// The result of calling a suspender.
#[derive(Debug)]
pub enum Outcome<T, E> {
    /// Not settled yet. Wait for the handle, then call again.
    Pending(Suspension),
    /// The settled value. Reading it removed the operation from the cache.
    Resolved(T),
    /// The failure exactly as the implementation produced it.
    Rejected(Arc<E>),
}

/// `Outcome` reshaped for hosts that want to short-circuit with `?`.
pub type PotentialResult<T, E> = Result<T, Interrupt<E>>;

/// Why a call could not produce a value.
#[derive(Debug)]
pub enum Interrupt<E> {
    Pending(Suspension),
    Failed(Arc<E>),
}

impl<T, E> Outcome<T, E> {
    pub fn into_result(self) -> PotentialResult<T, E> {
        match self {
            Outcome::Pending(suspension) => Err(Interrupt::Pending(suspension)),
            Outcome::Resolved(value) => Ok(value),
            Outcome::Rejected(error) => Err(Interrupt::Failed(error)),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Outcome::Pending(_))
    }

    pub fn suspension(&self) -> Option<&Suspension> {
        match self {
            Outcome::Pending(suspension) => Some(suspension),
            _ => None,
        }
    }
}

impl<T, E> From<Outcome<T, E>> for PotentialResult<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        outcome.into_result()
    }
}
