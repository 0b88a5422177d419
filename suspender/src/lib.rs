// #![warn(clippy::pedantic)]
// #![warn(clippy::nursery)]
// #![warn(clippy::cargo)]
#![warn(clippy::complexity)]
#![warn(clippy::correctness)]
#![warn(clippy::perf)]
#![warn(clippy::style)]
#![warn(clippy::suspicious)]
#![warn(clippy::print_stdout)]
#![warn(clippy::print_stderr)]
#![warn(clippy::unwrap_used)]

//! Request deduplication for suspense-style callers.
//!
//! A [`Suspender`] wraps a computation. Calling it with some arguments either starts
//! the computation, reports that it is still running, or hands back its result. Equal
//! arguments (compared with [`DeepEq`]) share one computation while it runs, and a
//! result is kept only until it has been read once.

pub mod computation;
mod driver;
pub mod error;
pub mod outcome;
pub mod signal;
mod store;
pub mod suspender;


use std::{future::Future, pin::Pin};

pub type BoxFut<'a, O> = Pin<Box<dyn Future<Output = O> + Send + 'a>>;

pub use computation::Computation;
pub use error::SuspenderError;
pub use outcome::{Interrupt, Outcome, PotentialResult};
pub use signal::Suspension;
pub use store::{OperationId, OperationState};
pub use suspender::{CacheView, PrefetchPolicy, Suspender, SuspenderBuilder, SuspenderConfig};
pub use use_suspender_core::{DeepEq, Value};
