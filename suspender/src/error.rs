use miette::Diagnostic;
use thiserror::Error;

/// Errors raised while constructing a [`Suspender`](crate::Suspender).
///
/// Failures of the wrapped computation are never converted into this type; they are
/// handed back untouched through [`Outcome::Rejected`](crate::Outcome::Rejected).
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum SuspenderError {
    #[error("Suspender implementation must be a function.")]
    #[diagnostic(
        code(use_suspender::not_callable),
        help("Pass a closure to `SuspenderBuilder::implementation` before calling `build`")
    )]
    NotCallable,
}
