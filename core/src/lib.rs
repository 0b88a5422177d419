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

//! Value-level building blocks for `use-suspender`: structural equality over
//! argument lists and a dynamic value type for heterogeneous arguments.

pub mod equality;
pub mod value;

pub use equality::{deep_eq_slices, DeepEq};
pub use value::Value;
