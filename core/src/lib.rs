#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

extern crate alloc;

// Re-export for convenience so other modules don't need alloc:: prefix
#[allow(unused_imports)]
pub(crate) use alloc::{string::String, string::ToString, vec::Vec};

pub mod evaluator;

pub use evaluator::{EvalError, Evaluator, EvaluatorOptions, Outcome, Prompt};
