//! Resumable evaluator for token-at-a-time arithmetic.
//!
//! The evaluator accepts the grammar
//!
//! ```text
//! expr := term (('+' term) | ('*' term))* ('=' | ')')
//! term := NUMBER | '(' expr ')'
//! ```
//!
//! one token per call and pauses between calls. Nested sub-expressions are
//! tracked on an explicit stack of [`Frame`]s, so the evaluator can be
//! suspended at any depth and resumed later, e.g. after a network round trip.
//!
//! ## Design Principles
//!
//! - **Never panic**: Every token, well-formed or not, produces an [`Outcome`]
//! - **Stack-safe**: Nesting lives on the heap, not the call stack
//! - **Left fold**: `*` multiplies into a running product, `+` flushes the
//!   product into a running sum; there is no precedence table
//!
//! ## Example
//!
//! ```
//! use calcnet_core::evaluator::{Evaluator, EvaluatorOptions, Outcome, Prompt};
//!
//! let mut evaluator = Evaluator::new(EvaluatorOptions::default());
//! assert_eq!(evaluator.start(), Prompt::Operand);
//!
//! assert_eq!(evaluator.feed("2"), Outcome::Prompt(Prompt::RootOperator));
//! assert_eq!(evaluator.feed("*"), Outcome::Prompt(Prompt::Operand));
//! assert_eq!(evaluator.feed("3"), Outcome::Prompt(Prompt::RootOperator));
//! assert_eq!(evaluator.feed("="), Outcome::Done(6));
//! ```

mod error;
mod eval;
mod frame;
mod token;


pub use error::{EvalError, MAX_TOKEN_EXCERPT};
pub use eval::{Evaluator, Expectation, Outcome};
pub use frame::{Frame, Prompt};
pub use token::Token;

/// Configuration options for an [`Evaluator`].
///
/// # Example
///
/// ```
/// use calcnet_core::evaluator::EvaluatorOptions;
///
/// let options = EvaluatorOptions {
///     max_depth: Some(64),
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvaluatorOptions {
    /// Maximum number of simultaneously open parentheses.
    ///
    /// `None` allows arbitrary nesting, bounded only by memory.
    ///
    /// Default: None
    pub max_depth: Option<usize>,
}

impl Default for EvaluatorOptions {
    fn default() -> Self {
        Self { max_depth: None }
    }
}

/// Run a complete token sequence through a fresh evaluator.
///
/// Tokens after the one that completes the expression are not consumed.
///
/// ## Returns
///
/// The value of the expression, the error that rejected a token, or
/// [`EvalError::Incomplete`] if the tokens ran out first.
///
/// ## Example
///
/// ```
/// use calcnet_core::evaluator::{evaluate, EvaluatorOptions};
///
/// let tokens = ["2", "*", "(", "3", "+", "4", ")", "="];
/// assert_eq!(evaluate(tokens, EvaluatorOptions::default()), Ok(14));
/// ```
pub fn evaluate<I, S>(tokens: I, options: EvaluatorOptions) -> Result<i64, EvalError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut evaluator = Evaluator::new(options);
    let mut prompt = evaluator.start();

    for token in tokens {
        match evaluator.feed(token.as_ref()) {
            Outcome::Prompt(next) => prompt = next,
            Outcome::Done(value) => return Ok(value),
            Outcome::Error(error) => return Err(error),
        }
    }

    Err(EvalError::Incomplete { prompt })
}
