//! Evaluation errors.
//!
//! Every error is terminal for the evaluator that produced it: the
//! protocol has no notion of resynchronising after a bad token.
//!
//! # Error Categories
//!
//! - **Input errors**: the peer sent a token the grammar does not allow
//!   (`InvalidOperand`, `UnexpectedToken`), opened too many parentheses
//!   (`NestingTooDeep`), or built a value that does not fit in an `i64`
//!   (`Overflow`).
//!
//! - **Usage errors**: the caller drove the evaluator out of order
//!   (`NotStarted`, `Finished`) or ran out of tokens (`Incomplete`).

use crate::{String, ToString};
use crate::evaluator::Prompt;
use thiserror::Error;

/// Longest prefix of a rejected token, in characters, kept in an error.
pub const MAX_TOKEN_EXCERPT: usize = 32;

/// Error produced when a token cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    /// A number or `(` was expected, or the token is neither a symbol nor
    /// an integer literal.
    #[error("invalid operand {token:?}: expected a number or '('")]
    InvalidOperand { token: String },

    /// A well-formed token arrived where the grammar does not allow it.
    #[error("unexpected token {token:?}: expected {expected}")]
    UnexpectedToken { token: String, expected: Prompt },

    /// Opening another parenthesis would exceed the configured limit.
    #[error("nesting exceeds the maximum depth of {max_depth}")]
    NestingTooDeep { max_depth: usize },

    /// A sum or product left the range of `i64`.
    #[error("arithmetic overflow: value does not fit in a 64-bit integer")]
    Overflow,

    /// `feed` was called before `start`.
    #[error("evaluator has not been started")]
    NotStarted,

    /// `feed` was called after a result or an error was returned.
    #[error("evaluator has already finished")]
    Finished,

    /// The input ended while the evaluator was still waiting for a token.
    #[error("input ended while waiting for {prompt}")]
    Incomplete { prompt: Prompt },
}

impl EvalError {
    /// Whether the error was caused by the token itself, as opposed to the
    /// caller driving the evaluator out of order.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            EvalError::InvalidOperand { .. }
                | EvalError::UnexpectedToken { .. }
                | EvalError::NestingTooDeep { .. }
                | EvalError::Overflow
        )
    }

    pub(crate) fn invalid_operand(token: &str) -> Self {
        EvalError::InvalidOperand {
            token: excerpt(token),
        }
    }
}

/// `token`, cut to [`MAX_TOKEN_EXCERPT`] characters with a trailing `...`.
fn excerpt(token: &str) -> String {
    match token.char_indices().nth(MAX_TOKEN_EXCERPT) {
        Some((end, _)) => {
            let mut excerpt = token[..end].to_string();
            excerpt.push_str("...");
            excerpt
        }
        None => token.to_string(),
    }
}
