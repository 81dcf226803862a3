//! Frames of the evaluation stack and the prompts derived from them.

use crate::evaluator::EvalError;
use core::fmt;

/// One activation of the `expr` rule.
///
/// A frame folds its terms left to right: numbers and closed
/// sub-expressions multiply into `pending_product`, and `+` moves the
/// product into `accumulated_sum`. Every intermediate value must fit in an
/// `i64`; anything larger is [`EvalError::Overflow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub accumulated_sum: i64,
    pub pending_product: i64,
    /// Entered through `(`, so it closes on `)` instead of `=`.
    pub is_nested: bool,
}

impl Frame {
    pub(crate) fn root() -> Self {
        Self {
            accumulated_sum: 0,
            pending_product: 1,
            is_nested: false,
        }
    }

    pub(crate) fn nested() -> Self {
        Self {
            is_nested: true,
            ..Self::root()
        }
    }

    pub(crate) fn multiply(&mut self, factor: i64) -> Result<(), EvalError> {
        self.pending_product = self
            .pending_product
            .checked_mul(factor)
            .ok_or(EvalError::Overflow)?;
        Ok(())
    }

    pub(crate) fn flush(&mut self) -> Result<(), EvalError> {
        self.accumulated_sum = self.value()?;
        self.pending_product = 1;
        Ok(())
    }

    /// The value this frame would produce if it were closed now.
    pub fn value(&self) -> Result<i64, EvalError> {
        self.accumulated_sum
            .checked_add(self.pending_product)
            .ok_or(EvalError::Overflow)
    }

    /// Prompt shown once this frame has a complete term and needs an operator.
    pub fn operator_prompt(&self) -> Prompt {
        if self.is_nested {
            Prompt::NestedOperator
        } else {
            Prompt::RootOperator
        }
    }
}

/// What the evaluator asks for next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prompt {
    /// A number or `(`.
    Operand,
    /// `+`, `*` or `)` inside parentheses.
    NestedOperator,
    /// `+`, `*` or `=` at the top level.
    RootOperator,
}

impl Prompt {
    pub const fn as_str(self) -> &'static str {
        match self {
            Prompt::Operand => "number or (",
            Prompt::NestedOperator => "+ or * or )",
            Prompt::RootOperator => "+ or * or =",
        }
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
