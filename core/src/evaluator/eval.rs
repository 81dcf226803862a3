//! Core evaluation logic.

use crate::{
    ToString, Vec,
    evaluator::{
        EvalError::{self, *},
        EvaluatorOptions,
        frame::{Frame, Prompt},
        token::Token,
    },
};
use core::iter;

/// Which kind of token the top frame accepts next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// A number or `(`.
    Operand,
    /// `+`, `*`, or the closer of the top frame (`)` or `=`).
    Operator,
}

impl Expectation {
    fn prompt(self, top: &Frame) -> Prompt {
        match self {
            Expectation::Operand => Prompt::Operand,
            Expectation::Operator => top.operator_prompt(),
        }
    }
}

/// Result of feeding one token to an [`Evaluator`].
#[must_use]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// More input is needed.
    Prompt(Prompt),
    /// The top-level expression completed with this value.
    Done(i64),
    /// The token was rejected. The evaluator is finished.
    Error(EvalError),
}

impl Outcome {
    /// Whether the evaluator refuses further input after this outcome.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Prompt(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NotStarted,
    Running(Expectation),
    Finished,
}

/// Outcome of a single successful step, before lifecycle bookkeeping.
enum Step {
    Prompt(Prompt),
    Done(i64),
}

/// Evaluator that consumes one token per call and can pause between calls.
///
/// The frame stack is split into the root frame and the frames opened by
/// `(`, so there is always a top frame to fold into.
#[derive(Debug, Clone)]
pub struct Evaluator {
    options: EvaluatorOptions,
    root: Frame,
    nested: Vec<Frame>,
    state: State,
}

impl Evaluator {
    /// Create a new evaluator with the given options.
    pub fn new(options: EvaluatorOptions) -> Self {
        Self {
            options,
            root: Frame::root(),
            nested: Vec::new(),
            state: State::NotStarted,
        }
    }

    /// Begin a new expression and return the first prompt.
    ///
    /// Calling `start` again discards any paused or finished state.
    pub fn start(&mut self) -> Prompt {
        self.root = Frame::root();
        self.nested.clear();
        self.state = State::Running(Expectation::Operand);
        Prompt::Operand
    }

    /// Feed one token and advance.
    ///
    /// After [`Outcome::Done`] or [`Outcome::Error`] every further call
    /// returns [`EvalError::Finished`] until [`start`](Self::start) is
    /// called again.
    pub fn feed(&mut self, token: &str) -> Outcome {
        let expectation = match self.state {
            State::Running(expectation) => expectation,
            State::NotStarted => return Outcome::Error(NotStarted),
            State::Finished => return Outcome::Error(Finished),
        };

        let step = match expectation {
            Expectation::Operand => self.accept_operand(token),
            Expectation::Operator => self.accept_operator(token),
        };

        match step {
            Ok(Step::Prompt(prompt)) => Outcome::Prompt(prompt),
            Ok(Step::Done(value)) => {
                self.state = State::Finished;
                Outcome::Done(value)
            }
            Err(error) => {
                tracing::trace!(depth = self.depth(), %error, "token rejected");
                self.state = State::Finished;
                Outcome::Error(error)
            }
        }
    }

    fn accept_operand(&mut self, token: &str) -> Result<Step, EvalError> {
        match Token::classify(token) {
            Token::Open => {
                if let Some(max_depth) = self.options.max_depth {
                    if self.nested.len() >= max_depth {
                        return Err(NestingTooDeep { max_depth });
                    }
                }
                self.nested.push(Frame::nested());
                tracing::trace!(depth = self.depth(), "frame pushed");
                Ok(Step::Prompt(Prompt::Operand))
            }
            Token::Number(value) => {
                self.top_mut().multiply(value)?;
                self.state = State::Running(Expectation::Operator);
                Ok(Step::Prompt(self.top().operator_prompt()))
            }
            _ => Err(EvalError::invalid_operand(token)),
        }
    }

    fn accept_operator(&mut self, token: &str) -> Result<Step, EvalError> {
        match Token::classify(token) {
            Token::Plus => {
                self.top_mut().flush()?;
                self.state = State::Running(Expectation::Operand);
                Ok(Step::Prompt(Prompt::Operand))
            }
            Token::Star => {
                self.state = State::Running(Expectation::Operand);
                Ok(Step::Prompt(Prompt::Operand))
            }
            Token::Close => match self.nested.pop() {
                Some(frame) => {
                    let value = frame.value()?;
                    self.top_mut().multiply(value)?;
                    tracing::trace!(depth = self.depth(), value, "frame popped");
                    Ok(Step::Prompt(self.top().operator_prompt()))
                }
                None => Err(self.unexpected(token)),
            },
            Token::Equals if self.nested.is_empty() => Ok(Step::Done(self.root.value()?)),
            Token::Malformed => Err(EvalError::invalid_operand(token)),
            _ => Err(self.unexpected(token)),
        }
    }

    fn unexpected(&self, token: &str) -> EvalError {
        UnexpectedToken {
            token: token.to_string(),
            expected: self.top().operator_prompt(),
        }
    }

    fn top(&self) -> &Frame {
        self.nested.last().unwrap_or(&self.root)
    }

    fn top_mut(&mut self) -> &mut Frame {
        self.nested.last_mut().unwrap_or(&mut self.root)
    }

    /// Number of frames on the stack, counting the root frame.
    pub fn depth(&self) -> usize {
        1 + self.nested.len()
    }

    /// Frames from the root to the one currently consuming tokens.
    pub fn frames(&self) -> impl Iterator<Item = &Frame> + '_ {
        iter::once(&self.root).chain(self.nested.iter())
    }

    /// What the evaluator accepts next, or `None` if it is not running.
    pub fn expectation(&self) -> Option<Expectation> {
        match self.state {
            State::Running(expectation) => Some(expectation),
            State::NotStarted | State::Finished => None,
        }
    }

    /// The prompt for the next token, or `None` if it is not running.
    pub fn prompt(&self) -> Option<Prompt> {
        self.expectation()
            .map(|expectation| expectation.prompt(self.top()))
    }

    pub fn is_finished(&self) -> bool {
        self.state == State::Finished
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(EvaluatorOptions::default())
    }
}
