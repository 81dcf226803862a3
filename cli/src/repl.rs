//! Local console front-end: one evaluator driven from stdin.

use calcnet::{EvalError, Evaluator, EvaluatorOptions, Outcome, protocol};
use std::io::{self, BufRead, Write};

/// How a console run ended.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplEnd {
    Result(i64),
    Invalid(EvalError),
    EndOfInput,
}

/// Prompt for tokens on `output` and read them from `input` until the
/// expression completes, a token is rejected, or input runs out.
pub fn run<R, W>(options: EvaluatorOptions, mut input: R, mut output: W) -> io::Result<ReplEnd>
where
    R: BufRead,
    W: Write,
{
    writeln!(output, "Welcome to the Calculator")?;

    let mut evaluator = Evaluator::new(options);
    let mut prompt = evaluator.start();
    let mut line = Vec::new();

    loop {
        write!(output, "enter {prompt}: ")?;
        output.flush()?;

        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            writeln!(output)?;
            return Ok(ReplEnd::EndOfInput);
        }

        let token = match protocol::decode_line(&line) {
            Ok(token) => token,
            Err(error) => {
                tracing::info!(%error, "undecodable input dropped");
                continue;
            }
        };

        match evaluator.feed(token) {
            Outcome::Prompt(next) => prompt = next,
            Outcome::Done(value) => {
                writeln!(output, "result: {value}")?;
                return Ok(ReplEnd::Result(value));
            }
            Outcome::Error(error) => {
                writeln!(output, "invalid value: {error}")?;
                return Ok(ReplEnd::Invalid(error));
            }
        }
    }
}
