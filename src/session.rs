//! One client connection driving one evaluator.
//!
//! A session writes the first prompt as soon as it starts, then repeats
//! read-line, feed, write-reply until the expression completes, a token is
//! rejected, or the peer goes away. Nothing is shared between sessions.

use crate::{
    options::SessionOptions,
    protocol::{self, Reply},
};
use calcnet_core::{EvalError, Evaluator, Outcome};
use std::io;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader,
};

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Created; the first prompt has not been written yet.
    AwaitingGreeting,
    /// Waiting for the next line from the peer.
    AwaitingLine,
    /// The result was sent and the connection closed.
    Completed,
    /// A token or line was rejected, `invalid value` was sent and the
    /// connection closed.
    Errored,
    /// Torn down without a final message: peer disconnect or idle timeout.
    Closed,
}

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Completed(i64),
    Rejected(EvalError),
    /// A line exceeded `limit` bytes before its terminator.
    LineTooLong { limit: usize },
    Disconnected,
    IdleTimeout,
}

/// What one read from the peer produced.
enum Incoming {
    Line,
    TooLong,
    Closed,
    Idle,
}

/// A connection paired with the evaluator it exclusively owns.
pub struct Session<S> {
    stream: BufReader<S>,
    peer: String,
    evaluator: Evaluator,
    options: SessionOptions,
    state: SessionState,
}

impl<S> Session<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, peer: impl Into<String>, options: SessionOptions) -> Self {
        Self {
            stream: BufReader::new(stream),
            peer: peer.into(),
            evaluator: Evaluator::new(options.evaluator),
            options,
            state: SessionState::AwaitingGreeting,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Drive the session until it completes, is rejected, or the peer leaves.
    #[tracing::instrument(name = "session", skip(self), fields(peer = %self.peer))]
    pub async fn run(&mut self) -> SessionEnd {
        tracing::info!("connection opened");

        let prompt = self.evaluator.start();
        if self.send(Reply::Prompt(prompt)).await.is_err() {
            return self.disconnected();
        }
        self.state = SessionState::AwaitingLine;

        let mut line = Vec::new();
        loop {
            line.clear();
            match self.read_line(&mut line).await {
                Ok(Incoming::Line) => {}
                Ok(Incoming::TooLong) => return self.line_too_long().await,
                Ok(Incoming::Closed) => return self.disconnected(),
                Ok(Incoming::Idle) => return self.idle_timeout().await,
                Err(error) => {
                    tracing::debug!(%error, "read failed");
                    return self.disconnected();
                }
            }

            let token = match protocol::decode_line(&line) {
                Ok(token) => token,
                Err(error) => {
                    tracing::info!(%error, "undecodable input dropped");
                    continue;
                }
            };

            let outcome = self.evaluator.feed(token);
            tracing::debug!(token, ?outcome, depth = self.evaluator.depth(), "token fed");

            let reply = Reply::from(&outcome);
            let sent = self.send(reply).await;
            if reply.closes_connection() {
                self.close().await;
            }

            match outcome {
                Outcome::Prompt(_) => {
                    if sent.is_err() {
                        return self.disconnected();
                    }
                }
                Outcome::Done(value) => {
                    tracing::info!(value, "sent result");
                    self.state = SessionState::Completed;
                    return SessionEnd::Completed(value);
                }
                Outcome::Error(error) => {
                    tracing::warn!(%error, "invalid input");
                    self.state = SessionState::Errored;
                    return SessionEnd::Rejected(error);
                }
            }
        }
    }

    /// Read one line into `line`, terminator included, reading at most
    /// `max_line_length` bytes.
    async fn read_line(&mut self, line: &mut Vec<u8>) -> io::Result<Incoming> {
        // A zero limit could never see the terminator
        let limit = self.options.max_line_length.max(1);
        let mut limited = (&mut self.stream).take(limit as u64);
        let read = limited.read_until(b'\n', line);
        let read = match self.options.idle_timeout {
            Some(idle) => match tokio::time::timeout(idle, read).await {
                Ok(result) => result?,
                Err(_) => return Ok(Incoming::Idle),
            },
            None => read.await?,
        };

        Ok(if read == 0 {
            Incoming::Closed
        } else if read == limit && line.last() != Some(&b'\n') {
            Incoming::TooLong
        } else {
            Incoming::Line
        })
    }

    /// Write a reply. Failures mean the peer is gone; they are logged and
    /// returned so the caller can stop, never propagated further.
    async fn send(&mut self, reply: Reply) -> io::Result<()> {
        let result = self.write_reply(reply).await;
        if let Err(error) = &result {
            tracing::debug!(%error, "write failed");
        }
        result
    }

    async fn write_reply(&mut self, reply: Reply) -> io::Result<()> {
        self.stream.write_all(reply.to_string().as_bytes()).await?;
        self.stream.flush().await
    }

    async fn close(&mut self) {
        if let Err(error) = self.stream.shutdown().await {
            tracing::debug!(%error, "shutdown failed");
        }
    }

    fn disconnected(&mut self) -> SessionEnd {
        tracing::warn!("connection closed by peer");
        if let Some(awaiting) = self.evaluator.prompt() {
            tracing::debug!(
                depth = self.evaluator.depth(),
                %awaiting,
                "partial expression discarded"
            );
        }
        self.state = SessionState::Closed;
        SessionEnd::Disconnected
    }

    async fn line_too_long(&mut self) -> SessionEnd {
        let limit = self.options.max_line_length;
        tracing::warn!(limit, "input line too long");
        let _ = self.send(Reply::InvalidValue).await;
        self.close().await;
        self.state = SessionState::Errored;
        SessionEnd::LineTooLong { limit }
    }

    async fn idle_timeout(&mut self) -> SessionEnd {
        tracing::info!("closing idle connection");
        self.close().await;
        self.state = SessionState::Closed;
        SessionEnd::IdleTimeout
    }
}
