//! Configuration options for the server and its sessions.

use crate::protocol::MAX_LINE_LENGTH;
use calcnet_core::EvaluatorOptions;
use std::time::Duration;

/// Configuration options for a [`Server`](crate::Server).
///
/// # Example
///
/// ```
/// use calcnet::ServerOptions;
/// use std::time::Duration;
///
/// let options = ServerOptions {
///     host: "127.0.0.1".to_string(),
///     port: 0,
///     idle_timeout: Some(Duration::from_secs(300)),
///     ..ServerOptions::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ServerOptions {
    /// Host name or address to listen on.
    ///
    /// Default: "0.0.0.0"
    pub host: String,

    /// Port to listen on; `0` picks a free port.
    ///
    /// Default: 8080
    pub port: u16,

    /// Close a session that waits longer than this for its next line.
    ///
    /// Default: None
    pub idle_timeout: Option<Duration>,

    /// How long in-flight sessions may keep running after shutdown is
    /// requested before they are aborted.
    ///
    /// Default: 5 seconds
    pub shutdown_grace: Duration,

    /// Longest input line a session accepts, terminator included. A longer
    /// line is answered with `invalid value` and the connection is closed.
    ///
    /// Default: 64 KiB
    pub max_line_length: usize,

    /// Options for the evaluator owned by each session.
    pub evaluator: EvaluatorOptions,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            idle_timeout: None,
            shutdown_grace: Duration::from_secs(5),
            max_line_length: MAX_LINE_LENGTH,
            evaluator: EvaluatorOptions::default(),
        }
    }
}

impl ServerOptions {
    /// Options handed to every session this server accepts.
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            idle_timeout: self.idle_timeout,
            max_line_length: self.max_line_length,
            evaluator: self.evaluator,
        }
    }
}

/// Configuration options for a single [`Session`](crate::Session).
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    /// Close the session if no line arrives within this duration.
    pub idle_timeout: Option<Duration>,

    /// Longest input line accepted, terminator included.
    pub max_line_length: usize,

    pub evaluator: EvaluatorOptions,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            idle_timeout: None,
            max_line_length: MAX_LINE_LENGTH,
            evaluator: EvaluatorOptions::default(),
        }
    }
}
