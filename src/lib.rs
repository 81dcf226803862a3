//! calcnet - a resumable calculator served over TCP
//!
//! # Overview
//!
//! Each client drives its own evaluator one token at a time. The evaluator
//! pauses after every token, waits for the next line from the network, and
//! resumes exactly where it stopped, even deep inside parentheses.
//!
//! ```text
//! $ telnet localhost 8080
//! number or (
//! > 2
//! + or * or =
//! > *
//! number or (
//! > (
//! number or (
//! > 3
//! + or * or )
//! > +
//! number or (
//! > 4
//! + or * or )
//! > )
//! + or * or =
//! > =
//! result: 14
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use calcnet::{Server, ServerOptions};
//!
//! # async fn example() -> Result<(), calcnet::ServerError> {
//! let server = Server::bind(ServerOptions {
//!     host: "127.0.0.1".to_string(),
//!     port: 8080,
//!     ..ServerOptions::default()
//! })
//! .await?;
//!
//! server.run_until(async {
//!     let _ = tokio::signal::ctrl_c().await;
//! })
//! .await;
//! # Ok(())
//! # }
//! ```
//!
//! The evaluator itself lives in `calcnet-core` and is re-exported here for
//! callers that want to drive it without a network.

pub mod error;
pub mod options;
pub mod protocol;
pub mod server;
pub mod session;

// Re-export the evaluator from calcnet_core
pub use calcnet_core::evaluator::{
    self, EvalError, Evaluator, EvaluatorOptions, Outcome, Prompt, evaluate,
};

pub use error::ServerError;
pub use options::{ServerOptions, SessionOptions};
pub use server::{Server, run};
pub use session::{Session, SessionEnd, SessionState};
