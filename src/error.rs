//! Errors surfaced by the server.
//!
//! Per-connection problems never show up here: sessions recover from
//! undecodable lines, report bad tokens to the peer, and treat transport
//! failures as a disconnect.

use miette::Diagnostic;
use std::io;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ServerError {
    #[error("failed to listen on {addr}")]
    #[diagnostic(
        code(calcnet::bind),
        help("check that the host is a local address and that the port is free")
    )]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    #[error("failed to read the listening address")]
    #[diagnostic(code(calcnet::local_addr))]
    LocalAddr(#[source] io::Error),
}
