//! TCP front-end: one task, one session, one evaluator per connection.

use crate::{
    error::ServerError,
    options::{ServerOptions, SessionOptions},
    session::{Session, SessionEnd},
};
use std::{future::Future, net::SocketAddr, time::Duration};
use tokio::{
    net::{TcpListener, TcpStream},
    task::JoinSet,
};

/// A bound listener that serves calculator sessions.
pub struct Server {
    listener: TcpListener,
    options: ServerOptions,
}

impl Server {
    /// Bind the listening socket described by `options`.
    pub async fn bind(options: ServerOptions) -> Result<Self, ServerError> {
        let listener = TcpListener::bind((options.host.as_str(), options.port))
            .await
            .map_err(|source| ServerError::Bind {
                addr: format!("{}:{}", options.host, options.port),
                source,
            })?;
        Ok(Self { listener, options })
    }

    /// The address the server is listening on, with the actual port if
    /// port `0` was requested.
    pub fn local_addr(&self) -> Result<SocketAddr, ServerError> {
        self.listener.local_addr().map_err(ServerError::LocalAddr)
    }

    /// Serve connections forever.
    pub async fn run(self) {
        self.run_until(std::future::pending()).await
    }

    /// Serve connections until `shutdown` resolves.
    ///
    /// The listener is closed as soon as shutdown is requested. Sessions
    /// already in progress get [`ServerOptions::shutdown_grace`] to finish
    /// on their own and are aborted after that.
    pub async fn run_until<F>(self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let Server { listener, options } = self;
        let session_options = options.session_options();
        let mut sessions = JoinSet::new();
        tokio::pin!(shutdown);

        match listener.local_addr() {
            Ok(addr) => tracing::info!(%addr, "listening"),
            Err(error) => tracing::warn!(%error, "listening on unknown address"),
        }

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                accepted = listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        sessions.spawn(serve(stream, peer, session_options));
                    }
                    Err(error) => {
                        tracing::warn!(%error, "failed to accept connection");
                        // Persistent errors such as EMFILE would otherwise spin.
                        tokio::time::sleep(Duration::from_millis(100)).await;
                    }
                },
                Some(joined) = sessions.join_next(), if !sessions.is_empty() => {
                    if let Err(error) = joined {
                        tracing::error!(%error, "session task failed");
                    }
                }
            }
        }

        drop(listener);
        tracing::info!(sessions = sessions.len(), "shutting down");
        drain(sessions, options.shutdown_grace).await;
    }
}

async fn serve(stream: TcpStream, peer: SocketAddr, options: SessionOptions) -> SessionEnd {
    let mut session = Session::new(stream, peer.to_string(), options);
    session.run().await
}

/// Wait up to `grace` for sessions to end on their own, then abort the rest.
async fn drain(mut sessions: JoinSet<SessionEnd>, grace: Duration) {
    if sessions.is_empty() {
        return;
    }

    let finished = tokio::time::timeout(grace, async {
        while sessions.join_next().await.is_some() {}
    })
    .await;

    if finished.is_err() {
        tracing::warn!(
            sessions = sessions.len(),
            "aborting sessions still running after the grace period"
        );
        sessions.shutdown().await;
    }
}

/// Listen on `host:port` and serve sessions until the process is stopped.
///
/// Only returns if the listener cannot be bound.
pub async fn run(host: &str, port: u16) -> Result<(), ServerError> {
    let options = ServerOptions {
        host: host.to_string(),
        port,
        ..ServerOptions::default()
    };
    Server::bind(options).await?.run().await;
    Ok(())
}
