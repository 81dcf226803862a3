#![allow(dead_code)]

use calcnet::{
    EvaluatorOptions, Server, ServerOptions, Session, SessionEnd, SessionOptions, evaluate,
};
use std::net::SocketAddr;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt, BufReader},
    net::TcpStream,
    sync::oneshot,
    task::JoinHandle,
};

/// Define a test that checks one token sequence both against the evaluator
/// directly and through a full session transcript.
#[macro_export]
macro_rules! test_case {
    (
        name: $name:ident,
        input: [$($token:expr),* $(,)?],
        result: $expected:expr $(,)?
    ) => {
        #[tokio::test]
        async fn $name() {
            let tokens: &[&str] = &[$($token),*];
            let expected: Result<i64, calcnet::EvalError> = $expected;
            cases::check_expression(tokens, expected).await;
        }
    };
}

pub async fn check_expression(tokens: &[&str], expected: Result<i64, calcnet::EvalError>) {
    let direct = evaluate(tokens.iter().copied(), EvaluatorOptions::default());
    pretty_assertions::assert_eq!(direct, expected, "evaluate({tokens:?})");

    let (output, end) = converse(tokens, SessionOptions::default()).await;
    let last_line = output.lines().last().unwrap_or_default().to_string();
    match expected {
        Ok(value) => {
            pretty_assertions::assert_eq!(last_line, format!("result: {value}"));
            pretty_assertions::assert_eq!(end, SessionEnd::Completed(value));
        }
        Err(error) if error.is_input_error() => {
            pretty_assertions::assert_eq!(last_line, "invalid value");
            pretty_assertions::assert_eq!(end, SessionEnd::Rejected(error));
        }
        Err(_) => {
            // Ran out of input: the peer hangs up after the last prompt.
            assert!(output.ends_with("\n> "), "unexpected output {output:?}");
            pretty_assertions::assert_eq!(end, SessionEnd::Disconnected);
        }
    }
}

/// Run a session over an in-memory stream, sending each token as a line and
/// then hanging up. Returns everything the server wrote and how the session
/// ended.
pub async fn converse(lines: &[&str], options: SessionOptions) -> (String, SessionEnd) {
    let mut input = Vec::new();
    for line in lines {
        input.extend_from_slice(line.as_bytes());
        input.push(b'\n');
    }
    converse_raw(&input, options).await
}

/// Like [`converse`], but sends `input` verbatim.
pub async fn converse_raw(input: &[u8], options: SessionOptions) -> (String, SessionEnd) {
    let (mut client, server) = tokio::io::duplex(64 * 1024);
    let session = tokio::spawn(async move {
        let mut session = Session::new(server, "test-peer", options);
        session.run().await
    });

    client.write_all(input).await.expect("write input");
    client.shutdown().await.expect("close input");

    let mut output = String::new();
    client
        .read_to_string(&mut output)
        .await
        .expect("read output");

    let end = session.await.expect("session task");
    (output, end)
}

/// A server on an ephemeral localhost port, stopped through a oneshot.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(options: ServerOptions) -> Self {
        let server = Server::bind(ServerOptions {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..options
        })
        .await
        .expect("bind test server");
        let addr = server.local_addr().expect("local address");

        let (shutdown, signal) = oneshot::channel::<()>();
        let handle = tokio::spawn(server.run_until(async {
            let _ = signal.await;
        }));

        Self {
            addr,
            shutdown,
            handle,
        }
    }

    /// Request shutdown without waiting for the server to stop.
    pub fn request_stop(self) -> JoinHandle<()> {
        let _ = self.shutdown.send(());
        self.handle
    }

    pub async fn stop(self) {
        self.request_stop().await.expect("server task");
    }
}

/// A line-oriented TCP client.
pub struct Client {
    stream: BufReader<TcpStream>,
}

impl Client {
    pub async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        Self {
            stream: BufReader::new(stream),
        }
    }

    pub async fn send(&mut self, line: &str) {
        self.stream
            .write_all(format!("{line}\n").as_bytes())
            .await
            .expect("send line");
    }

    pub async fn send_raw(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.expect("send bytes");
    }

    /// Read exactly `expected.len()` bytes and compare.
    pub async fn expect(&mut self, expected: &str) {
        let mut buf = vec![0; expected.len()];
        self.stream
            .read_exact(&mut buf)
            .await
            .unwrap_or_else(|e| panic!("reading {expected:?}: {e}"));
        pretty_assertions::assert_eq!(String::from_utf8_lossy(&buf), expected);
    }

    /// Check that the server closed the connection with nothing more to say.
    pub async fn expect_closed(&mut self) {
        let mut rest = Vec::new();
        self.stream
            .read_to_end(&mut rest)
            .await
            .expect("read until close");
        pretty_assertions::assert_eq!(String::from_utf8_lossy(&rest), "");
    }
}

/// Initialize tracing subscriber for tests with DEBUG level
pub fn init_test_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    // Try to initialize, ignore error if already initialized
    let _ = fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}
