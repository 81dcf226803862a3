use calcnet::{EvalError, EvaluatorOptions, Server, ServerOptions, evaluate};
use clap::{Parser, Subcommand};
use miette::{Diagnostic, IntoDiagnostic, Result};
use std::time::Duration;
use thiserror::Error;

mod repl;

/// calcnet - a calculator that takes one token at a time
#[derive(Parser, Debug)]
#[command(name = "calcnet")]
#[command(about = "Serve or run the token-at-a-time calculator", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Listen for TCP clients (the default)
    Serve(ServeArgs),

    /// Drive one evaluator from this terminal
    Repl(EvaluatorArgs),

    /// Evaluate tokens given as arguments, e.g. `calcnet eval "2 * ( 3 + 4 ) ="`
    Eval {
        #[command(flatten)]
        evaluator: EvaluatorArgs,

        /// Tokens; arguments are also split on whitespace
        #[arg(required = true, allow_hyphen_values = true, allow_negative_numbers = true)]
        tokens: Vec<String>,
    },
}

#[derive(clap::Args, Debug, Default)]
struct EvaluatorArgs {
    /// Maximum number of simultaneously open parentheses
    #[arg(long)]
    max_depth: Option<usize>,
}

impl From<EvaluatorArgs> for EvaluatorOptions {
    fn from(args: EvaluatorArgs) -> Self {
        EvaluatorOptions {
            max_depth: args.max_depth,
        }
    }
}

#[derive(clap::Args, Debug)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, short, default_value_t = 8080)]
    port: u16,

    /// Close connections that send nothing for this many seconds
    #[arg(long, value_name = "SECS")]
    idle_timeout: Option<u64>,

    /// Seconds in-flight sessions may keep running after Ctrl+C
    #[arg(long, value_name = "SECS", default_value_t = 5)]
    shutdown_grace: u64,

    /// Reject input lines longer than this many bytes
    #[arg(long, value_name = "BYTES", default_value_t = calcnet::protocol::MAX_LINE_LENGTH)]
    max_line_length: usize,

    #[command(flatten)]
    evaluator: EvaluatorArgs,
}

impl Default for ServeArgs {
    fn default() -> Self {
        let defaults = ServerOptions::default();
        Self {
            host: defaults.host,
            port: defaults.port,
            idle_timeout: defaults.idle_timeout.map(|timeout| timeout.as_secs()),
            shutdown_grace: defaults.shutdown_grace.as_secs(),
            max_line_length: defaults.max_line_length,
            evaluator: EvaluatorArgs::default(),
        }
    }
}

impl From<ServeArgs> for ServerOptions {
    fn from(args: ServeArgs) -> Self {
        ServerOptions {
            host: args.host,
            port: args.port,
            idle_timeout: args.idle_timeout.map(Duration::from_secs),
            shutdown_grace: Duration::from_secs(args.shutdown_grace),
            max_line_length: args.max_line_length,
            evaluator: args.evaluator.into(),
        }
    }
}

#[derive(Debug, Error, Diagnostic)]
enum CliError {
    #[error(transparent)]
    #[diagnostic(
        code(calcnet::eval),
        help("tokens are integers, '(', ')', '+', '*', and a final '='")
    )]
    Eval(#[from] EvalError),
}

/// Split every argument on whitespace so both `eval 2 + 3 =` and
/// `eval "2 + 3 ="` work.
fn split_tokens(args: &[String]) -> impl Iterator<Item = &str> {
    args.iter().flat_map(|arg| arg.split_whitespace())
}

fn eval(tokens: &[String], options: EvaluatorOptions) -> Result<()> {
    let value = evaluate(split_tokens(tokens), options).map_err(CliError::from)?;
    println!("{value}");
    Ok(())
}

async fn serve(options: ServerOptions) -> Result<()> {
    let server = Server::bind(options).await?;
    server.run_until(shutdown_signal()).await;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::error!(%error, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!(%error, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown requested");
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging subscriber
    use tracing_subscriber::{EnvFilter, fmt};

    // Use RUST_LOG environment variable to control log level
    // Default to INFO if not set
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match args.command.unwrap_or_else(|| Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => {
            let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
            runtime.block_on(serve(args.into()))
        }
        Command::Repl(args) => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            repl::run(args.into(), stdin.lock(), stdout.lock()).into_diagnostic()?;
            Ok(())
        }
        Command::Eval { evaluator, tokens } => eval(&tokens, evaluator.into()),
    }
}
