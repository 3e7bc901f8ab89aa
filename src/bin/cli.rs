//! respipe CLI Client
//!
//! Pipelines commands to a RESP server and prints every reply in order.

use std::io::{self, BufRead, Write};
use std::process;

use clap::Parser;
use respipe::{Command, Pipeline, PipelineConfig, TcpTransport};
use tracing_subscriber::{fmt, EnvFilter};

/// respipe CLI
#[derive(Parser, Debug)]
#[command(name = "respipe-cli")]
#[command(about = "Pipelined command-line client for RESP servers")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    /// ACL user name for AUTH
    #[arg(short, long)]
    username: Option<String>,

    /// Password for AUTH
    #[arg(short = 'a', long)]
    password: Option<String>,

    /// Maximum commands in flight
    #[arg(short, long, default_value = "10")]
    pipeline: usize,

    /// Reply timeout in milliseconds (0 waits forever)
    #[arg(short, long, default_value = "60000")]
    timeout_ms: u64,

    /// Send the command this many times
    #[arg(short, long, default_value = "1")]
    repeat: usize,

    /// Command and arguments; read one command per line from stdin when omitted
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() {
    // Logs go to stderr so replies on stdout stay clean
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        eprintln!("respipe-cli: {}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> respipe::Result<()> {
    let mut builder = PipelineConfig::builder()
        .addr(&args.server)
        .pipeline_capacity(args.pipeline)
        .read_timeout_ms(args.timeout_ms);
    if let Some(username) = args.username {
        builder = builder.username(username);
    }
    if let Some(password) = args.password {
        builder = builder.password(password);
    }

    let mut pipeline = Pipeline::connect(builder.build())?;
    tracing::info!("respipe-cli v{} connected to {}", respipe::VERSION, args.server);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if args.command.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line?;
            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }
            pipeline.submit_args(words)?;
            print_ready(&mut pipeline, &mut out)?;
        }
    } else {
        let command = Command::from_args(&args.command);
        for _ in 0..args.repeat {
            pipeline.submit(&command)?;
            print_ready(&mut pipeline, &mut out)?;
        }
    }

    for reply in pipeline.flush_pipeline()? {
        writeln!(out, "{}", reply)?;
    }
    out.flush()?;
    pipeline.close()
}

/// Print replies that already arrived, without waiting
fn print_ready(pipeline: &mut Pipeline<TcpTransport>, out: &mut impl Write) -> respipe::Result<()> {
    while let Some(reply) = pipeline.get_response(false)? {
        writeln!(out, "{}", reply)?;
    }
    Ok(())
}
