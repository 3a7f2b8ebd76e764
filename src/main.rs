//! `vidmux` command-line entry point

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use vidmux::client::{ApiClient, BatchSession, Phase, build_sink};
use vidmux::config::SinkKind;
use vidmux::{Config, Result, telemetry};

#[derive(Parser)]
#[command(name = "vidmux", version, about = "Fetch, merge and serve social-media videos")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true, env = "VIDMUX_CONFIG")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Download one or more videos through a running server
    Fetch(FetchArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "VIDMUX_BIND")]
    bind: Option<SocketAddr>,
    /// Directory for temporaries and finished files
    #[arg(long, env = "VIDMUX_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,
}

#[derive(Args)]
struct FetchArgs {
    /// Base URL of the server
    #[arg(long, env = "VIDMUX_SERVER")]
    server: Option<String>,
    /// Where saved videos go
    #[arg(long, value_enum)]
    sink: Option<SinkArg>,
    /// App-local storage for the library and share sinks
    #[arg(long)]
    storage_dir: Option<PathBuf>,
    /// Video URLs, one batch input each
    #[arg(required = true)]
    urls: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum SinkArg {
    Browser,
    Library,
    Share,
}

impl From<SinkArg> for SinkKind {
    fn from(value: SinkArg) -> Self {
        match value {
            SinkArg::Browser => SinkKind::Browser,
            SinkArg::Library => SinkKind::Library,
            SinkArg::Share => SinkKind::Share,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is normal
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Serve(args) => {
            if let Some(bind) = args.bind {
                config.server.bind_address = bind;
            }
            if let Some(dir) = args.output_dir {
                config.download.output_dir = dir;
            }
            config.validate()?;
            telemetry::init_logging(&config.logging)?;

            vidmux::run_with_shutdown(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Fetch(args) => {
            // The error log belongs to the server
            config.logging.error_log = None;
            telemetry::init_logging(&config.logging)?;
            fetch(config, args).await
        }
    }
}

async fn fetch(mut config: Config, args: FetchArgs) -> Result<ExitCode> {
    if let Some(server) = args.server {
        config.client.server_url = server;
    }
    if let Some(sink) = args.sink {
        config.client.sink = sink.into();
    }
    if let Some(dir) = args.storage_dir {
        config.client.storage_dir = Some(dir);
    }

    let client = ApiClient::new(&config.client.server_url)?;
    let session = BatchSession::new(client, build_sink(&config.client)?);

    for (index, url) in args.urls.iter().enumerate() {
        if index > 0 {
            session.add_input().await?;
        }
        session.set_input(index, url.as_str()).await?;
    }

    let report = session.submit().await?;

    let mut saved = report.saved;
    saved.sort_by_key(|(index, _)| *index);
    for (index, media) in &saved {
        println!("[{}] saved {}", index + 1, media.path.display());
    }
    let mut errors = report.errors;
    errors.sort_by_key(|e| e.index);
    for error in &errors {
        eprintln!("[{}] {}", error.index + 1, error.message);
    }
    if let Some(banner) = session.snapshot().await.banner {
        eprintln!("{banner}");
    }

    Ok(match report.phase {
        Phase::Success | Phase::Idle => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}
