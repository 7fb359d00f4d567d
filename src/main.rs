//! mindmap-converter-mcp: MCP server that turns markdown into mind maps
//!
//! Exposes the `markmap` CLI to AI assistants as two MCP tools over stdio.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use mindmap_converter_mcp::config::{self, Config};
use mindmap_converter_mcp::convert::{Converter, MarkmapEngine};
use mindmap_converter_mcp::mcp::{Dispatcher, McpServer, OutputSettings};

/// MCP server that converts markdown into interactive mind maps.
///
/// Rendering is done by the `markmap` CLI, which must be installed
/// (`npm install -g markmap-cli`) or configured via `--engine`.
#[derive(Parser, Debug)]
#[command(name = "mindmap-converter-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// Directory the file tool writes mind maps into
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Host-side path of the output directory, shown to users
    #[arg(long, value_name = "DIR")]
    host_output_dir: Option<PathBuf>,

    /// Rendering engine executable
    #[arg(long, value_name = "PROGRAM")]
    engine: Option<String>,

    /// Seconds to wait for the rendering engine before killing it
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: Option<u64>,

    /// Increase logging verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Decrease logging verbosity (only show errors)
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    /// Applies command-line overrides on top of the loaded configuration.
    fn apply_to(&self, cfg: &mut Config) {
        if let Some(dir) = &self.output_dir {
            cfg.output.dir.clone_from(dir);
        }
        if let Some(dir) = &self.host_output_dir {
            cfg.output.host_dir = Some(dir.clone());
        }
        if let Some(engine) = &self.engine {
            cfg.engine.command.clone_from(engine);
        }
        if let Some(secs) = self.timeout_secs {
            cfg.engine.timeout_secs = Some(secs);
        }
    }
}

/// Determines the log level from CLI arguments.
#[allow(clippy::match_same_arms)] // Explicit "warn" arm for clarity
fn get_log_level(verbose: u8, quiet: bool, config_level: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }

    match verbose {
        0 => match config_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::WARN,
        },
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Initialises the tracing subscriber. Logs go to stderr; stdout carries MCP.
fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the one server instance this process runs.
fn build_server(cfg: &Config) -> McpServer<MarkmapEngine> {
    let converter = Converter::new(MarkmapEngine::from_config(&cfg.engine))
        .with_workspace_root(cfg.workspace_dir.clone());
    McpServer::new(Dispatcher::new(
        converter,
        OutputSettings::from_config(&cfg.output),
    ))
}

/// Entry point for the mindmap-converter-mcp server.
fn main() -> ExitCode {
    let args = Args::parse();

    let mut cfg = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    args.apply_to(&mut cfg);
    if let Err(e) = cfg.validate() {
        eprintln!("Configuration error: {e}");
        return ExitCode::FAILURE;
    }

    let log_level = get_log_level(args.verbose, args.quiet, &cfg.logging.level);
    init_tracing(log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting mindmap-converter-mcp server"
    );
    info!(
        output_dir = %cfg.output.dir.display(),
        engine = %cfg.engine.command,
        timeout_secs = ?cfg.engine.timeout_secs,
        "Configuration loaded"
    );

    let mut server = build_server(&cfg);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!("Mindmap converter MCP server running, waiting for client connection...");

    match runtime.block_on(server.run()) {
        Ok(()) => {
            info!("Server shut down gracefully");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Server error");
            ExitCode::FAILURE
        }
    }
}
