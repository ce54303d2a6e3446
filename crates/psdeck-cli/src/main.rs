mod headless;
mod logging;
mod runtime;
mod settings;
mod ui;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use clap::Subcommand;
use psdeck_core::state::SessionSettings;
use psdeck_core::state::SessionState;
use psdeck_exec::Dispatcher;

use crate::runtime::Runtime;
use crate::settings::Overrides;

#[derive(Debug, Parser)]
#[command(name = "psdeck", version, about = "Run PowerShell scripts and commands on a remote service")]
struct Cli {
    /// Config file (defaults to <config dir>/psdeck/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:8000
    #[arg(long, global = true, env = "PSDECK_BACKEND_URL")]
    backend: Option<String>,

    /// Request timeout in seconds; 0 disables it.
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Use the built-in simulated backend.
    #[arg(long, global = true)]
    simulated: bool,

    /// Keep terminal history when leaving the terminal screen.
    #[arg(long, global = true)]
    retain_history: bool,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Open the interactive console (default).
    Tui,
    /// Print the script catalog.
    Scripts,
    /// Run a catalog script and print its output.
    Run {
        script: String,
        /// Parameter assignment; repeatable. A bare NAME enables a switch.
        #[arg(short = 'p', long = "param", value_name = "NAME=VALUE", value_parser = headless::parse_assignment)]
        params: Vec<(String, String)>,
    },
    /// Run an ad-hoc command.
    Exec {
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Query the service health endpoint.
    Health,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("psdeck: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Tui);
    let interactive = matches!(command, Command::Tui);

    let _log_guard = if interactive {
        logging::init_file(&settings::log_dir(), cli.verbose)
    } else {
        logging::init_stderr(cli.verbose);
        None
    };

    let mut config = settings::load_config(cli.config.as_deref())?;
    Overrides {
        backend_url: cli.backend,
        timeout_secs: cli.timeout,
        simulated: cli.simulated,
        retain_history: cli.retain_history,
    }
    .apply(&mut config);
    tracing::debug!(?config, "effective configuration");

    let service = settings::build_service(&config.backend, interactive);
    let state = SessionState::new(SessionSettings::from(&config));
    let mut runtime = Runtime::new(state, Dispatcher::new(service));

    match command {
        Command::Tui => {
            ui::run(runtime).context("terminal UI failed")?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Scripts => headless::list_scripts(&mut runtime),
        Command::Run { script, params } => headless::run_script(&mut runtime, &script, &params),
        Command::Exec { command } => headless::exec_command(&mut runtime, &command.join(" ")),
        Command::Health => headless::health(&runtime),
    }
}
