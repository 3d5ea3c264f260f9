//! fwconsole CLI - interactive serial console for embedded firmware
//! bring-up.
//!
//! Synchronizes with a freshly reset device by draining its boot dump and
//! waiting for the firmware ready line, then runs command/response turns
//! until end of input or Ctrl-C.

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use console::style;
use env_logger::Env;
use fwconsole::{CommandLoop, SerialTransport, StopSignal, Synchronizer, TransportConfig};
use log::debug;
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

mod config;
mod serial;
mod term;

use config::Config;
use serial::{SerialOptions, ask_remember_port, select_serial_port};
use term::{StdioSource, TermSink};

/// CLI-level error classes used to map failures onto exit codes.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    /// Wrong invocation or unusable environment (exit code 2).
    #[error("{0}")]
    Usage(String),
    /// Operator cancelled an interactive step (exit code 130).
    #[error("{0}")]
    Cancelled(String),
}

/// fwconsole - interactive serial console for embedded firmware.
///
/// Environment variables:
///   FWCONSOLE_PORT              - Default serial port
///   FWCONSOLE_BAUD              - Default baud rate (default: 115200)
///   FWCONSOLE_NON_INTERACTIVE   - Non-interactive mode (disable prompts)
#[derive(Parser)]
#[command(name = "fwconsole")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "The console synchronizes first: reboot the device and wait for the \
    'firmware ready' line, then type one command per turn.")]
struct Cli {
    /// Serial port to connect to (selected interactively if not specified).
    #[arg(env = "FWCONSOLE_PORT")]
    port: Option<String>,

    /// Baud rate (default: 115200).
    #[arg(short, long, env = "FWCONSOLE_BAUD")]
    baud: Option<u32>,

    /// Read/write timeout in seconds for device I/O.
    #[arg(short, long, default_value = "10", value_name = "SECONDS")]
    timeout: u64,

    /// Verbose output level (-v, -vv for increasing detail).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode (suppress non-essential output).
    #[arg(short, long)]
    quiet: bool,

    /// Non-interactive mode (fail instead of prompting).
    #[arg(long, env = "FWCONSOLE_NON_INTERACTIVE")]
    non_interactive: bool,

    /// List available serial ports and exit.
    #[arg(long)]
    list_ports: bool,

    /// With --list-ports, print the list as JSON.
    #[arg(long, requires = "list_ports")]
    json: bool,

    /// Generate a shell completion script on stdout and exit.
    #[arg(long, value_enum, value_name = "SHELL")]
    completions: Option<Shell>,

    /// Path to a configuration file.
    #[arg(long = "config", value_name = "PATH")]
    config_path: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    // NO_COLOR and TTY detection (clig.dev best practice)
    let stderr_is_tty = console::Term::stderr().is_term();
    if std::env::var("NO_COLOR").is_ok() || !stderr_is_tty {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    // Setup logging based on verbosity
    let log_level = if cli.quiet {
        "warn"
    } else {
        match cli.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level))
        .format_target(cli.verbose >= 2)
        .format_timestamp(None)
        .init();

    if let Err(err) = run(&cli) {
        eprintln!("{} {err:#}", style("Error:").red().bold());
        std::process::exit(exit_code(&err));
    }
}

/// Map an error onto the CLI exit-code contract: 1 runtime, 2 usage,
/// 130 cancelled/interrupted.
fn exit_code(err: &anyhow::Error) -> i32 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return match cli_err {
            CliError::Usage(_) => 2,
            CliError::Cancelled(_) => 130,
        };
    }
    if matches!(
        err.downcast_ref::<fwconsole::Error>(),
        Some(fwconsole::Error::Interrupted)
    ) {
        return 130;
    }
    1
}

fn run(cli: &Cli) -> Result<()> {
    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "fwconsole", &mut std::io::stdout());
        return Ok(());
    }

    debug!(
        "fwconsole v{} (verbose level: {})",
        env!("CARGO_PKG_VERSION"),
        cli.verbose
    );

    let mut config = if let Some(ref path) = cli.config_path {
        Config::load_from_path(path)
    } else {
        Config::load()
    };

    if cli.list_ports {
        return cmd_list_ports(cli.json);
    }

    let port_name = resolve_port(cli, &mut config)?;
    let baud = cli
        .baud
        .or(config.connection.baud)
        .unwrap_or(fwconsole::DEFAULT_BAUD);
    let timeout = Duration::from_secs(cli.timeout);

    let transport_config = TransportConfig::new(&port_name, baud)
        .with_read_timeout(timeout)
        .with_write_timeout(timeout);
    let mut transport = SerialTransport::open(&transport_config)
        .with_context(|| format!("Failed to open serial port {port_name}"))?;

    let stop = StopSignal::new();
    install_ctrlc(stop.clone())?;

    if !cli.quiet {
        eprintln!(
            "{} Console connected on serial port {} at {} baud",
            style("🔌").cyan(),
            style(&port_name).green(),
            baud
        );
        eprintln!("{}", style("Press Ctrl-C or Ctrl-D to exit.").dim());
    }

    let mut sink = TermSink::new(cli.quiet);
    Synchronizer::new(Synchronizer::DEFAULT_QUIESCENCE, stop.clone())
        .run(&mut transport, &mut sink)?;

    let mut source = StdioSource;
    CommandLoop::new(stop).run(&mut transport, &mut source, &mut sink)?;

    if !cli.quiet {
        eprintln!("{} Console closed.", style("👋").cyan());
    }
    Ok(())
}

/// Wire Ctrl-C to the cooperative stop signal. A second Ctrl-C exits
/// immediately for loops stuck in a blocking read.
fn install_ctrlc(stop: StopSignal) -> Result<()> {
    ctrlc::set_handler(move || {
        if stop.is_requested() {
            std::process::exit(130);
        }
        stop.request();
        eprintln!();
        eprintln!(
            "{}",
            style("Stopping (press Ctrl-C again to force quit)...").yellow()
        );
    })
    .context("Failed to install Ctrl-C handler")
}

/// Resolve the serial port: explicit argument or environment, config file,
/// then interactive selection.
fn resolve_port(cli: &Cli, config: &mut Config) -> Result<String> {
    let options = SerialOptions {
        port: cli.port.clone(),
        non_interactive: cli.non_interactive,
    };
    let selected = select_serial_port(&options, config)?;
    if selected.interactive {
        ask_remember_port(&selected.name, config)?;
    }
    Ok(selected.name)
}

/// Serial port record for `--list-ports --json`.
#[derive(Serialize)]
struct PortListing<'a> {
    name: &'a str,
    vid: Option<u16>,
    pid: Option<u16>,
    manufacturer: Option<&'a str>,
    product: Option<&'a str>,
    serial_number: Option<&'a str>,
}

/// List available serial ports on stdout.
fn cmd_list_ports(json: bool) -> Result<()> {
    let ports = fwconsole::list_ports().context("Failed to enumerate serial ports")?;

    if json {
        let listing: Vec<PortListing<'_>> = ports
            .iter()
            .map(|p| PortListing {
                name: &p.name,
                vid: p.vid,
                pid: p.pid,
                manufacturer: p.manufacturer.as_deref(),
                product: p.product.as_deref(),
                serial_number: p.serial_number.as_deref(),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&listing)?);
        return Ok(());
    }

    if ports.is_empty() {
        eprintln!("No serial ports found.");
        return Ok(());
    }
    for port in &ports {
        match (&port.manufacturer, &port.product) {
            (_, Some(product)) => println!("{}  {product}", port.name),
            (Some(manufacturer), None) => println!("{}  {manufacturer}", port.name),
            (None, None) => println!("{}", port.name),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_minimal_invocation() {
        let cli = Cli::parse_from(["fwconsole", "/dev/ttyUSB0"]);
        assert_eq!(cli.port.as_deref(), Some("/dev/ttyUSB0"));
        assert_eq!(cli.baud, None);
        assert_eq!(cli.timeout, 10);
    }

    #[test]
    fn test_cli_parses_overrides() {
        let cli = Cli::parse_from(["fwconsole", "COM3", "-b", "921600", "-t", "5", "-vv"]);
        assert_eq!(cli.baud, Some(921600));
        assert_eq!(cli.timeout, 5);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_exit_code_mapping() {
        assert_eq!(exit_code(&CliError::Usage("bad".into()).into()), 2);
        assert_eq!(exit_code(&CliError::Cancelled("stop".into()).into()), 130);
        assert_eq!(exit_code(&fwconsole::Error::Interrupted.into()), 130);
        assert_eq!(exit_code(&anyhow::anyhow!("boom")), 1);
    }
}
