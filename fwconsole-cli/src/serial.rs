//! Interactive serial port selection.
//!
//! Resolution order: explicit port (CLI/env), configured port, single
//! detected port, interactive selection. Non-interactive mode never prompts;
//! selection failures are usage errors so they map to exit code 2.

use {
    crate::{CliError, config::Config},
    anyhow::Result,
    console::style,
    dialoguer::{Confirm, Error as DialoguerError, Select, theme::ColorfulTheme},
    fwconsole::PortInfo,
    log::{debug, info},
    std::io::IsTerminal,
};

/// Options for serial port selection.
#[derive(Debug, Clone, Default)]
pub(crate) struct SerialOptions {
    /// Explicit port specified via CLI or environment.
    pub port: Option<String>,
    /// Non-interactive mode (fail if a prompt would be needed).
    pub non_interactive: bool,
}

/// Result of port selection.
pub(crate) struct SelectedPort {
    /// The selected port name.
    pub name: String,
    /// Whether the operator picked it from an interactive list.
    pub interactive: bool,
}

fn usage_err(message: &str) -> anyhow::Error {
    CliError::Usage(message.to_string()).into()
}

/// Select a serial port explicitly, from config, or interactively.
pub(crate) fn select_serial_port(
    options: &SerialOptions,
    config: &Config,
) -> Result<SelectedPort> {
    if let Some(name) = &options.port {
        return Ok(SelectedPort {
            name: name.clone(),
            interactive: false,
        });
    }

    if let Some(name) = &config.connection.serial {
        debug!("using port from config: {name}");
        return Ok(SelectedPort {
            name: name.clone(),
            interactive: false,
        });
    }

    let ports = fwconsole::list_ports()?;
    if ports.is_empty() {
        return Err(usage_err(
            "no serial ports found; specify one explicitly",
        ));
    }
    if ports.len() == 1 {
        info!("auto-selected port: {}", ports[0].name);
        return Ok(SelectedPort {
            name: ports[0].name.clone(),
            interactive: false,
        });
    }

    if options.non_interactive {
        return Err(usage_err(
            "multiple serial ports found; specify one explicitly",
        ));
    }
    ensure_interactive_terminal()?;

    let items: Vec<String> = ports.iter().map(describe_port).collect();
    let chosen = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Select a serial port")
        .items(&items)
        .default(0)
        .interact()
        .map_err(map_prompt_error)?;

    Ok(SelectedPort {
        name: ports[chosen].name.clone(),
        interactive: true,
    })
}

/// Offer to remember an interactively selected port in the global config.
pub(crate) fn ask_remember_port(name: &str, config: &mut Config) -> Result<()> {
    if !std::io::stdin().is_terminal() || !std::io::stderr().is_terminal() {
        return Ok(());
    }

    let remember = Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!("Use {name} as the default port from now on?"))
        .default(false)
        .interact()
        .map_err(map_prompt_error)?;

    if remember {
        config.connection.serial = Some(name.to_string());
        match config.save() {
            Ok(path) => eprintln!(
                "{} Saved default port to {}",
                style("✓").green(),
                path.display()
            ),
            Err(err) => log::warn!("could not save config: {err}"),
        }
    }
    Ok(())
}

/// One list entry for the selection prompt.
fn describe_port(port: &PortInfo) -> String {
    match (&port.manufacturer, &port.product) {
        (_, Some(product)) => format!("{} ({product})", port.name),
        (Some(manufacturer), None) => format!("{} ({manufacturer})", port.name),
        (None, None) => port.name.clone(),
    }
}

fn ensure_interactive_terminal() -> Result<()> {
    if std::io::stdin().is_terminal() && std::io::stderr().is_terminal() {
        Ok(())
    } else {
        Err(usage_err(
            "interactive port selection requires a terminal; specify a port explicitly",
        ))
    }
}

fn map_prompt_error(err: DialoguerError) -> anyhow::Error {
    match err {
        DialoguerError::IO(io_err) => {
            if io_err.kind() == std::io::ErrorKind::Interrupted {
                CliError::Cancelled("port selection cancelled".to_string()).into()
            } else {
                CliError::Usage("port selection prompt failed".to_string()).into()
            }
        },
    }
}
