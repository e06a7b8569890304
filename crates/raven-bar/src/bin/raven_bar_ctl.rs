use std::io::{Read, Write};
use std::os::unix::net::UnixStream;

use clap::{Parser, Subcommand};

use raven_bar_core::{BarCommand, ConfigPaths};

#[derive(Parser)]
#[command(name = "raven-bar-ctl")]
#[command(about = "Control utility for raven-bar")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show or hide every bar
    Toggle,
    /// Refresh the modules listening on a signal number
    Signal {
        /// Signal number from the module config
        #[arg(allow_negative_numbers = true)]
        number: i32,
    },
    /// Show the state of every bar
    Status,
    /// Reload the user stylesheet
    ReloadStyle,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let command = match cli.command {
        Command::Toggle => BarCommand::Toggle,
        Command::Signal { number } => BarCommand::Signal(number),
        Command::Status => BarCommand::Status,
        Command::ReloadStyle => BarCommand::ReloadStyle,
    };

    let response = send_command(&command)?;
    println!("{}", response.trim());

    if response.starts_with("error:") {
        std::process::exit(1);
    }
    Ok(())
}

/// Send a command to the bar via IPC
fn send_command(command: &BarCommand) -> anyhow::Result<String> {
    let path = ConfigPaths::socket_path();

    if !path.exists() {
        return Err(anyhow::anyhow!(
            "raven-bar is not running (socket not found at {:?})",
            path
        ));
    }

    let mut stream = UnixStream::connect(&path)?;
    stream.write_all(command.to_string().as_bytes())?;
    stream.write_all(b"\n")?;
    stream.flush()?;

    let mut response = String::new();
    stream.read_to_string(&mut response)?;

    Ok(response)
}
