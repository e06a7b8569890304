use std::fmt;

use tokio::sync::oneshot;

/// Commands accepted on the control socket, one per line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarCommand {
    /// Show or hide every bar
    Toggle,
    /// Route a refresh signal to the modules of every bar
    Signal(i32),
    /// Report the state of every bar
    Status,
    /// Reload the user stylesheet
    ReloadStyle,
}

impl BarCommand {
    /// Parse a command line as sent by `raven-bar-ctl`
    pub fn parse(line: &str) -> Option<Self> {
        let mut words = line.split_whitespace();
        let command = match words.next()? {
            "toggle" => Self::Toggle,
            "status" => Self::Status,
            "reload-style" => Self::ReloadStyle,
            "signal" => Self::Signal(words.next()?.parse().ok()?),
            _ => return None,
        };
        if words.next().is_some() {
            return None;
        }
        Some(command)
    }
}

impl fmt::Display for BarCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toggle => write!(f, "toggle"),
            Self::Signal(n) => write!(f, "signal {}", n),
            Self::Status => write!(f, "status"),
            Self::ReloadStyle => write!(f, "reload-style"),
        }
    }
}

/// A control-socket command waiting for its answer from the main loop
#[derive(Debug)]
pub struct IpcRequest {
    pub command: BarCommand,
    pub reply: oneshot::Sender<String>,
}

impl IpcRequest {
    pub fn respond(self, response: impl Into<String>) {
        // The client may have hung up already
        let _ = self.reply.send(response.into());
    }
}

/// Events FROM async services TO the GTK main loop
#[derive(Debug)]
pub enum BarEvent {
    /// Control-socket command
    Request(IpcRequest),
    /// The user stylesheet changed on disk
    StyleChanged,
}
