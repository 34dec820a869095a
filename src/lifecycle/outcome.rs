//! Structured results of controller operations
//!
//! Every operator command ends in exactly one of these values, each carrying
//! the message shown back in chat.

use std::fmt;
use std::net::SocketAddr;
use strum_macros::{Display, IntoStaticStr};

/// Coarse classification of a command result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum OutcomeKind {
    #[strum(serialize = "started")]
    Started,
    #[strum(serialize = "already running")]
    AlreadyRunning,
    #[strum(serialize = "disabled")]
    Disabled,
    #[strum(serialize = "stopped")]
    Stopped,
    #[strum(serialize = "already stopped")]
    AlreadyStopped,
    #[strum(serialize = "status")]
    Status,
    #[strum(serialize = "shutting down")]
    ShuttingDown,
    #[strum(serialize = "failed")]
    Failed,
}

impl OutcomeKind {
    /// Whether the command did what the operator asked, or was already done
    pub fn is_success(self) -> bool {
        !matches!(self, Self::Disabled | Self::ShuttingDown | Self::Failed)
    }
}

/// Result of [`LifecycleController::start`](super::LifecycleController::start)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Started { addr: SocketAddr, url: String },
    AlreadyRunning { url: String },
    Disabled,
    /// The host has torn the plugin down; no new server may start
    ShuttingDown,
    Failed { cause: String },
}

impl StartOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Started { .. } => OutcomeKind::Started,
            Self::AlreadyRunning { .. } => OutcomeKind::AlreadyRunning,
            Self::Disabled => OutcomeKind::Disabled,
            Self::ShuttingDown => OutcomeKind::ShuttingDown,
            Self::Failed { .. } => OutcomeKind::Failed,
        }
    }
}

impl fmt::Display for StartOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Started { url, .. } => write!(f, "Web UI started at {}", url),
            Self::AlreadyRunning { url } => write!(f, "Web UI is already running at {}", url),
            Self::Disabled => f.write_str("Web UI is disabled in the plugin configuration"),
            Self::ShuttingDown => f.write_str("Web UI can't start: the host is shutting down"),
            Self::Failed { cause } => write!(f, "Failed to start web UI: {}", cause),
        }
    }
}

/// Result of [`LifecycleController::stop`](super::LifecycleController::stop)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    AlreadyStopped,
    Failed { cause: String },
}

impl StopOutcome {
    pub fn kind(&self) -> OutcomeKind {
        match self {
            Self::Stopped => OutcomeKind::Stopped,
            Self::AlreadyStopped => OutcomeKind::AlreadyStopped,
            Self::Failed { .. } => OutcomeKind::Failed,
        }
    }
}

impl fmt::Display for StopOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => f.write_str("Web UI stopped"),
            Self::AlreadyStopped => f.write_str("Web UI is already stopped"),
            Self::Failed { cause } => write!(
                f,
                "Failed to stop web UI: {} (the server is still marked running)",
                cause
            ),
        }
    }
}
