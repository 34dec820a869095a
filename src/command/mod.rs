//! Operator command surface
//!
//! What the host's chat dispatcher calls after it has parsed and authorised
//! an operator command. Each call yields exactly one [`CommandReply`].

use crate::lifecycle::{LifecycleController, OutcomeKind, StartOutcome, StopOutcome};
use std::str::FromStr;
use std::sync::Arc;
use strum_macros::{Display, EnumString};
use tokio::sync::Mutex;

/// Commands understood by the web UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum WebUiCommand {
    Start,
    Stop,
    Status,
}

/// The single message shown back to the operator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandReply {
    pub kind: OutcomeKind,
    pub message: String,
}

impl From<StartOutcome> for CommandReply {
    fn from(outcome: StartOutcome) -> Self {
        Self {
            kind: outcome.kind(),
            message: outcome.to_string(),
        }
    }
}

impl From<StopOutcome> for CommandReply {
    fn from(outcome: StopOutcome) -> Self {
        Self {
            kind: outcome.kind(),
            message: outcome.to_string(),
        }
    }
}

/// Cloneable front for a shared [`LifecycleController`]
#[derive(Clone)]
pub struct WebUiCommands {
    controller: Arc<Mutex<LifecycleController>>,
}

impl WebUiCommands {
    pub fn new(controller: Arc<Mutex<LifecycleController>>) -> Self {
        Self { controller }
    }

    pub async fn start(&self) -> CommandReply {
        self.controller.lock().await.start().await.into()
    }

    pub async fn stop(&self) -> CommandReply {
        self.controller.lock().await.stop().into()
    }

    pub async fn status(&self) -> CommandReply {
        CommandReply {
            kind: OutcomeKind::Status,
            message: self.controller.lock().await.describe(),
        }
    }

    pub async fn dispatch(&self, command: WebUiCommand) -> CommandReply {
        tracing::debug!("Dispatching web UI command: {}", command);
        match command {
            WebUiCommand::Start => self.start().await,
            WebUiCommand::Stop => self.stop().await,
            WebUiCommand::Status => self.status().await,
        }
    }

    /// Parse a bare command word (`start`, `stop`, `status`) and dispatch it
    pub async fn handle_text(&self, text: &str) -> CommandReply {
        match WebUiCommand::from_str(text.trim()) {
            Ok(command) => self.dispatch(command).await,
            Err(_) => CommandReply {
                kind: OutcomeKind::Failed,
                message: format!(
                    "Unknown web UI command '{}', expected start, stop or status",
                    text.trim()
                ),
            },
        }
    }
}
