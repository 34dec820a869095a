//! # webui-host
//!
//! An embedded, runtime-switchable web UI for chat-bot host plugins.
//!
//! The host constructs a [`WebUiPlugin`] once, hands the operator's `start`,
//! `stop` and `status` chat commands to [`WebUiCommands`], and calls
//! [`WebUiPlugin::terminate`] when it unloads. In between, the lifecycle
//! controller guarantees that at most one server runs, that a disabled
//! configuration never starts one, and that nothing outlives the host.
//!
//! ## Features
//!
//! - **Lifecycle Controller**: `start()`/`stop()` state machine with idempotent no-ops
//! - **Service Handle**: background task plus cancellation signal, one per run
//! - **Pluggable seams**: [`ServiceFactory`](lifecycle::ServiceFactory) builds the server,
//!   [`Scheduler`](lifecycle::Scheduler) runs it
//! - **Collaborator injection**: business services shared with handlers through `Inject<T>`
//! - **Host teardown**: stop plus bounded drain, at most once, also on SIGINT/SIGTERM
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use webui_host::prelude::*;
//!
//! struct MarketService;
//!
//! #[tokio::main]
//! async fn main() -> webui_host::Result<()> {
//!     let plugin = WebUiPlugin::builder()
//!         .config(WebUiConfig::from_config_service(&ConfigService::from_env())?)
//!         .collaborator("market_service", Arc::new(MarketService))
//!         .build()?;
//!
//!     let commands = plugin.commands();
//!     println!("{}", commands.handle_text("start").await.message);
//!     println!("{}", commands.handle_text("stop").await.message);
//!
//!     plugin.terminate().await
//! }
//! ```

pub mod command;
pub mod common;
pub mod config;
pub mod di;
pub mod error;
pub mod lifecycle;
pub mod plugin;
pub mod server;

// Re-export core types
pub use command::{CommandReply, WebUiCommand, WebUiCommands};
pub use common::ApiResponse;
pub use config::{ConfigService, WebUiConfig};
pub use di::{CollaboratorRegistry, HasCollaborators, Inject};
pub use error::{Result, WebUiError};
pub use lifecycle::LifecycleController;
pub use plugin::{WebUiPlugin, WebUiPluginBuilder};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use webui_host::prelude::*;
/// ```
pub mod prelude {
    pub use crate::command::{CommandReply, WebUiCommand, WebUiCommands};
    pub use crate::common::ApiResponse;
    pub use crate::config::{ConfigService, SecretKey, WebUiConfig};
    pub use crate::di::{CollaboratorRegistry, HasCollaborators, Inject};
    pub use crate::error::{Result, WebUiError};
    pub use crate::lifecycle::{
        LifecycleController, LifecycleError, OnHostTeardown, OutcomeKind, RunnableServer,
        Scheduler, ServiceFactory, ServiceHandle, StartOutcome, Status, StopOutcome, TeardownHook,
        TokioScheduler, shutdown_signal,
    };
    pub use crate::plugin::{WebUiPlugin, WebUiPluginBuilder};
    pub use crate::server::{AxumServiceFactory, WebState};
    pub use async_trait::async_trait;
    pub use axum::{
        Json, Router,
        extract::{Path, Query, State},
        http::StatusCode,
        response::{IntoResponse, Response},
        routing::{get, post},
    };
    pub use std::sync::Arc;
}
