//! Lifecycle-specific error types

use thiserror::Error;

/// Errors that can occur while bringing the embedded server up or down
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The service factory could not build a runnable server
    #[error("Service factory failed: {0}")]
    Factory(String),

    /// The listening socket could not be bound
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        /// The address the factory tried to bind
        addr: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The scheduler refused to run the server task
    #[error("Failed to schedule server task: {0}")]
    Schedule(String),

    /// The cancellation signal could not be delivered to the server task
    #[error("Cancellation could not be delivered: {0}")]
    CancellationFailed(String),

    /// The server task itself terminated with an error
    #[error("Server task failed: {0}")]
    Server(String),

    /// Operation timed out
    #[error("Timeout during {phase}: {message}")]
    Timeout {
        /// The lifecycle phase where timeout occurred
        phase: String,
        /// Additional error message
        message: String,
    },
}

impl LifecycleError {
    /// Create a factory failure error
    pub fn factory(msg: impl Into<String>) -> Self {
        Self::Factory(msg.into())
    }

    /// Create a bind failure error
    pub fn bind(addr: impl Into<String>, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }

    /// Create a scheduling failure error
    pub fn schedule(msg: impl Into<String>) -> Self {
        Self::Schedule(msg.into())
    }

    /// Create a cancellation failure error
    pub fn cancellation_failed(msg: impl Into<String>) -> Self {
        Self::CancellationFailed(msg.into())
    }

    /// Create a server task failure error
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }

    /// Create a timeout error
    pub fn timeout(phase: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Timeout {
            phase: phase.into(),
            message: message.into(),
        }
    }
}

/// A specialized Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, LifecycleError>;
