//! Host lifecycle hook traits

use super::LifecycleError;
use async_trait::async_trait;

/// Called once when the host process is shutting down
///
/// Implementors must release everything they started, whatever state they
/// are in, and tolerate having nothing to release.
///
/// # Example
///
/// ```rust,ignore
/// #[async_trait]
/// impl OnHostTeardown for Scoreboard {
///     async fn on_host_teardown(&mut self) -> Result<(), LifecycleError> {
///         if let Some(flusher) = self.flusher.take() {
///             flusher.abort();
///         }
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait OnHostTeardown: Send + Sync {
    async fn on_host_teardown(&mut self) -> Result<(), LifecycleError>;
}
