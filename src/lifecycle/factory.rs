use super::{Result, RunnableServer};
use crate::config::WebUiConfig;
use crate::di::CollaboratorRegistry;
use async_trait::async_trait;
use std::sync::Arc;

/// Builds a ready-to-run embedded server
///
/// Implementations own the network socket: the controller never binds the port
/// itself. The returned server must already be bound to `config.port` so bind
/// failures surface here, before anything is scheduled.
///
/// # Example
///
/// ```rust,ignore
/// use webui_host::lifecycle::{RunnableServer, ServiceFactory, Result};
///
/// struct EchoFactory;
///
/// #[async_trait]
/// impl ServiceFactory for EchoFactory {
///     async fn build(
///         &self,
///         config: &WebUiConfig,
///         collaborators: Arc<CollaboratorRegistry>,
///     ) -> Result<RunnableServer> {
///         let listener = bind(config).await?;
///         Ok(RunnableServer::new(listener.local_addr()?, |token| serve(listener, token)))
///     }
/// }
/// ```
#[async_trait]
pub trait ServiceFactory: Send + Sync {
    /// Build a server bound to `config.port` and wired with `collaborators`
    async fn build(
        &self,
        config: &WebUiConfig,
        collaborators: Arc<CollaboratorRegistry>,
    ) -> Result<RunnableServer>;
}
