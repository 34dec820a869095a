//! The embedded web server
//!
//! [`AxumServiceFactory`] is the stock [`ServiceFactory`]: it binds the
//! configured port and serves an axum router whose state carries the
//! collaborator registry. Page templates and business endpoints are not part of
//! this crate; hosts add them with [`AxumServiceFactory::with_routes`].

mod routes;

use crate::config::{SecretKey, WebUiConfig};
use crate::di::{CollaboratorRegistry, HasCollaborators};
use crate::lifecycle::{LifecycleError, Result, RunnableServer, ServiceFactory};
use async_trait::async_trait;
use axum::{Router, routing::get};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

/// Router state of one server run
#[derive(Clone)]
pub struct WebState {
    collaborators: Arc<CollaboratorRegistry>,
    secret_key: SecretKey,
    started_at: DateTime<Utc>,
}

impl WebState {
    pub fn new(collaborators: Arc<CollaboratorRegistry>, secret_key: SecretKey) -> Self {
        Self {
            collaborators,
            secret_key,
            started_at: Utc::now(),
        }
    }

    /// Key for signing session cookies
    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}

impl HasCollaborators for WebState {
    fn collaborators(&self) -> &CollaboratorRegistry {
        &self.collaborators
    }
}

/// Builds axum servers for the lifecycle controller
///
/// # Example
///
/// ```rust,ignore
/// let factory = AxumServiceFactory::new().with_routes(
///     Router::new().route("/api/user/backpack", get(backpack)),
/// );
/// ```
#[derive(Clone)]
pub struct AxumServiceFactory {
    routes: Router<WebState>,
}

impl Default for AxumServiceFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl AxumServiceFactory {
    /// Factory serving only the stock routes: `/`, `/favicon.ico` and `/api/debug`
    pub fn new() -> Self {
        Self {
            routes: Router::new()
                .route("/", get(routes::root))
                .route("/favicon.ico", get(routes::favicon))
                .route("/api/debug", get(routes::debug_info)),
        }
    }

    /// Merge host-provided routes into every server this factory builds
    ///
    /// # Panics
    ///
    /// Like [`Router::merge`], panics if a route overlaps a stock route or one
    /// merged earlier. This happens here, while the host wires the plugin,
    /// never later inside `start()`.
    pub fn with_routes(mut self, routes: Router<WebState>) -> Self {
        self.routes = self.routes.merge(routes);
        self
    }

    /// The complete application for `state`
    pub fn router(&self, state: WebState) -> Router {
        self.routes
            .clone()
            .fallback(routes::not_found)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}

#[async_trait]
impl ServiceFactory for AxumServiceFactory {
    async fn build(
        &self,
        config: &WebUiConfig,
        collaborators: Arc<CollaboratorRegistry>,
    ) -> Result<RunnableServer> {
        let bind_addr = config.bind_address();
        let listener = TcpListener::bind(&bind_addr)
            .await
            .map_err(|e| LifecycleError::bind(&bind_addr, e))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| LifecycleError::bind(&bind_addr, e))?;

        tracing::info!(
            "Web UI bound to {}, collaborators: {:?}",
            local_addr,
            collaborators.names()
        );
        let app = self.router(WebState::new(collaborators, config.secret_key.clone()));

        Ok(RunnableServer::new(local_addr, move |shutdown| async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(shutdown.cancelled_owned())
                .await
                .map_err(|e| LifecycleError::server(e.to_string()))
        }))
    }
}
