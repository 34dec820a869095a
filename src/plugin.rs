//! Plugin assembly
//!
//! Wires config, collaborators, factory and scheduler into one controller
//! and exposes what the host needs: the command surface and the teardown hook.

use crate::command::WebUiCommands;
use crate::config::{ConfigError, WebUiConfig};
use crate::di::CollaboratorRegistry;
use crate::error::Result;
use crate::lifecycle::{
    LifecycleController, Scheduler, ServiceFactory, TeardownHook, TokioScheduler,
};
use crate::server::AxumServiceFactory;
use std::sync::Arc;
use tokio::sync::Mutex;

/// The web UI as seen by the host
///
/// # Example
///
/// ```rust,ignore
/// let plugin = WebUiPlugin::builder()
///     .config(WebUiConfig::from_json(&plugin_config["webui"])?)
///     .collaborator("inventory_repo", inventory_repo)
///     .collaborator("market_service", market_service)
///     .build()?;
///
/// let commands = plugin.commands();
/// reply(commands.handle_text("start").await.message);
///
/// // host unloading the plugin
/// plugin.terminate().await?;
/// ```
pub struct WebUiPlugin {
    controller: Arc<Mutex<LifecycleController>>,
    teardown: TeardownHook<LifecycleController>,
}

impl WebUiPlugin {
    pub fn builder() -> WebUiPluginBuilder {
        WebUiPluginBuilder::new()
    }

    pub fn controller(&self) -> &Arc<Mutex<LifecycleController>> {
        &self.controller
    }

    pub fn commands(&self) -> WebUiCommands {
        WebUiCommands::new(Arc::clone(&self.controller))
    }

    pub fn teardown_hook(&self) -> TeardownHook<LifecycleController> {
        self.teardown.clone()
    }

    /// Host teardown: stop the server and let it drain; safe to call repeatedly
    pub async fn terminate(&self) -> Result<()> {
        self.teardown.run().await?;
        Ok(())
    }

    /// Spawn a background task that runs the teardown on SIGINT/SIGTERM
    pub fn spawn_signal_teardown(&self) -> tokio::task::JoinHandle<()> {
        let hook = self.teardown.clone();
        tokio::spawn(async move {
            hook.wait_for_signal().await;
        })
    }
}

/// Builder for [`WebUiPlugin`]
pub struct WebUiPluginBuilder {
    config: Option<WebUiConfig>,
    collaborators: CollaboratorRegistry,
    factory: Option<Arc<dyn ServiceFactory>>,
    scheduler: Option<Arc<dyn Scheduler>>,
}

impl Default for WebUiPluginBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WebUiPluginBuilder {
    pub fn new() -> Self {
        Self {
            config: None,
            collaborators: CollaboratorRegistry::new(),
            factory: None,
            scheduler: None,
        }
    }

    pub fn config(mut self, config: WebUiConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Share a business service with the web server under `name`
    pub fn collaborator<T>(mut self, name: impl Into<String>, instance: Arc<T>) -> Self
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.collaborators.register(name, instance);
        self
    }

    /// Defaults to [`AxumServiceFactory`] with no extra routes
    pub fn factory(mut self, factory: impl ServiceFactory + 'static) -> Self {
        self.factory = Some(Arc::new(factory));
        self
    }

    /// Defaults to [`TokioScheduler`] on the current runtime
    pub fn scheduler(mut self, scheduler: impl Scheduler + 'static) -> Self {
        self.scheduler = Some(Arc::new(scheduler));
        self
    }

    /// Take the config snapshot and create the controller, stopped
    pub fn build(self) -> Result<WebUiPlugin> {
        let config = self.config.ok_or(ConfigError::Missing)?;
        let factory = self
            .factory
            .unwrap_or_else(|| Arc::new(AxumServiceFactory::new()) as Arc<dyn ServiceFactory>);
        let scheduler = self
            .scheduler
            .unwrap_or_else(|| Arc::new(TokioScheduler::new()) as Arc<dyn Scheduler>);

        tracing::info!(
            "Web UI plugin ready (enabled: {}, port: {}, {} collaborators)",
            config.enabled,
            config.port,
            self.collaborators.len()
        );

        let controller = Arc::new(Mutex::new(LifecycleController::new(
            config,
            Arc::new(self.collaborators),
            factory,
            scheduler,
        )));
        let teardown = TeardownHook::new(Arc::clone(&controller));

        Ok(WebUiPlugin {
            controller,
            teardown,
        })
    }
}
