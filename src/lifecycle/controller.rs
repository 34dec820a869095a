//! Lifecycle Controller
//!
//! Sole owner of the embedded server's on/off state.

use super::{
    OnHostTeardown, Result, Scheduler, ServiceFactory, ServiceHandle, StartOutcome, StopOutcome,
};
use crate::config::WebUiConfig;
use crate::di::CollaboratorRegistry;
use async_trait::async_trait;
use std::sync::Arc;
use strum_macros::Display;

/// Whether the embedded server is up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    Stopped,
    Running,
}

/// The handle exists exactly when the server is running.
enum LifecycleState {
    Stopped,
    Running(ServiceHandle),
}

/// Starts and stops the embedded web server on operator command
///
/// Operations take `&mut self`, so a host sharing the controller behind
/// `Arc<tokio::sync::Mutex<_>>` gets them strictly one after another.
///
/// ```text
/// Stopped --start() ok--> Running --stop() ok--> Stopped
/// start() while Running, stop() while Stopped: no side effect
/// after host teardown: start() refused
/// ```
///
/// A stopped server keeps draining in the background. The next `start()` or
/// the host teardown waits for it, so its socket is free before anything
/// binds again.
///
/// # Example
///
/// ```rust,ignore
/// let mut controller = LifecycleController::new(config, collaborators, factory, scheduler);
///
/// match controller.start().await {
///     StartOutcome::Started { url, .. } => reply(format!("Web UI at {url}")),
///     other => reply(other.to_string()),
/// }
///
/// controller.stop();
/// ```
pub struct LifecycleController {
    config: Arc<WebUiConfig>,
    collaborators: Arc<CollaboratorRegistry>,
    factory: Arc<dyn ServiceFactory>,
    scheduler: Arc<dyn Scheduler>,
    state: LifecycleState,
    /// Last stopped run, possibly still finishing in-flight requests
    draining: Option<ServiceHandle>,
    torn_down: bool,
}

impl LifecycleController {
    /// Create a stopped controller; `config` is snapshotted here and never re-read
    pub fn new(
        config: WebUiConfig,
        collaborators: Arc<CollaboratorRegistry>,
        factory: Arc<dyn ServiceFactory>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        Self {
            config: Arc::new(config.normalized()),
            collaborators,
            factory,
            scheduler,
            state: LifecycleState::Stopped,
            draining: None,
            torn_down: false,
        }
    }

    pub fn config(&self) -> &WebUiConfig {
        &self.config
    }

    pub fn collaborators(&self) -> &Arc<CollaboratorRegistry> {
        &self.collaborators
    }

    pub fn status(&self) -> Status {
        match self.state {
            LifecycleState::Stopped => Status::Stopped,
            LifecycleState::Running(_) => Status::Running,
        }
    }

    /// The current handle, present iff [`status`](Self::status) is `Running`
    pub fn handle(&self) -> Option<&ServiceHandle> {
        match &self.state {
            LifecycleState::Stopped => None,
            LifecycleState::Running(handle) => Some(handle),
        }
    }

    /// Whether the host teardown has run; no server starts afterwards
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// One-line status for operators
    pub fn describe(&self) -> String {
        match &self.state {
            LifecycleState::Stopped => "Web UI is stopped".to_string(),
            LifecycleState::Running(handle) => format!(
                "Web UI is running at {} since {}",
                self.config.url_for(handle.local_addr().port()),
                handle.started_at().format("%Y-%m-%d %H:%M:%S UTC")
            ),
        }
    }

    /// Start the embedded server
    ///
    /// Never leaves a partial handle behind: on any failure the state stays
    /// `Stopped` and whatever the factory built is dropped.
    pub async fn start(&mut self) -> StartOutcome {
        if self.torn_down {
            tracing::warn!("Start refused: host teardown already ran");
            return StartOutcome::ShuttingDown;
        }

        if let LifecycleState::Running(handle) = &self.state {
            if !handle.is_finished() {
                let url = self.config.url_for(handle.local_addr().port());
                tracing::debug!("Start requested while already running at {}", url);
                return StartOutcome::AlreadyRunning { url };
            }
            tracing::warn!(
                "Web UI task {} exited on its own, discarding its handle",
                handle.id()
            );
            self.state = LifecycleState::Stopped;
        }

        if !self.config.enabled {
            tracing::info!("Start refused: web UI is disabled in the configuration");
            return StartOutcome::Disabled;
        }

        self.finish_draining().await;

        match self.launch().await {
            Ok(handle) => {
                let addr = handle.local_addr();
                let url = self.config.url_for(addr.port());
                tracing::info!("Web UI started at {} (handle {})", url, handle.id());
                self.state = LifecycleState::Running(handle);
                StartOutcome::Started { addr, url }
            }
            Err(e) => {
                tracing::error!("Failed to start web UI: {}", e);
                StartOutcome::Failed {
                    cause: e.to_string(),
                }
            }
        }
    }

    /// Wait for the previous run to exit, aborting it after `drain_timeout_ms`
    async fn finish_draining(&mut self) {
        let Some(previous) = self.draining.take() else {
            return;
        };
        let id = previous.id();
        tracing::debug!("Waiting for previous web UI task {} to exit", id);
        if let Err(e) = previous.join(self.config.drain_timeout()).await {
            tracing::warn!("Previous web UI task {} did not exit cleanly: {}", id, e);
        }
    }

    async fn launch(&self) -> Result<ServiceHandle> {
        tracing::debug!("Building web UI server for {}", self.config.bind_address());
        let server = self
            .factory
            .build(&self.config, Arc::clone(&self.collaborators))
            .await?;
        self.scheduler.schedule(server)
    }

    /// Signal the server to stop
    ///
    /// Returns once cancellation has been delivered; the task finishes
    /// in-flight requests in the background.
    pub fn stop(&mut self) -> StopOutcome {
        let mut handle = match std::mem::replace(&mut self.state, LifecycleState::Stopped) {
            LifecycleState::Stopped => {
                tracing::debug!("Stop requested while already stopped");
                return StopOutcome::AlreadyStopped;
            }
            LifecycleState::Running(handle) => handle,
        };

        match handle.cancel() {
            Ok(()) => {
                tracing::info!("Web UI stopped (handle {})", handle.id());
                self.draining = Some(handle);
                StopOutcome::Stopped
            }
            Err(e) => {
                tracing::error!("Failed to cancel web UI task {}: {}", handle.id(), e);
                self.state = LifecycleState::Running(handle);
                StopOutcome::Failed {
                    cause: e.to_string(),
                }
            }
        }
    }

    /// Stop and wait for the server to drain, bounded by `drain_timeout_ms`
    ///
    /// Always ends in `Stopped` with no task left behind, including one
    /// still draining from an earlier `stop()`. A task that can't be
    /// cancelled, or doesn't exit in time, is aborted and the error returned.
    pub async fn shutdown(&mut self) -> Result<()> {
        self.finish_draining().await;

        let mut handle = match std::mem::replace(&mut self.state, LifecycleState::Stopped) {
            LifecycleState::Stopped => {
                tracing::debug!("Shutdown with web UI already stopped");
                return Ok(());
            }
            LifecycleState::Running(handle) => handle,
        };

        if let Err(e) = handle.cancel() {
            tracing::error!("Failed to cancel web UI task {}, aborting: {}", handle.id(), e);
            handle.abort();
            return Err(e);
        }

        let id = handle.id();
        tracing::info!("Web UI stopping (handle {}), waiting for it to drain", id);
        match handle.join(self.config.drain_timeout()).await {
            Ok(()) => {
                tracing::info!("Web UI drained (handle {})", id);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Web UI did not shut down cleanly: {}", e);
                Err(e)
            }
        }
    }
}

#[async_trait]
impl OnHostTeardown for LifecycleController {
    async fn on_host_teardown(&mut self) -> Result<()> {
        self.torn_down = true;
        self.shutdown().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::testing::{CountingScheduler, FakeFactory};
    use crate::lifecycle::{LifecycleError, OutcomeKind, TokioScheduler};
    use crate::server::AxumServiceFactory;
    use std::sync::atomic::Ordering;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn config(port: u16, enabled: bool) -> WebUiConfig {
        WebUiConfig {
            port,
            enabled,
            ..WebUiConfig::default()
        }
    }

    fn controller(
        config: WebUiConfig,
        factory: &Arc<FakeFactory>,
        scheduler: &Arc<CountingScheduler>,
    ) -> LifecycleController {
        LifecycleController::new(
            config,
            Arc::new(CollaboratorRegistry::new()),
            Arc::clone(factory) as Arc<dyn ServiceFactory>,
            Arc::clone(scheduler) as Arc<dyn Scheduler>,
        )
    }

    #[tokio::test]
    async fn operator_scenario() {
        let factory = Arc::new(FakeFactory::new());
        let scheduler = Arc::new(CountingScheduler::new());
        let mut controller = controller(config(8888, true), &factory, &scheduler);
        assert_eq!(controller.status(), Status::Stopped);

        let started = controller.start().await;
        assert_eq!(started.kind(), OutcomeKind::Started);
        assert!(started.to_string().contains("http://localhost:8888"));

        assert_eq!(controller.start().await.kind(), OutcomeKind::AlreadyRunning);
        assert_eq!(controller.stop(), StopOutcome::Stopped);
        assert_eq!(controller.stop(), StopOutcome::AlreadyStopped);
        assert_eq!(controller.status(), Status::Stopped);
    }

    #[tokio::test]
    async fn second_start_keeps_the_same_handle() {
        let factory = Arc::new(FakeFactory::new());
        let scheduler = Arc::new(CountingScheduler::new());
        let mut controller = controller(config(8888, true), &factory, &scheduler);

        controller.start().await;
        let first = controller.handle().map(ServiceHandle::id);
        let again = controller.start().await;

        assert_eq!(
            again,
            StartOutcome::AlreadyRunning {
                url: "http://localhost:8888".to_string()
            }
        );
        assert_eq!(controller.handle().map(ServiceHandle::id), first);
        assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.scheduled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn second_stop_cancels_at_most_once() {
        let factory = Arc::new(FakeFactory::new());
        let scheduler = Arc::new(CountingScheduler::new());
        let mut controller = controller(config(8888, true), &factory, &scheduler);

        controller.start().await;
        assert_eq!(controller.stop(), StopOutcome::Stopped);
        assert_eq!(controller.stop(), StopOutcome::AlreadyStopped);
        assert_eq!(scheduler.cancels.load(Ordering::SeqCst), 1);
        assert!(controller.handle().is_none());
    }

    #[tokio::test]
    async fn disabled_config_never_schedules() {
        let factory = Arc::new(FakeFactory::new());
        let scheduler = Arc::new(CountingScheduler::new());
        let mut controller = controller(config(8888, false), &factory, &scheduler);

        for _ in 0..3 {
            assert_eq!(controller.start().await, StartOutcome::Disabled);
        }
        assert_eq!(controller.status(), Status::Stopped);
        assert_eq!(factory.builds.load(Ordering::SeqCst), 0);
        assert_eq!(scheduler.scheduled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn factory_failure_leaves_nothing_behind() {
        let factory = Arc::new(FakeFactory::failing());
        let scheduler = Arc::new(CountingScheduler::new());
        let mut controller = controller(config(8888, true), &factory, &scheduler);

        let outcome = controller.start().await;
        assert_eq!(outcome.kind(), OutcomeKind::Failed);
        assert!(outcome.to_string().contains("address in use"));
        assert_eq!(controller.status(), Status::Stopped);
        assert!(controller.handle().is_none());
        assert_eq!(scheduler.scheduled.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scheduler_failure_leaves_nothing_behind() {
        let factory = Arc::new(FakeFactory::new());
        let scheduler = Arc::new(CountingScheduler::refusing());
        let mut controller = controller(config(8888, true), &factory, &scheduler);

        assert_eq!(controller.start().await.kind(), OutcomeKind::Failed);
        assert_eq!(controller.status(), Status::Stopped);
        assert!(controller.handle().is_none());
    }

    #[tokio::test]
    async fn failed_start_can_be_retried() {
        let factory = Arc::new(FakeFactory::failing());
        let scheduler = Arc::new(CountingScheduler::new());
        let mut controller = controller(config(8888, true), &factory, &scheduler);

        assert_eq!(controller.start().await.kind(), OutcomeKind::Failed);
        factory.fail.store(false, Ordering::SeqCst);
        assert_eq!(controller.start().await.kind(), OutcomeKind::Started);
        assert_eq!(factory.builds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn restart_produces_a_fresh_handle() {
        let factory = Arc::new(FakeFactory::new());
        let scheduler = Arc::new(CountingScheduler::new());
        let mut controller = controller(config(8888, true), &factory, &scheduler);

        controller.start().await;
        let first = controller.handle().map(ServiceHandle::id).unwrap();
        controller.stop();
        controller.start().await;
        let second = controller.handle().map(ServiceHandle::id).unwrap();

        assert_ne!(first, second);
        let tokens = scheduler.tokens.lock().unwrap();
        assert_eq!(tokens.len(), 2);
        assert!(tokens[0].is_cancelled());
        assert!(!tokens[1].is_cancelled());
    }

    #[tokio::test]
    async fn cancellation_failure_keeps_running_state() {
        let factory = Arc::new(FakeFactory::new());
        let scheduler = Arc::new(CountingScheduler::new());
        let mut controller = controller(config(8888, true), &factory, &scheduler);

        controller.start().await;
        scheduler.fail_cancel.store(true, Ordering::SeqCst);

        let outcome = controller.stop();
        assert_eq!(outcome.kind(), OutcomeKind::Failed);
        assert_eq!(controller.status(), Status::Running);

        scheduler.fail_cancel.store(false, Ordering::SeqCst);
        assert_eq!(controller.stop(), StopOutcome::Stopped);
    }

    #[tokio::test]
    async fn teardown_stops_running_server_once() {
        let factory = Arc::new(FakeFactory::new());
        let scheduler = Arc::new(CountingScheduler::new());
        let mut controller = controller(config(8888, true), &factory, &scheduler);

        controller.start().await;
        controller.on_host_teardown().await.unwrap();
        assert_eq!(controller.status(), Status::Stopped);
        assert_eq!(scheduler.cancels.load(Ordering::SeqCst), 1);

        controller.on_host_teardown().await.unwrap();
        assert_eq!(scheduler.cancels.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn teardown_forces_stopped_when_cancel_fails() {
        let factory = Arc::new(FakeFactory::new());
        let scheduler = Arc::new(CountingScheduler::new());
        let mut controller = controller(config(8888, true), &factory, &scheduler);

        controller.start().await;
        scheduler.fail_cancel.store(true, Ordering::SeqCst);

        let err = controller.shutdown().await.unwrap_err();
        assert!(matches!(err, LifecycleError::CancellationFailed(_)));
        assert_eq!(controller.status(), Status::Stopped);
    }

    #[tokio::test]
    async fn crashed_task_is_replaced_on_start() {
        let factory = Arc::new(FakeFactory::new());
        let scheduler = Arc::new(CountingScheduler::new());
        let mut controller = controller(config(8888, true), &factory, &scheduler);

        controller.start().await;
        let first = controller.handle().map(ServiceHandle::id).unwrap();
        controller.handle().unwrap().abort();
        while !controller.handle().unwrap().is_finished() {
            tokio::task::yield_now().await;
        }

        assert_eq!(controller.start().await.kind(), OutcomeKind::Started);
        assert_ne!(controller.handle().map(ServiceHandle::id).unwrap(), first);
    }

    #[tokio::test]
    async fn describe_reports_url_while_running() {
        let factory = Arc::new(FakeFactory::new());
        let scheduler = Arc::new(CountingScheduler::new());
        let mut controller = controller(config(8888, true), &factory, &scheduler);

        assert_eq!(controller.describe(), "Web UI is stopped");
        controller.start().await;
        assert!(controller.describe().starts_with("Web UI is running at http://localhost:8888"));
    }

    #[tokio::test]
    async fn start_after_teardown_is_refused() {
        let factory = Arc::new(FakeFactory::new());
        let scheduler = Arc::new(CountingScheduler::new());
        let mut controller = controller(config(8888, true), &factory, &scheduler);

        controller.start().await;
        controller.on_host_teardown().await.unwrap();
        assert!(controller.is_torn_down());

        assert_eq!(controller.start().await, StartOutcome::ShuttingDown);
        assert_eq!(controller.status(), Status::Stopped);
        assert_eq!(factory.builds.load(Ordering::SeqCst), 1);
        assert_eq!(scheduler.scheduled.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn teardown_waits_for_a_stopped_server() {
        let factory = Arc::new(FakeFactory::new());
        let scheduler = Arc::new(CountingScheduler::new());
        let mut controller = controller(config(8888, true), &factory, &scheduler);

        controller.start().await;
        let first = controller.handle().map(ServiceHandle::id).unwrap();
        controller.stop();
        assert!(controller.draining.as_ref().is_some_and(|h| h.id() == first));

        controller.on_host_teardown().await.unwrap();
        assert!(controller.draining.is_none());
    }

    fn real_controller(config: WebUiConfig) -> LifecycleController {
        LifecycleController::new(
            config,
            Arc::new(CollaboratorRegistry::new()),
            Arc::new(AxumServiceFactory::new()),
            Arc::new(TokioScheduler::new()),
        )
    }

    async fn fetch_debug(addr: std::net::SocketAddr) -> String {
        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /api/debug HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test]
    async fn restarts_on_a_fixed_port() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let mut controller = real_controller(WebUiConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..WebUiConfig::default()
        });

        for _ in 0..3 {
            let StartOutcome::Started { addr, .. } = controller.start().await else {
                panic!("web UI did not start on port {}", port);
            };
            assert_eq!(addr.port(), port);
            assert!(fetch_debug(addr).await.starts_with("HTTP/1.1 200 OK"));
            assert_eq!(controller.stop(), StopOutcome::Stopped);
        }

        controller.on_host_teardown().await.unwrap();
        assert!(std::net::TcpListener::bind(("127.0.0.1", port)).is_ok());
    }

    #[tokio::test]
    async fn serves_http_on_an_ephemeral_port() {
        let config = WebUiConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            ..WebUiConfig::default()
        };
        let mut controller = real_controller(config);

        let StartOutcome::Started { addr, url } = controller.start().await else {
            panic!("web UI did not start");
        };
        assert_eq!(url, format!("http://localhost:{}", addr.port()));

        let response = fetch_debug(addr).await;
        assert!(response.starts_with("HTTP/1.1 200 OK"));
        assert!(response.contains("\"webui_initialized\":true"));

        controller.shutdown().await.unwrap();
        assert_eq!(controller.status(), Status::Stopped);
    }

    #[tokio::test]
    async fn port_in_use_is_reported_as_failure() {
        let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = occupied.local_addr().unwrap().port();
        let config = WebUiConfig {
            host: "127.0.0.1".to_string(),
            port,
            ..WebUiConfig::default()
        };
        let mut controller = real_controller(config);

        let outcome = controller.start().await;
        assert_eq!(outcome.kind(), OutcomeKind::Failed);
        assert!(outcome.to_string().contains(&format!("127.0.0.1:{}", port)));
        assert_eq!(controller.status(), Status::Stopped);
    }
}
