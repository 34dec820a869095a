//! Host teardown
//!
//! Runs [`OnHostTeardown`] when the host goes away, either because the host
//! calls it directly or because the process received SIGINT/SIGTERM.

use super::{OnHostTeardown, Result};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::signal;
use tokio::sync::Mutex;

/// Runs the teardown of a shared component at most once
///
/// Clones share the "already ran" flag, so the host's own shutdown path and a
/// signal listener can both hold one without tearing down twice.
///
/// # Example
///
/// ```rust,ignore
/// let hook = TeardownHook::new(Arc::clone(&controller));
///
/// tokio::spawn({
///     let hook = hook.clone();
///     async move { hook.wait_for_signal().await }
/// });
///
/// // host unloading the plugin
/// hook.run().await?;
/// ```
pub struct TeardownHook<T: OnHostTeardown> {
    target: Arc<Mutex<T>>,
    fired: Arc<AtomicBool>,
}

impl<T: OnHostTeardown> Clone for TeardownHook<T> {
    fn clone(&self) -> Self {
        Self {
            target: Arc::clone(&self.target),
            fired: Arc::clone(&self.fired),
        }
    }
}

impl<T: OnHostTeardown> TeardownHook<T> {
    pub fn new(target: Arc<Mutex<T>>) -> Self {
        Self {
            target,
            fired: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn has_run(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Tear the target down; later calls return `Ok(())` without doing anything
    pub async fn run(&self) -> Result<()> {
        if self.fired.swap(true, Ordering::SeqCst) {
            tracing::debug!("Host teardown already ran");
            return Ok(());
        }

        tracing::info!("Running host teardown...");
        let result = self.target.lock().await.on_host_teardown().await;
        match &result {
            Ok(()) => tracing::info!("Host teardown complete"),
            Err(e) => tracing::error!("Error during host teardown: {}", e),
        }
        result
    }

    /// Wait for SIGINT/SIGTERM, then run the teardown
    pub async fn wait_for_signal(&self) {
        shutdown_signal().await;
        // failure already logged by run()
        let _ = self.run().await;
    }
}

/// Completes when the process receives Ctrl+C or SIGTERM
///
/// If a handler can't be installed that source is logged and ignored, so the
/// future then only completes on the other one.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal");
        },
    }
}
