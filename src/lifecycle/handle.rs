//! Service Handle
//!
//! The record of a running embedded server: its background task plus the
//! means to ask it to stop.

use super::{LifecycleError, Result};
use chrono::{DateTime, Utc};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Identity of a single server run
///
/// Every successful `start()` produces a fresh id, so two runs separated by a
/// `stop()` never compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId(Uuid);

impl HandleId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.simple())
    }
}

/// Cancellation capability handed out by a [`Scheduler`](super::Scheduler)
///
/// `signal` must return without waiting for the task to exit. An `Err` means
/// the request was not delivered.
pub trait CancelSignal: Send + Sync {
    /// Deliver the cancellation request to the server task
    fn signal(&self) -> Result<()>;
}

impl CancelSignal for CancellationToken {
    fn signal(&self) -> Result<()> {
        self.cancel();
        Ok(())
    }
}

/// Handle for a running embedded server
///
/// Owned exclusively by the [`LifecycleController`](super::LifecycleController).
/// Dropping a handle that was never cancelled delivers the cancellation
/// signal, so a handle can't leave an orphaned server behind.
pub struct ServiceHandle {
    id: HandleId,
    local_addr: SocketAddr,
    started_at: DateTime<Utc>,
    signal: Box<dyn CancelSignal>,
    task: Option<JoinHandle<Result<()>>>,
    cancelled: bool,
}

impl ServiceHandle {
    /// Create a handle for a task that is already scheduled
    pub fn new(
        local_addr: SocketAddr,
        signal: impl CancelSignal + 'static,
        task: JoinHandle<Result<()>>,
    ) -> Self {
        Self {
            id: HandleId::new(),
            local_addr,
            started_at: Utc::now(),
            signal: Box::new(signal),
            task: Some(task),
            cancelled: false,
        }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Address the server socket is actually bound to
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Whether cancellation has already been delivered
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Whether the server task has exited, for whatever reason
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Ask the server task to stop
    ///
    /// Delivers the signal at most once; later calls are no-ops. Does not wait
    /// for the task to exit.
    pub fn cancel(&mut self) -> Result<()> {
        if self.cancelled {
            return Ok(());
        }
        self.signal.signal()?;
        self.cancelled = true;
        Ok(())
    }

    /// Abort the task outright, without waiting for in-flight requests
    pub fn abort(&self) {
        if let Some(task) = &self.task {
            task.abort();
        }
    }

    /// Wait for the server task to exit, aborting it once `timeout` elapses
    ///
    /// Intended to follow [`cancel`](Self::cancel); joining a task that was
    /// never told to stop simply runs into the timeout.
    pub async fn join(mut self, timeout: Duration) -> Result<()> {
        let Some(mut task) = self.task.take() else {
            return Ok(());
        };

        match tokio::time::timeout(timeout, &mut task).await {
            Ok(Ok(result)) => result,
            Ok(Err(e)) if e.is_cancelled() => Ok(()),
            Ok(Err(e)) => Err(LifecycleError::server(format!("server task panicked: {}", e))),
            Err(_) => {
                task.abort();
                // the aborted future, and the socket it owns, is dropped before we return
                let _ = task.await;
                Err(LifecycleError::timeout(
                    "drain",
                    format!("server task still running after {:?}, aborted", timeout),
                ))
            }
        }
    }
}

impl fmt::Debug for ServiceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceHandle")
            .field("id", &self.id)
            .field("local_addr", &self.local_addr)
            .field("started_at", &self.started_at)
            .field("cancelled", &self.cancelled)
            .finish_non_exhaustive()
    }
}

impl Drop for ServiceHandle {
    fn drop(&mut self) {
        if self.cancelled {
            return;
        }
        if let Err(e) = self.signal.signal() {
            tracing::warn!("Dropping handle {} without cancellation: {}", self.id, e);
            self.abort();
        }
    }
}
