//! Runnable servers and the scheduler that runs them in the background.

use super::{LifecycleError, Result, ServiceHandle};
use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;

/// Future driving a server until it is told to stop
pub type ServeFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

type ServeFn = Box<dyn FnOnce(CancellationToken) -> ServeFuture + Send>;

/// A server that is bound and wired, but not yet running
///
/// Produced by a [`ServiceFactory`](super::ServiceFactory). The serve closure
/// receives the token it must watch for shutdown.
pub struct RunnableServer {
    local_addr: SocketAddr,
    serve: ServeFn,
}

impl RunnableServer {
    pub fn new<F, Fut>(local_addr: SocketAddr, serve: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Self {
            local_addr,
            serve: Box::new(move |token: CancellationToken| -> ServeFuture {
                Box::pin(serve(token))
            }),
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Turn the server into a future that stops once `shutdown` is cancelled
    pub fn into_future(self, shutdown: CancellationToken) -> ServeFuture {
        (self.serve)(shutdown)
    }
}

impl fmt::Debug for RunnableServer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunnableServer")
            .field("local_addr", &self.local_addr)
            .finish_non_exhaustive()
    }
}

/// Host-provided primitive that runs a server as a background task
pub trait Scheduler: Send + Sync {
    /// Start running `server` and return the handle that controls it
    fn schedule(&self, server: RunnableServer) -> Result<ServiceHandle>;
}

/// Schedules servers on a tokio runtime, cancelled through a [`CancellationToken`]
#[derive(Debug, Clone, Default)]
pub struct TokioScheduler {
    runtime: Option<Handle>,
}

impl TokioScheduler {
    /// Schedule onto whatever runtime is current when `schedule` is called
    pub fn new() -> Self {
        Self::default()
    }

    /// Always schedule onto the given runtime
    pub fn on(runtime: Handle) -> Self {
        Self {
            runtime: Some(runtime),
        }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, server: RunnableServer) -> Result<ServiceHandle> {
        let runtime = match &self.runtime {
            Some(runtime) => runtime.clone(),
            None => Handle::try_current().map_err(|e| LifecycleError::schedule(e.to_string()))?,
        };

        let token = CancellationToken::new();
        let local_addr = server.local_addr();
        let task = runtime.spawn(server.into_future(token.clone()));
        tracing::debug!("Scheduled server task for {}", local_addr);

        Ok(ServiceHandle::new(local_addr, token, task))
    }
}
