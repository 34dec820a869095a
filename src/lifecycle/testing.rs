//! Test doubles for the factory and scheduler seams.

use super::{
    CancelSignal, LifecycleError, Result, RunnableServer, Scheduler, ServiceFactory, ServiceHandle,
};
use crate::config::WebUiConfig;
use crate::di::CollaboratorRegistry;
use async_trait::async_trait;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

/// Builds servers that idle until cancelled, without touching the network
pub(crate) struct FakeFactory {
    pub builds: AtomicUsize,
    pub fail: AtomicBool,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self {
            builds: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }

    /// Fails every build with a bind error until `fail` is cleared
    pub fn failing() -> Self {
        let factory = Self::new();
        factory.fail.store(true, Ordering::SeqCst);
        factory
    }
}

#[async_trait]
impl ServiceFactory for FakeFactory {
    async fn build(
        &self,
        config: &WebUiConfig,
        _collaborators: Arc<CollaboratorRegistry>,
    ) -> Result<RunnableServer> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(LifecycleError::bind(
                config.bind_address(),
                std::io::Error::new(std::io::ErrorKind::AddrInUse, "address in use"),
            ));
        }
        let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
        Ok(RunnableServer::new(addr, |token| async move {
            token.cancelled().await;
            Ok(())
        }))
    }
}

struct CountingSignal {
    token: CancellationToken,
    cancels: Arc<AtomicUsize>,
    fail: Arc<AtomicBool>,
}

impl CancelSignal for CountingSignal {
    fn signal(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(LifecycleError::cancellation_failed("signal rejected"));
        }
        self.cancels.fetch_add(1, Ordering::SeqCst);
        self.token.cancel();
        Ok(())
    }
}

/// Tokio-backed scheduler that counts schedules and delivered cancellations
pub(crate) struct CountingScheduler {
    pub scheduled: AtomicUsize,
    pub cancels: Arc<AtomicUsize>,
    pub fail_cancel: Arc<AtomicBool>,
    pub tokens: Mutex<Vec<CancellationToken>>,
    refuse: bool,
}

impl CountingScheduler {
    pub fn new() -> Self {
        Self {
            scheduled: AtomicUsize::new(0),
            cancels: Arc::new(AtomicUsize::new(0)),
            fail_cancel: Arc::new(AtomicBool::new(false)),
            tokens: Mutex::new(Vec::new()),
            refuse: false,
        }
    }

    /// Rejects every server it is given
    pub fn refusing() -> Self {
        Self {
            refuse: true,
            ..Self::new()
        }
    }
}

impl Scheduler for CountingScheduler {
    fn schedule(&self, server: RunnableServer) -> Result<ServiceHandle> {
        if self.refuse {
            return Err(LifecycleError::schedule("scheduler is shutting down"));
        }
        self.scheduled.fetch_add(1, Ordering::SeqCst);

        let token = CancellationToken::new();
        self.tokens.lock().unwrap().push(token.clone());
        let local_addr = server.local_addr();
        let task = tokio::spawn(server.into_future(token.clone()));
        let signal = CountingSignal {
            token,
            cancels: Arc::clone(&self.cancels),
            fail: Arc::clone(&self.fail_cancel),
        };
        Ok(ServiceHandle::new(local_addr, signal, task))
    }
}
