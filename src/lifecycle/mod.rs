//! Embedded server lifecycle
//!
//! Decides whether the web UI may run, starts it as a background task,
//! tracks it, and guarantees it is gone when the operator or the host says so.
//!
//! # Lifecycle Phases
//!
//! ```text
//! 1. Plugin construction                 ← config snapshot taken
//!    ↓
//! [Stopped]
//!    ↓  start()
//! 2. ServiceFactory::build               ← socket bound, collaborators wired
//!    ↓
//! 3. Scheduler::schedule                 ← background task + ServiceHandle
//!    ↓
//! [Running]
//!    ↓  stop()
//! 4. ServiceHandle::cancel               ← graceful shutdown signalled
//!    ↓
//! [Stopped]  ... start()/stop() may repeat ...
//!    ↓
//! 5. OnHostTeardown                      ← stop + bounded drain
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use webui_host::lifecycle::{LifecycleController, TokioScheduler};
//! use webui_host::server::AxumServiceFactory;
//!
//! let mut controller = LifecycleController::new(
//!     config,
//!     Arc::new(collaborators),
//!     Arc::new(AxumServiceFactory::new()),
//!     Arc::new(TokioScheduler::new()),
//! );
//!
//! println!("{}", controller.start().await);
//! println!("{}", controller.stop());
//! ```

mod controller;
mod error;
mod factory;
mod handle;
mod outcome;
mod scheduler;
mod shutdown;
mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use controller::{LifecycleController, Status};
pub use error::{LifecycleError, Result};
pub use factory::ServiceFactory;
pub use handle::{CancelSignal, HandleId, ServiceHandle};
pub use outcome::{OutcomeKind, StartOutcome, StopOutcome};
pub use scheduler::{RunnableServer, Scheduler, ServeFuture, TokioScheduler};
pub use shutdown::{TeardownHook, shutdown_signal};
pub use traits::OnHostTeardown;
