//! Action dispatch.
//!
//! Dispatching happens in two stages: the action string is [`resolve`]d into
//! a list of [`Invocation`]s, then each one is handed to an [`ActionRunner`].
//! Failures are logged and counted, never propagated, so a broken action
//! cannot stop monitoring.

pub mod resolve;
pub mod runner;

pub use resolve::{resolve, Invocation};
pub use runner::CommandRunner;

use tracing::{error, info};

use crate::environment::Environment;
use crate::error::{MonitorError, Result};

/// Executes resolved invocations.
pub trait ActionRunner {
    /// Run one invocation with `env` as its complete environment.
    ///
    /// Returns [`MonitorError::ActionDispatch`] when the invocation could
    /// not be started. How it exits is not inspected.
    fn run(&mut self, invocation: &Invocation, env: &Environment) -> Result<()>;
}

/// Outcome of dispatching one action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Invocations started successfully
    pub invoked: usize,
    /// Invocations (or directory scans) that failed
    pub failed: usize,
}

/// Resolve `action` and run every resulting invocation in order.
pub fn dispatch<R: ActionRunner + ?Sized>(
    action: &str,
    env: &Environment,
    runner: &mut R,
) -> DispatchReport {
    let mut report = DispatchReport::default();

    let invocations = match resolve(action) {
        Ok(invocations) => invocations,
        Err(e) => {
            let err = MonitorError::dispatch_error(action, e);
            error!("{}", err);
            report.failed += 1;
            return report;
        }
    };

    for invocation in &invocations {
        info!(%invocation, "invoking action");
        match runner.run(invocation, env) {
            Ok(()) => report.invoked += 1,
            Err(e) => {
                error!("{}", e);
                report.failed += 1;
            }
        }
    }

    report
}
