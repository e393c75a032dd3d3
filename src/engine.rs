//! The evaluation engine driving one pass over every monitor.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, info};

use crate::action::{ActionRunner, DispatchReport};
use crate::config::Config;
use crate::environment::Environment;
use crate::error::Result;
use crate::monitor::Monitor;
use crate::source::SampleSource;

/// Counters for one evaluation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Triggers that decided to fire
    pub fired: usize,
    /// Invocations started
    pub invoked: usize,
    /// Invocations that could not be started
    pub failed: usize,
}

impl PassSummary {
    pub(crate) fn record(&mut self, report: DispatchReport) {
        self.fired += 1;
        self.invoked += report.invoked;
        self.failed += report.failed;
    }

    fn absorb(&mut self, other: PassSummary) {
        self.fired += other.fired;
        self.invoked += other.invoked;
        self.failed += other.failed;
    }
}

/// Owns the monitors, the shared environment and the collaborators used to
/// sample channels and run actions.
pub struct Engine<S, R> {
    monitors: Vec<Monitor>,
    env: Environment,
    source: S,
    runner: R,
    passes: u64,
}

impl<S: SampleSource, R: ActionRunner> Engine<S, R> {
    /// Create an engine. Monitors are evaluated in the given order.
    pub fn new(monitors: Vec<Monitor>, env: Environment, source: S, runner: R) -> Self {
        Self {
            monitors,
            env,
            source,
            runner,
            passes: 0,
        }
    }

    /// Build monitors from a validated configuration, in file order.
    pub fn from_config(config: &Config, env: Environment, source: S, runner: R) -> Self {
        Self::new(config.build_monitors(), env, source, runner)
    }

    /// Sample every channel, export its history and evaluate its triggers.
    ///
    /// History variables accumulate in the shared environment, so an action
    /// sees the history of every monitor sampled so far, including earlier
    /// passes. A hardware read failure aborts the pass and is returned;
    /// action failures are logged and counted in the summary.
    pub fn run_pass(&mut self) -> Result<PassSummary> {
        self.passes += 1;
        debug!(pass = self.passes, "starting pass");

        let mut summary = PassSummary::default();
        for monitor in &mut self.monitors {
            monitor.sample(&mut self.source)?;
            self.env.merge(monitor.export_history());
            summary.absorb(monitor.evaluate_pass(&self.env, &mut self.runner)?);
        }

        if summary.fired > 0 {
            info!(
                pass = self.passes,
                fired = summary.fired,
                invoked = summary.invoked,
                failed = summary.failed,
                "pass complete"
            );
        } else {
            debug!(pass = self.passes, "pass complete");
        }
        Ok(summary)
    }

    /// Run passes back to back, sleeping `interval` between them, until
    /// `shutdown` completes or a pass fails.
    ///
    /// Shutdown is observed between passes and during the sleep; a pass in
    /// progress always runs to completion first.
    pub async fn run_until<F>(&mut self, interval: Duration, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        loop {
            self.run_pass()?;
            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = &mut shutdown => {
                    info!(passes = self.passes, "shutdown requested");
                    return Ok(());
                }
            }
        }
    }

    pub fn monitors(&self) -> &[Monitor] {
        &self.monitors
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Number of passes started so far.
    pub fn pass_count(&self) -> u64 {
        self.passes
    }
}
