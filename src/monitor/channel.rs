//! A monitor owns the history and rules of one channel.

use tracing::{debug, info};

use super::history::HistoryBuffer;
use super::sample::{Channel, Sample};
use super::trigger::Trigger;
use crate::action::ActionRunner;
use crate::engine::PassSummary;
use crate::environment::Environment;
use crate::error::{MonitorError, Result};
use crate::source::SampleSource;

/// Sampling and rule evaluation for one channel.
#[derive(Debug, Clone)]
pub struct Monitor {
    channel: Channel,
    history: HistoryBuffer,
    triggers: Vec<Trigger>,
}

impl Monitor {
    pub fn new(channel: Channel, history_size: usize) -> Self {
        Self {
            channel,
            history: HistoryBuffer::new(history_size),
            triggers: Vec::new(),
        }
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    /// Read the channel and record the value.
    pub fn sample<S: SampleSource + ?Sized>(&mut self, source: &mut S) -> Result<Sample> {
        let sample = source.read(self.channel)?;
        debug!(channel = %self.channel, %sample, "sampled");
        self.history.push(sample);
        Ok(sample)
    }

    /// Environment variables describing this channel's history.
    ///
    /// Scalar channels export `<NAME>_HISTORY`. The voltage channel exports
    /// the combined value plus one variable per rail.
    pub fn export_history(&self) -> Vec<(String, String)> {
        let prefix = self.channel.name().to_uppercase();
        let mut vars = vec![(format!("{}_HISTORY", prefix), self.history.render(0))];
        if self.channel.is_tuple() {
            for rail in 1..=2u8 {
                vars.push((
                    format!("{}{}_HISTORY", prefix, rail),
                    self.history.render(rail),
                ));
            }
        }
        vars
    }

    /// Latest value of the component a selector refers to.
    pub fn selected_value(&self, selector: u8) -> Result<f64> {
        self.history
            .latest()
            .map(|sample| sample.component(selector))
            .ok_or(MonitorError::EmptyHistory(self.channel))
    }

    /// Evaluate every trigger in configured order, dispatching those that fire.
    pub fn evaluate_pass<R: ActionRunner + ?Sized>(
        &mut self,
        env: &Environment,
        runner: &mut R,
    ) -> Result<PassSummary> {
        let mut summary = PassSummary::default();
        for i in 0..self.triggers.len() {
            let value = self.selected_value(self.triggers[i].selector())?;
            let trigger = &mut self.triggers[i];
            if !trigger.step(value) {
                continue;
            }

            info!(
                channel = %self.channel,
                value,
                condition = %trigger.condition(),
                threshold = trigger.threshold(),
                action = %trigger.action(),
                "trigger fired"
            );
            let report = trigger.fire(env, runner);
            summary.record(report);
        }

        Ok(summary)
    }
}
