//! Configured rules and their oneshot latch.

use tracing::debug;

use super::condition::Condition;
use crate::action::{self, ActionRunner, DispatchReport};
use crate::environment::Environment;

/// Latch state of a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TriggerState {
    /// Ready to fire on the next satisfied evaluation
    #[default]
    Armed,
    /// Fired during the current high period; waiting for the condition to clear
    Fired,
}

/// One rule: a condition on a channel component and the action it runs.
#[derive(Debug, Clone)]
pub struct Trigger {
    action: String,
    condition: Condition,
    threshold: f64,
    oneshot: bool,
    selector: u8,
    state: TriggerState,
}

impl Trigger {
    /// Create an armed, level-triggered rule with threshold 0 on selector 0.
    pub fn new(action: impl Into<String>, condition: Condition) -> Self {
        Self {
            action: action.into(),
            condition,
            threshold: 0.0,
            oneshot: false,
            selector: 0,
            state: TriggerState::Armed,
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_oneshot(mut self, oneshot: bool) -> Self {
        self.oneshot = oneshot;
        self
    }

    /// Set the sub-channel selector. Anything but 1 or 2 becomes 0.
    pub fn with_selector(mut self, selector: i64) -> Self {
        self.selector = normalize_selector(selector);
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_oneshot(&self) -> bool {
        self.oneshot
    }

    pub fn selector(&self) -> u8 {
        self.selector
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Evaluate the condition against `value` and advance the latch.
    ///
    /// Returns whether the action should run for this pass. Level-triggered
    /// rules fire on every satisfied pass; oneshot rules fire once per high
    /// period and re-arm only after the condition is seen false.
    pub fn step(&mut self, value: f64) -> bool {
        let result = self.condition.evaluate(value, self.threshold);

        if !self.oneshot {
            return result;
        }

        let (next, fire) = match (self.state, result) {
            (TriggerState::Armed, true) => (TriggerState::Fired, true),
            (TriggerState::Armed, false) => (TriggerState::Armed, false),
            (TriggerState::Fired, true) => (TriggerState::Fired, false),
            (TriggerState::Fired, false) => (TriggerState::Armed, false),
        };

        if next != self.state {
            debug!(
                action = %self.action,
                from = ?self.state,
                to = ?next,
                "oneshot latch changed"
            );
        }
        self.state = next;
        fire
    }

    /// Run the action with the shared environment plus `THRESHOLD`.
    pub fn fire<R: ActionRunner + ?Sized>(
        &self,
        env: &Environment,
        runner: &mut R,
    ) -> DispatchReport {
        let call_env = env.with_threshold(self.threshold);
        action::dispatch(&self.action, &call_env, runner)
    }
}

fn normalize_selector(selector: i64) -> u8 {
    match selector {
        1 => 1,
        2 => 2,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Value sequence false, true, true, false, true against `over 4`.
    const EDGE_SEQUENCE: [f64; 5] = [3.0, 5.0, 6.0, 2.0, 9.0];

    fn firing_positions(trigger: &mut Trigger, values: &[f64]) -> Vec<usize> {
        values
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| trigger.step(v).then_some(i + 1))
            .collect()
    }

    #[test]
    fn test_oneshot_fires_on_rising_edges_only() {
        let mut trigger = Trigger::new("alert", Condition::Over)
            .with_threshold(4.0)
            .with_oneshot(true);
        assert_eq!(firing_positions(&mut trigger, &EDGE_SEQUENCE), vec![2, 5]);
    }

    #[test]
    fn test_level_trigger_fires_every_true_pass() {
        let mut trigger = Trigger::new("alert", Condition::Over).with_threshold(4.0);
        assert_eq!(firing_positions(&mut trigger, &EDGE_SEQUENCE), vec![2, 3, 5]);
    }

    #[test]
    fn test_oneshot_state_transitions() {
        let mut trigger = Trigger::new("alert", Condition::Under)
            .with_threshold(12.0)
            .with_oneshot(true);
        assert_eq!(trigger.state(), TriggerState::Armed);

        assert!(!trigger.step(12.5));
        assert_eq!(trigger.state(), TriggerState::Armed);

        assert!(trigger.step(11.9));
        assert_eq!(trigger.state(), TriggerState::Fired);

        assert!(!trigger.step(11.0));
        assert_eq!(trigger.state(), TriggerState::Fired);

        assert!(!trigger.step(12.1));
        assert_eq!(trigger.state(), TriggerState::Armed);
    }

    #[test]
    fn test_oneshot_any_fires_once_forever() {
        let mut trigger = Trigger::new("boot", Condition::Any).with_oneshot(true);
        assert_eq!(firing_positions(&mut trigger, &[0.0, 1.0, 2.0, 3.0]), vec![1]);
    }

    #[test]
    fn test_never_condition_never_fires() {
        let mut trigger = Trigger::new("noop", Condition::Never);
        assert!(firing_positions(&mut trigger, &EDGE_SEQUENCE).is_empty());
    }

    #[test]
    fn test_selector_normalization() {
        let trigger = Trigger::new("a", Condition::Any);
        assert_eq!(trigger.selector(), 0);
        assert_eq!(trigger.clone().with_selector(1).selector(), 1);
        assert_eq!(trigger.clone().with_selector(2).selector(), 2);
        assert_eq!(trigger.clone().with_selector(3).selector(), 0);
        assert_eq!(trigger.with_selector(-1).selector(), 0);
    }

    #[test]
    fn test_defaults() {
        let trigger = Trigger::new("a", Condition::Over);
        assert_eq!(trigger.threshold(), 0.0);
        assert!(!trigger.is_oneshot());
        assert_eq!(trigger.action(), "a");
    }
}
