//! Monitor configuration.
//!
//! The configuration file is a JSON object with a positive `interval` in
//! seconds plus one entry per monitored channel:
//!
//! ```json
//! {
//!   "interval": 5,
//!   "voltage": {
//!     "history_size": 10,
//!     "commands": [
//!       { "action": "/etc/hwwatch/low-voltage.d", "condition": "under",
//!         "threshold": 11.5, "oneshot": true, "channel": 1 }
//!     ]
//!   }
//! }
//! ```
//!
//! Monitors are evaluated in the order their keys appear in the file.

use serde::{Deserialize, Deserializer};
use serde_json::error::Category;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::error::{MonitorError, Result};
use crate::monitor::{Channel, Condition, Monitor, Trigger};

/// Validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    interval: Duration,
    /// Monitors in evaluation order
    pub monitors: Vec<MonitorConfig>,
}

/// Configuration of one channel's monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub channel: Channel,
    pub history_size: usize,
    pub commands: Vec<CommandConfig>,
}

/// Configuration of one trigger.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandConfig {
    /// Directory, executable or shell command line
    pub action: String,
    pub condition: Condition,
    /// Defaults to 0
    pub threshold: f64,
    /// Defaults to false
    pub oneshot: bool,
    /// Sub-channel selector, normalized to 0, 1 or 2
    pub channel: u8,
}

/// File layout: `interval` plus one object per channel, in file order.
#[derive(Deserialize)]
struct RawConfig {
    #[serde(deserialize_with = "interval_secs")]
    interval: Duration,
    #[serde(flatten)]
    channels: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawMonitor {
    #[serde(deserialize_with = "positive_size")]
    history_size: usize,
    #[serde(default)]
    commands: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct RawCommand {
    action: String,
    condition: Condition,
    #[serde(default)]
    threshold: Option<f64>,
    #[serde(default)]
    oneshot: Option<bool>,
    /// Loosely typed; anything but 1 or 2 selects the combined value.
    #[serde(default)]
    channel: Value,
}

impl Config {
    /// Load and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            MonitorError::config_error(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&text)
    }

    /// Parse and validate configuration text.
    ///
    /// Malformed JSON is a [`MonitorError::Parse`]; well-formed JSON with
    /// missing or invalid fields is a [`MonitorError::Config`].
    pub fn from_json_str(text: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(text).map_err(|e| match e.classify() {
            Category::Data => MonitorError::config_error(e.to_string()),
            _ => MonitorError::Parse(e),
        })?;

        let monitors = raw
            .channels
            .into_iter()
            .map(|(key, value)| parse_monitor(&key, value))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            interval: raw.interval,
            monitors,
        })
    }

    /// Override the interval, e.g. from the command line.
    pub fn with_interval(mut self, secs: f64) -> Result<Self> {
        self.interval = checked_interval(secs).ok_or_else(|| {
            MonitorError::config_error(format!(
                "interval must be a positive number of seconds, got {}",
                secs
            ))
        })?;
        Ok(self)
    }

    /// Time to sleep between passes.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Build armed monitors in configuration order.
    pub fn build_monitors(&self) -> Vec<Monitor> {
        self.monitors.iter().map(MonitorConfig::build).collect()
    }
}

impl MonitorConfig {
    pub fn build(&self) -> Monitor {
        self.commands
            .iter()
            .fold(Monitor::new(self.channel, self.history_size), |monitor, cmd| {
                monitor.with_trigger(cmd.build())
            })
    }
}

impl CommandConfig {
    pub fn build(&self) -> Trigger {
        Trigger::new(self.action.clone(), self.condition)
            .with_threshold(self.threshold)
            .with_oneshot(self.oneshot)
            .with_selector(i64::from(self.channel))
    }
}

/// A positive interval that fits in a non-zero [`Duration`].
fn checked_interval(secs: f64) -> Option<Duration> {
    if secs > 0.0 {
        Duration::try_from_secs_f64(secs)
            .ok()
            .filter(|interval| !interval.is_zero())
    } else {
        None
    }
}

fn interval_secs<'de, D>(deserializer: D) -> std::result::Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value.as_f64().and_then(checked_interval).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "'interval' must be a positive number of seconds, got {}",
            value
        ))
    })
}

fn positive_size<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    value
        .as_u64()
        .filter(|size| *size > 0)
        .and_then(|size| usize::try_from(size).ok())
        .ok_or_else(|| {
            serde::de::Error::custom(format!(
                "'history_size' must be a positive integer, got {}",
                value
            ))
        })
}

fn parse_monitor(key: &str, value: Value) -> Result<MonitorConfig> {
    let channel: Channel = key.parse()?;
    let raw: RawMonitor = serde_json::from_value(value)
        .map_err(|e| MonitorError::config_error(format!("{}: {}", key, e)))?;

    let commands = raw
        .commands
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, item)| parse_command(channel, i, item))
        .collect::<Result<Vec<_>>>()?;

    Ok(MonitorConfig {
        channel,
        history_size: raw.history_size,
        commands,
    })
}

fn parse_command(channel: Channel, index: usize, value: Value) -> Result<CommandConfig> {
    let ctx = format!("{}.commands[{}]", channel, index);
    let raw: RawCommand = serde_json::from_value(value)
        .map_err(|e| MonitorError::config_error(format!("{}: {}", ctx, e)))?;

    if raw.action.trim().is_empty() {
        return Err(MonitorError::config_error(format!(
            "{}: 'action' must be a non-empty string",
            ctx
        )));
    }

    let selector = match raw.channel.as_i64() {
        Some(1) => 1,
        Some(2) => 2,
        _ => 0,
    };
    if selector != 0 && !channel.is_tuple() {
        warn!(
            "{}: 'channel' selects a rail but {} has a single value; ignoring it",
            ctx, channel
        );
    }

    Ok(CommandConfig {
        action: raw.action,
        condition: raw.condition,
        threshold: raw.threshold.unwrap_or(0.0),
        oneshot: raw.oneshot.unwrap_or(false),
        channel: selector,
    })
}
