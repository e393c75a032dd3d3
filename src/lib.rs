//! # hwwatch - Hardware Register Monitor
//!
//! Periodically samples a board's hardware registers (external-input
//! counter, push-switch counter and two voltage rails), keeps a bounded
//! history per channel and runs external actions when configured
//! conditions hold.
//!
//! ## Features
//!
//! - **Bounded history**: newest-first samples per channel, exported to
//!   actions as `EXTIN_HISTORY`, `PUSHSW_HISTORY`, `VOLTAGE_HISTORY`,
//!   `VOLTAGE1_HISTORY` and `VOLTAGE2_HISTORY`
//! - **Conditions**: `over`, `under`, `any` and `none`, level-triggered or
//!   oneshot (once per high period)
//! - **Actions**: an executable, a directory of executables, or a shell line
//! - **Register access**: sysfs files, or I2C via rppal (feature-gated)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hwwatch::{CommandRunner, Config, Engine, Environment, RegisterSource, SysfsBus};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("/etc/hwwatch/config.json")?;
//!     let source = RegisterSource::new(SysfsBus::new("/sys/class/hwwatch/board0"));
//!     let mut engine = Engine::from_config(&config, Environment::from_host(), source, CommandRunner::new());
//!
//!     engine.run_pass()?;
//!     Ok(())
//! }
//! ```

pub mod action;
pub mod config;
pub mod engine;
pub mod environment;
pub mod error;
pub mod monitor;
pub mod source;

// Re-export public API
pub use action::{ActionRunner, CommandRunner, DispatchReport, Invocation};
pub use config::{CommandConfig, Config, MonitorConfig};
pub use engine::{Engine, PassSummary};
pub use environment::Environment;
pub use error::{MonitorError, Result};
pub use monitor::{Channel, Condition, HistoryBuffer, Monitor, Sample, Trigger, TriggerState};
pub use source::{DefaultBus, RegisterBus, RegisterSource, SampleSource, SysfsBus};

/// The default configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/hwwatch/config.json";
