//! Channels and the samples they produce.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::MonitorError;

/// A physical quantity exposed by the board's registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    /// External-input event counter
    Extin,
    /// Push-switch press counter
    Pushsw,
    /// Supply voltage rails
    Voltage,
}

impl Channel {
    /// All channels, in register order.
    pub const ALL: [Channel; 3] = [Channel::Extin, Channel::Pushsw, Channel::Voltage];

    /// Name used in configuration files and log output.
    pub fn name(&self) -> &'static str {
        match self {
            Channel::Extin => "extin",
            Channel::Pushsw => "pushsw",
            Channel::Voltage => "voltage",
        }
    }

    /// Whether samples of this channel are a rail tuple rather than a scalar.
    pub fn is_tuple(&self) -> bool {
        matches!(self, Channel::Voltage)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Channel {
    type Err = MonitorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "extin" => Ok(Channel::Extin),
            "pushsw" => Ok(Channel::Pushsw),
            "voltage" => Ok(Channel::Voltage),
            other => Err(MonitorError::config_error(format!(
                "unknown channel '{}' (expected extin, pushsw or voltage)",
                other
            ))),
        }
    }
}

/// One reading of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Sample {
    /// Single counter value
    Scalar(f64),
    /// Voltage rails in volts, with `max` the higher of the two
    Rails { max: f64, rail1: f64, rail2: f64 },
}

impl Sample {
    /// Build a rail sample, deriving the combined value.
    pub fn rails(rail1: f64, rail2: f64) -> Self {
        Sample::Rails {
            max: rail1.max(rail2),
            rail1,
            rail2,
        }
    }

    /// The scalar picked out by a trigger's sub-channel selector.
    ///
    /// Scalars ignore the selector. Rails map 1 and 2 to the individual
    /// rails and anything else to the combined value.
    pub fn component(&self, selector: u8) -> f64 {
        match *self {
            Sample::Scalar(value) => value,
            Sample::Rails { max, rail1, rail2 } => match selector {
                1 => rail1,
                2 => rail2,
                _ => max,
            },
        }
    }
}

impl fmt::Display for Sample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sample::Scalar(value) => write!(f, "{}", value),
            Sample::Rails { max, rail1, rail2 } => {
                write!(f, "{} (rail1 {}, rail2 {})", max, rail1, rail2)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_names_round_trip() {
        for channel in Channel::ALL {
            assert_eq!(channel.name().parse::<Channel>().unwrap(), channel);
        }
        assert!("temperature".parse::<Channel>().is_err());
    }

    #[test]
    fn test_rails_take_the_higher_rail_as_max() {
        let sample = Sample::rails(11.8, 12.1);
        assert_eq!(sample.component(0), 12.1);
        assert_eq!(sample.component(1), 11.8);
        assert_eq!(sample.component(2), 12.1);
        assert_eq!(sample.component(7), 12.1);
    }

    #[test]
    fn test_scalar_ignores_selector() {
        let sample = Sample::Scalar(5.0);
        assert_eq!(sample.component(0), 5.0);
        assert_eq!(sample.component(2), 5.0);
        assert_eq!(sample.to_string(), "5");
    }
}
