//! Register map and decoding into channel samples.

use tracing::trace;

use super::traits::{RegisterBus, SampleSource};
use crate::error::Result;
use crate::monitor::{Channel, Sample};

/// Registers read by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// External-input event counter
    ExtinCount,
    /// Push-switch press counter
    PushswCount,
    /// First supply rail, in millivolts
    VoltageRail1,
    /// Second supply rail, in millivolts
    VoltageRail2,
}

impl Register {
    /// SMBus command code of the register.
    pub fn address(&self) -> u8 {
        match self {
            Register::ExtinCount => 0x00,
            Register::PushswCount => 0x01,
            Register::VoltageRail1 => 0x02,
            Register::VoltageRail2 => 0x03,
        }
    }

    /// Channel the register contributes to.
    pub fn channel(&self) -> Channel {
        match self {
            Register::ExtinCount => Channel::Extin,
            Register::PushswCount => Channel::Pushsw,
            Register::VoltageRail1 | Register::VoltageRail2 => Channel::Voltage,
        }
    }

    /// File name of the register when exposed through sysfs.
    pub fn name(&self) -> &'static str {
        match self {
            Register::ExtinCount => "extin",
            Register::PushswCount => "pushsw",
            Register::VoltageRail1 => "voltage1",
            Register::VoltageRail2 => "voltage2",
        }
    }
}

const MILLIVOLTS_PER_VOLT: f64 = 1000.0;

/// [`SampleSource`] decoding samples from a [`RegisterBus`].
///
/// Counters are reported as read. Rails are converted from millivolts to
/// volts.
pub struct RegisterSource<B> {
    bus: B,
}

impl<B: RegisterBus> RegisterSource<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    fn read_rail(&mut self, register: Register) -> Result<f64> {
        let raw = self.bus.read_register(register)?;
        Ok(f64::from(raw) / MILLIVOLTS_PER_VOLT)
    }
}

impl<B: RegisterBus> SampleSource for RegisterSource<B> {
    fn read(&mut self, channel: Channel) -> Result<Sample> {
        let sample = match channel {
            Channel::Extin => Sample::Scalar(f64::from(self.bus.read_register(Register::ExtinCount)?)),
            Channel::Pushsw => {
                Sample::Scalar(f64::from(self.bus.read_register(Register::PushswCount)?))
            }
            Channel::Voltage => {
                let rail1 = self.read_rail(Register::VoltageRail1)?;
                let rail2 = self.read_rail(Register::VoltageRail2)?;
                Sample::rails(rail1, rail2)
            }
        };
        trace!(bus = %self.bus.describe(), %channel, %sample, "decoded registers");
        Ok(sample)
    }
}
