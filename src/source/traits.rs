//! Traits for sample acquisition.

use crate::error::Result;
use crate::monitor::{Channel, Sample};

use super::registers::Register;

/// Supplies the current value of a channel on demand.
///
/// Implementations return [`MonitorError::HardwareRead`] when the underlying
/// access fails; the engine does not retry.
///
/// [`MonitorError::HardwareRead`]: crate::error::MonitorError::HardwareRead
pub trait SampleSource {
    /// Read one sample of `channel`.
    fn read(&mut self, channel: Channel) -> Result<Sample>;
}

impl<T: SampleSource + ?Sized> SampleSource for Box<T> {
    fn read(&mut self, channel: Channel) -> Result<Sample> {
        (**self).read(channel)
    }
}

/// Raw access to the board's 16-bit registers.
pub trait RegisterBus {
    /// Read the raw value of one register.
    fn read_register(&mut self, register: Register) -> Result<u16>;

    /// Short description used in logs.
    fn describe(&self) -> String;
}
