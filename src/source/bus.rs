//! Register bus implementations.
//!
//! Direct I2C access is feature-gated so the crate builds on machines
//! without the hardware. Registers exposed by a kernel driver can always be
//! read through [`SysfsBus`].

use std::fs;
use std::path::{Path, PathBuf};

use super::registers::Register;
use super::traits::RegisterBus;
use crate::error::{MonitorError, Result};

/// Reads each register from a file named after it under a directory.
///
/// Files hold a decimal or `0x`-prefixed hexadecimal value.
#[derive(Debug, Clone)]
pub struct SysfsBus {
    root: PathBuf,
}

impl SysfsBus {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RegisterBus for SysfsBus {
    fn read_register(&mut self, register: Register) -> Result<u16> {
        let path = self.root.join(register.name());
        let text = fs::read_to_string(&path).map_err(|e| {
            MonitorError::hardware_error(
                register.channel(),
                format!("cannot read {}: {}", path.display(), e),
            )
        })?;
        parse_register_value(text.trim()).ok_or_else(|| {
            MonitorError::hardware_error(
                register.channel(),
                format!("invalid value '{}' in {}", text.trim(), path.display()),
            )
        })
    }

    fn describe(&self) -> String {
        format!("sysfs:{}", self.root.display())
    }
}

fn parse_register_value(text: &str) -> Option<u16> {
    match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u16::from_str_radix(hex, 16).ok(),
        None => text.parse().ok(),
    }
}

#[cfg(feature = "i2c")]
mod i2c {
    use super::*;
    use rppal::i2c::I2c;

    /// Default I2C bus on the Raspberry Pi header.
    pub const DEFAULT_BUS: u8 = 1;

    /// Default slave address of the board controller.
    pub const DEFAULT_ADDRESS: u16 = 0x20;

    /// Register access over SMBus word reads using rppal.
    pub struct I2cBus {
        i2c: I2c,
        bus: u8,
        address: u16,
    }

    impl I2cBus {
        /// Open `bus` and select the controller at `address`.
        pub fn new(bus: u8, address: u16) -> Result<Self> {
            let mut i2c = I2c::with_bus(bus).map_err(|e| {
                MonitorError::hardware_error(
                    crate::monitor::Channel::Voltage,
                    format!("failed to open I2C bus {}: {}", bus, e),
                )
            })?;
            i2c.set_slave_address(address).map_err(|e| {
                MonitorError::hardware_error(
                    crate::monitor::Channel::Voltage,
                    format!("failed to select I2C address {:#04x}: {}", address, e),
                )
            })?;
            Ok(Self { i2c, bus, address })
        }

        /// Open the default bus and address.
        pub fn open_default() -> Result<Self> {
            Self::new(DEFAULT_BUS, DEFAULT_ADDRESS)
        }
    }

    impl RegisterBus for I2cBus {
        fn read_register(&mut self, register: Register) -> Result<u16> {
            self.i2c
                .smbus_read_word(register.address())
                .map_err(|e| {
                    MonitorError::hardware_error(
                        register.channel(),
                        format!("SMBus read of register {:#04x} failed: {}", register.address(), e),
                    )
                })
        }

        fn describe(&self) -> String {
            format!("i2c-{}@{:#04x}", self.bus, self.address)
        }
    }
}

#[cfg(not(feature = "i2c"))]
mod unavailable {
    use super::*;

    /// Stand-in bus for builds without I2C support. Every read fails.
    pub struct UnavailableBus;

    impl UnavailableBus {
        pub fn open_default() -> Result<Self> {
            Ok(Self)
        }
    }

    impl RegisterBus for UnavailableBus {
        fn read_register(&mut self, register: Register) -> Result<u16> {
            Err(MonitorError::hardware_error(
                register.channel(),
                format!(
                    "I2C support not compiled in (attempted to read register {:#04x}); \
                     rebuild with --features i2c or use --sysfs",
                    register.address()
                ),
            ))
        }

        fn describe(&self) -> String {
            "unavailable".to_string()
        }
    }
}

// Re-export the appropriate bus
#[cfg(feature = "i2c")]
pub use i2c::{I2cBus, I2cBus as DefaultBus, DEFAULT_ADDRESS, DEFAULT_BUS};

#[cfg(not(feature = "i2c"))]
pub use unavailable::{UnavailableBus, UnavailableBus as DefaultBus};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_register_value() {
        assert_eq!(parse_register_value("11900"), Some(11900));
        assert_eq!(parse_register_value("0x2e7c"), Some(0x2e7c));
        assert_eq!(parse_register_value("0X10"), Some(16));
        assert_eq!(parse_register_value("70000"), None);
        assert_eq!(parse_register_value("high"), None);
    }

    #[test]
    fn test_sysfs_bus_reads_register_files() {
        let dir = tempfile::tempdir().expect("create temp dir");
        fs::write(dir.path().join("extin"), "5\n").unwrap();
        fs::write(dir.path().join("voltage1"), "0x2e7c\n").unwrap();

        let mut bus = SysfsBus::new(dir.path());
        assert_eq!(bus.read_register(Register::ExtinCount).unwrap(), 5);
        assert_eq!(bus.read_register(Register::VoltageRail1).unwrap(), 11900);
    }

    #[test]
    fn test_sysfs_bus_missing_file_is_read_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let mut bus = SysfsBus::new(dir.path());
        let err = bus.read_register(Register::PushswCount).unwrap_err();
        assert!(matches!(
            err,
            MonitorError::HardwareRead { channel: crate::monitor::Channel::Pushsw, .. }
        ));
    }

    #[cfg(not(feature = "i2c"))]
    #[test]
    fn test_unavailable_bus_always_fails() {
        let mut bus = UnavailableBus::open_default().unwrap();
        assert!(bus.read_register(Register::ExtinCount).is_err());
        assert_eq!(bus.describe(), "unavailable");
    }
}
