//! Hardware abstraction layer traits.
//!
//! These are the seams between the bridge logic and the machine it runs on:
//! GPIO lines, the I2C bus carrying the port expander, the square-wave timer
//! for the CPU clock, and the host serial transport. [`linux`] implements
//! them against i2c-dev and sysfs; [`sim`] provides in-memory doubles for
//! tests.

use async_trait::async_trait;
use strum::Display;

use crate::error::Result;

pub mod linux;
pub mod sim;

/// Logic level of a signal line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Level {
    Low,
    High,
}

impl Level {
    pub fn is_high(self) -> bool {
        matches!(self, Level::High)
    }

    pub fn from_bool(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

/// A GPIO line this system drives. Direction is fixed when the line is
/// constructed and never changes afterwards.
#[async_trait]
pub trait OutputLine: Send {
    async fn set(&mut self, level: Level) -> Result<()>;

    async fn set_high(&mut self) -> Result<()> {
        self.set(Level::High).await
    }

    async fn set_low(&mut self) -> Result<()> {
        self.set(Level::Low).await
    }
}

/// A GPIO line the peer drives.
#[async_trait]
pub trait InputLine: Send {
    async fn level(&mut self) -> Result<Level>;
}

/// An input line with level-change detection, for the reset switch.
#[async_trait]
pub trait EdgeInput: InputLine {
    /// Resolves on the next level change, returning the new level.
    async fn wait_for_edge(&mut self) -> Result<Level>;
}

/// Byte-level I2C master access, enough for register-style peripherals.
#[async_trait]
pub trait I2c: Send {
    async fn write(&mut self, addr: u8, data: &[u8]) -> Result<()>;

    /// Write `data` (typically a register address) then read back into `buf`.
    async fn write_read(&mut self, addr: u8, data: &[u8], buf: &mut [u8]) -> Result<()>;
}

/// A free-running 50% duty square-wave generator. Once started it runs
/// forever; there is no stop.
#[async_trait]
pub trait SquareWave: Send {
    async fn start(&mut self, period_ns: u32) -> Result<()>;
}

/// Byte-oriented host transport. No framing, no flow control beyond what the
/// bridge imposes one byte at a time.
#[async_trait]
pub trait Transport: Send {
    async fn bytes_available(&mut self) -> Result<usize>;
    async fn read_byte(&mut self) -> Result<u8>;
    async fn write_byte(&mut self, byte: u8) -> Result<()>;
}
