//! MCP23017 port expander driver.
//!
//! The replica's PIA card exposes its keyboard and video ports through an
//! MCP23017 16-bit I2C expander. Each 8-bit port has three registers the
//! bridge cares about: direction control, pull-up control, and data. The
//! driver is generic over [`I2c`] so the handshake logic above it never sees
//! bus details.
//!
//! Datasheet: <https://ww1.microchip.com/downloads/en/devicedoc/20001952c.pdf>

use async_trait::async_trait;
use strum::Display;
use tracing::trace;

use crate::error::Result;
use crate::hw::I2c;

/// I2C address of device 0; hardware straps A2..A0 add the device id.
const BASE_ADDR: u8 = 0x20;

/// The logical registers of one expander, IOCON.BANK=0 addressing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Register {
    DirectionA,
    DirectionB,
    PullUpA,
    PullUpB,
    DataA,
    DataB,
}

impl Register {
    pub fn address(self) -> u8 {
        match self {
            Register::DirectionA => 0x00,
            Register::DirectionB => 0x01,
            Register::PullUpA => 0x0C,
            Register::PullUpB => 0x0D,
            Register::DataA => 0x12,
            Register::DataB => 0x13,
        }
    }
}

/// Register-level access to an addressable expander device.
#[async_trait]
pub trait Expander: Send {
    async fn write_reg(&mut self, device: u8, reg: Register, value: u8) -> Result<()>;
    async fn read_reg(&mut self, device: u8, reg: Register) -> Result<u8>;
}

pub struct Mcp23017<I2C> {
    i2c: I2C,
}

impl<I2C: I2c> Mcp23017<I2C> {
    pub fn new(i2c: I2C) -> Self {
        Self { i2c }
    }

    /// Confirm the device answers on the bus before relying on it.
    pub async fn probe(&mut self, device: u8) -> Result<()> {
        let dir = self.read_reg(device, Register::DirectionA).await?;
        trace!(device, dir, "expander probe");
        Ok(())
    }
}

#[async_trait]
impl<I2C: I2c> Expander for Mcp23017<I2C> {
    async fn write_reg(&mut self, device: u8, reg: Register, value: u8) -> Result<()> {
        trace!(device, %reg, value, "expander write");
        self.i2c
            .write(BASE_ADDR + device, &[reg.address(), value])
            .await
    }

    async fn read_reg(&mut self, device: u8, reg: Register) -> Result<u8> {
        let mut buf = [0u8];
        self.i2c
            .write_read(BASE_ADDR + device, &[reg.address()], &mut buf)
            .await?;
        trace!(device, %reg, value = buf[0], "expander read");
        Ok(buf[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Records bus traffic and answers reads with a fixed byte.
    #[derive(Clone, Default)]
    struct FakeI2c {
        writes: Arc<Mutex<Vec<(u8, Vec<u8>)>>>,
        read_byte: u8,
    }

    #[async_trait]
    impl I2c for FakeI2c {
        async fn write(&mut self, addr: u8, data: &[u8]) -> Result<()> {
            self.writes.lock().push((addr, data.to_vec()));
            Ok(())
        }

        async fn write_read(&mut self, addr: u8, data: &[u8], buf: &mut [u8]) -> Result<()> {
            self.writes.lock().push((addr, data.to_vec()));
            buf.fill(self.read_byte);
            Ok(())
        }
    }

    #[tokio::test]
    async fn write_reg_addresses_device_and_register() {
        let i2c = FakeI2c::default();
        let mut exp = Mcp23017::new(i2c.clone());

        exp.write_reg(0, Register::DataB, 0xC8).await.unwrap();
        exp.write_reg(2, Register::DirectionA, 0xFF).await.unwrap();

        assert_eq!(
            i2c.writes.lock().as_slice(),
            &[(0x20, vec![0x13, 0xC8]), (0x22, vec![0x00, 0xFF])]
        );
    }

    #[tokio::test]
    async fn read_reg_selects_register_then_reads() {
        let i2c = FakeI2c {
            read_byte: 0x8D,
            ..FakeI2c::default()
        };
        let mut exp = Mcp23017::new(i2c.clone());

        let value = exp.read_reg(0, Register::DataA).await.unwrap();

        assert_eq!(value, 0x8D);
        assert_eq!(i2c.writes.lock().as_slice(), &[(0x20, vec![0x12])]);
    }
}
