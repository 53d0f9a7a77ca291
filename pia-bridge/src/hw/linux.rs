//! Linux backends for the hardware traits.
//!
//! The expander sits on an i2c-dev bus, the handshake and reset lines are
//! sysfs GPIOs, and the CPU clock comes from a sysfs hardware PWM channel.
//! I2C and sysfs accesses are plain blocking syscalls; each one is a
//! microsecond-scale register transfer, so they are issued inline rather
//! than shipped to a blocking pool.

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use nix::ioctl_write_int_bad;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::time;
use tokio_serial::{SerialPort, SerialStream};

use crate::error::{Error, Result};
use crate::hw::{EdgeInput, I2c, InputLine, Level, OutputLine, SquareWave, Transport};

// I2C_SLAVE from linux/i2c-dev.h: select the peer address for subsequent
// read()/write() calls on the bus fd.
ioctl_write_int_bad!(i2c_slave, 0x0703);

/// Master access to an i2c-dev bus, e.g. `/dev/i2c-1`.
pub struct I2cDev {
    bus: File,
    addr: Option<u8>,
}

impl I2cDev {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let bus = OpenOptions::new().read(true).write(true).open(path)?;
        Ok(Self { bus, addr: None })
    }

    fn select(&mut self, addr: u8) -> Result<()> {
        if self.addr != Some(addr) {
            unsafe { i2c_slave(self.bus.as_raw_fd(), addr as i32) }
                .map_err(|e| Error::Hardware(format!("I2C_SLAVE ioctl: {e}")))?;
            self.addr = Some(addr);
        }
        Ok(())
    }
}

#[async_trait]
impl I2c for I2cDev {
    async fn write(&mut self, addr: u8, data: &[u8]) -> Result<()> {
        self.select(addr)?;
        self.bus.write_all(data)?;
        Ok(())
    }

    async fn write_read(&mut self, addr: u8, data: &[u8], buf: &mut [u8]) -> Result<()> {
        self.select(addr)?;
        self.bus.write_all(data)?;
        self.bus.read_exact(buf)?;
        Ok(())
    }
}

fn gpio_dir(pin: u32) -> PathBuf {
    PathBuf::from(format!("/sys/class/gpio/gpio{pin}"))
}

fn export(pin: u32) -> Result<()> {
    if !gpio_dir(pin).exists() {
        fs::write("/sys/class/gpio/export", pin.to_string())?;
    }
    Ok(())
}

fn read_value(path: &Path) -> Result<Level> {
    let raw = fs::read(path)?;
    Ok(Level::from_bool(raw.first() == Some(&b'1')))
}

/// A sysfs GPIO configured as an output.
pub struct SysfsOutput {
    value: PathBuf,
}

impl SysfsOutput {
    pub fn new(pin: u32) -> Result<Self> {
        export(pin)?;
        fs::write(gpio_dir(pin).join("direction"), "out")?;
        Ok(Self {
            value: gpio_dir(pin).join("value"),
        })
    }
}

#[async_trait]
impl OutputLine for SysfsOutput {
    async fn set(&mut self, level: Level) -> Result<()> {
        fs::write(&self.value, if level.is_high() { "1" } else { "0" })?;
        Ok(())
    }
}

/// A sysfs GPIO configured as an input.
pub struct SysfsInput {
    value: PathBuf,
}

/// Edge detection interval. Slow enough to debounce the mechanical reset
/// switch, fast enough that a press is never missed.
const EDGE_POLL: Duration = Duration::from_millis(10);

impl SysfsInput {
    pub fn new(pin: u32) -> Result<Self> {
        export(pin)?;
        fs::write(gpio_dir(pin).join("direction"), "in")?;
        Ok(Self {
            value: gpio_dir(pin).join("value"),
        })
    }
}

#[async_trait]
impl InputLine for SysfsInput {
    async fn level(&mut self) -> Result<Level> {
        read_value(&self.value)
    }
}

#[async_trait]
impl EdgeInput for SysfsInput {
    async fn wait_for_edge(&mut self) -> Result<Level> {
        let mut last = read_value(&self.value)?;
        loop {
            time::sleep(EDGE_POLL).await;
            let now = read_value(&self.value)?;
            if now != last {
                return Ok(now);
            }
            last = now;
        }
    }
}

/// A sysfs hardware PWM channel run at 50% duty.
pub struct SysfsPwm {
    channel: PathBuf,
}

impl SysfsPwm {
    pub fn new(chip: u32, channel: u32) -> Result<Self> {
        let chip_dir = PathBuf::from(format!("/sys/class/pwm/pwmchip{chip}"));
        let dir = chip_dir.join(format!("pwm{channel}"));
        if !dir.exists() {
            fs::write(chip_dir.join("export"), channel.to_string())?;
        }
        Ok(Self { channel: dir })
    }
}

#[async_trait]
impl SquareWave for SysfsPwm {
    async fn start(&mut self, period_ns: u32) -> Result<()> {
        fs::write(self.channel.join("period"), period_ns.to_string())?;
        fs::write(self.channel.join("duty_cycle"), (period_ns / 2).to_string())?;
        fs::write(self.channel.join("enable"), "1")?;
        Ok(())
    }
}

/// The host terminal over a serial port.
pub struct SerialTransport {
    port: SerialStream,
}

impl SerialTransport {
    pub fn new(port: SerialStream) -> Self {
        Self { port }
    }
}

#[async_trait]
impl Transport for SerialTransport {
    async fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    async fn read_byte(&mut self) -> Result<u8> {
        Ok(self.port.read_u8().await?)
    }

    async fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.port.write_u8(byte).await?;
        Ok(())
    }
}
