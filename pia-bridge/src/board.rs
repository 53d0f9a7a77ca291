//! Board wiring and timing constants.
//!
//! Everything about the bridge's behavior is fixed at compile time; this
//! module is the one place the numbers live. The GPIO assignments follow the
//! Pi header wiring of the RC6502 backplane adapter, and the handshake
//! timings come from the original PIA Communicator firmware.

use std::time::Duration;

use crate::expander::Register;

/// Host-facing serial port and speed.
pub const SERIAL_DEVICE: &str = "/dev/ttyAMA0";
pub const BAUD: u32 = 115_200;

/// I2C bus carrying the MCP23017 on the PIA card, and its device id
/// (hardware address straps A2..A0).
pub const I2C_BUS: &str = "/dev/i2c-1";
pub const PIA_DEVICE: u8 = 0;

// Handshake and reset lines, BCM numbering. Directions are fixed at startup
// and never change. The reset switch input relies on the devicetree pull-up.
pub const KBD_STROBE_GPIO: u32 = 17;
pub const KBD_READY_GPIO: u32 = 27;
pub const VIDEO_RDA_GPIO: u32 = 22;
pub const VIDEO_DA_GPIO: u32 = 23;
pub const RESET_OUT_GPIO: u32 = 24;
pub const RESET_SWITCH_GPIO: u32 = 25;

/// Hardware PWM channel generating the 6502 clock (GPIO 18 on a Pi).
pub const PWM_CHIP: u32 = 0;
pub const PWM_CHANNEL: u32 = 0;

/// Reference oscillator the clock divider is applied to.
pub const OSC_HZ: u32 = 16_000_000;

/// Toggle-on-compare divider for the CPU clock: 3 gives 2 MHz.
/// Use 7 for a 1 MHz part.
pub const CLOCK_DIVIDER: u16 = 3;

/// How long the reset line is held high, at power-up and on a switch press.
pub const RESET_HOLD: Duration = Duration::from_millis(600);

/// Settle time between raising RDA and sampling the data-available line.
pub const VIDEO_SETTLE: Duration = Duration::from_micros(1);

/// Keyboard acknowledge handshake: poll budget per wait, and whether to wait
/// at all (the replica's PIA can also latch on strobe alone).
pub const KBD_ACK_TIMEOUT_POLLS: u32 = 23;
pub const KBD_WAIT_FOR_ACK: bool = true;

/// Expander registers backing the two PIA ports: video on port A (read by
/// us), keyboard on port B (driven by us).
pub const VIDEO_DIR: Register = Register::DirectionA;
pub const VIDEO_PULLUP: Register = Register::PullUpA;
pub const VIDEO_DATA: Register = Register::DataA;
pub const KBD_DIR: Register = Register::DirectionB;
pub const KBD_DATA: Register = Register::DataB;

/// Sleep applied when a service pass moved no bytes, so the daemon does not
/// spin a host core the way the bare-metal loop did.
pub const IDLE_BACKOFF: Duration = Duration::from_micros(500);

/// Identification banner sent to the host terminal before anything else.
pub const BANNER: &[u8] = b"RC6502 Apple 1 Replica\n\r";
