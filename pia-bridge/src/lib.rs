//! Bridge between a host serial terminal and the parallel PIA interface of
//! an RC6502 Apple 1 replica.
//!
//! The bridge moves one byte at a time in each direction: host keystrokes go
//! out over the replica's keyboard port with a strobe/ready handshake, and
//! characters the replica prints come back over the video port. The daemon
//! also generates the 6502's clock and drives its reset line from a physical
//! switch.
//!
//! Hardware access goes through the traits in [`hw`], so the protocol logic
//! runs unchanged against real GPIO/I2C backends or the simulated ones used
//! in tests.

pub mod board;
pub mod bridge;
pub mod clock;
pub mod error;
pub mod expander;
pub mod hw;
pub mod keyboard;
pub mod keymap;
pub mod reset;
pub mod tracing;
pub mod video;
