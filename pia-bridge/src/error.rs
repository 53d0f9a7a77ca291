//! Common error types for pia-bridge.
//!
//! Protocol-level trouble (handshake timeouts, unsupported key codes, no
//! video data pending) is never an error here; those are handled in place by
//! the channels. `Error` covers genuine backend failure, such as the serial
//! port disappearing or an I2C transaction failing.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors from tokio or std
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port errors
    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I2C bus or expander errors
    #[error("Hardware error: {0}")]
    Hardware(String),

    /// GPIO line errors
    #[error("GPIO error: {0}")]
    Gpio(String),
}

/// Convenience type alias for Results using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
