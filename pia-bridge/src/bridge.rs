//! The bridge proper: startup sequence and the service loop.
//!
//! Each pass moves at most one byte per direction, keyboard first, so the
//! loop always comes back around quickly and the reset task is never starved
//! of the executor for long.

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::board;
use crate::error::Result;
use crate::expander::Expander;
use crate::hw::Transport;
use crate::keyboard::Keyboard;
use crate::video::{self, Video};

/// Send the identification banner to the host terminal. Done first thing
/// after the serial port opens, before any hardware is touched.
pub async fn banner<T: Transport>(transport: &mut T) -> Result<()> {
    for &byte in board::BANNER {
        transport.write_byte(byte).await?;
    }
    Ok(())
}

pub struct Bridge<T, E> {
    transport: T,
    expander: E,
    keyboard: Keyboard,
    video: Video,
}

impl<T: Transport, E: Expander> Bridge<T, E> {
    pub fn new(transport: T, expander: E, keyboard: Keyboard, video: Video) -> Self {
        Self {
            transport,
            expander,
            keyboard,
            video,
        }
    }

    /// Program the expander's port registers: video port reads from the PIA
    /// with a pull-up on the valid bit, keyboard port drives it.
    pub async fn init(&mut self) -> Result<()> {
        self.expander
            .write_reg(board::PIA_DEVICE, board::VIDEO_DIR, 0xFF)
            .await?;
        self.expander
            .write_reg(board::PIA_DEVICE, board::VIDEO_PULLUP, 0x80)
            .await?;
        self.expander
            .write_reg(board::PIA_DEVICE, board::KBD_DIR, 0x00)
            .await?;
        Ok(())
    }

    /// One service pass: at most one keystroke in, then at most one video
    /// byte out. Returns whether anything moved.
    pub async fn service_once(&mut self) -> Result<bool> {
        let mut moved = false;

        if self.transport.bytes_available().await? > 0 {
            let code = self.transport.read_byte().await?;
            self.keyboard
                .transfer(&mut self.expander, u16::from(code))
                .await?;
            moved = true;
        }

        if let Some(byte) = self.video.poll(&mut self.expander).await? {
            video::emit_to_host(&mut self.transport, byte).await?;
            moved = true;
        }

        Ok(moved)
    }

    /// Service until cancelled. An idle pass backs off briefly; a pass that
    /// moved data goes straight around again.
    pub async fn run(mut self, running: CancellationToken) -> Result<()> {
        trace!("Bridge loop started.");
        while !running.is_cancelled() {
            if !self.service_once().await? {
                time::sleep(board::IDLE_BACKOFF).await;
            }
        }
        trace!("Bridge loop stopped.");
        Ok(())
    }
}
