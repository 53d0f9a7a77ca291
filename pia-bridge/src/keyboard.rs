//! Keyboard channel: host keystrokes onto the replica's keyboard port.
//!
//! One keystroke per call. The byte is latched into the expander's keyboard
//! data register with bit 7 set (the bus treats the top bit as a validity
//! flag), then announced with the strobe line. The PIA answers on the ready
//! line; both waits are bounded polls and a timeout is abandoned silently,
//! trading an occasional dropped keystroke for a main loop that never
//! stalls.

use tracing::{debug, trace};

use crate::board;
use crate::error::Result;
use crate::expander::Expander;
use crate::hw::{InputLine, Level, OutputLine};
use crate::keymap::map_to_target_code;

/// Key codes at and above this have no Apple 1 representation.
const MAX_KEY: u8 = 96;

#[derive(Debug, Clone)]
pub struct KeyboardConfig {
    /// Poll budget for each of the two ready-line waits.
    pub ack_timeout_polls: u32,
    /// When false, the strobe is dropped immediately after assertion and the
    /// ready line is never consulted.
    pub wait_for_ack: bool,
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            ack_timeout_polls: board::KBD_ACK_TIMEOUT_POLLS,
            wait_for_ack: board::KBD_WAIT_FOR_ACK,
        }
    }
}

pub struct Keyboard {
    strobe: Box<dyn OutputLine>,
    ready: Box<dyn InputLine>,
    device: u8,
    config: KeyboardConfig,
}

impl Keyboard {
    pub fn new(
        strobe: Box<dyn OutputLine>,
        ready: Box<dyn InputLine>,
        device: u8,
        config: KeyboardConfig,
    ) -> Self {
        Self {
            strobe,
            ready,
            device,
            config,
        }
    }

    /// Transfer one host keystroke to the target.
    pub async fn transfer<E: Expander>(&mut self, exp: &mut E, code: u16) -> Result<()> {
        // Clear any stale strobe left by a previous transfer.
        self.strobe.set_low().await?;

        let key = map_to_target_code(code);
        if key >= MAX_KEY {
            trace!(code, key, "unsupported key code, dropped");
            return Ok(());
        }

        exp.write_reg(self.device, board::KBD_DATA, key | 0x80).await?;
        self.strobe.set_high().await?;

        if self.config.wait_for_ack {
            self.wait_for_ready(Level::High).await?;
            self.strobe.set_low().await?;
            self.wait_for_ready(Level::Low).await?;
        } else {
            self.strobe.set_low().await?;
        }
        Ok(())
    }

    /// Poll the ready line for `want`, up to the configured budget. A
    /// timeout is not an error; the next keystroke starts fresh.
    async fn wait_for_ready(&mut self, want: Level) -> Result<()> {
        for _ in 0..self.config.ack_timeout_polls {
            if self.ready.level().await? == want {
                return Ok(());
            }
        }
        debug!(%want, "keyboard ready wait timed out");
        Ok(())
    }
}
