//! Reset controller for the target CPU.
//!
//! Two states: reset asserted (line high, CPU halted) and released. At
//! power-up the line is asserted for the full hold duration before the CPU
//! is allowed to run. After that a physical switch drives it: a press
//! asserts reset and holds it high for the same duration, and the hold is
//! never shortened — a release edge arriving mid-hold is only seen once the
//! hold has run out.

use std::time::Duration;

use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, trace};

use crate::error::Result;
use crate::hw::{EdgeInput, Level, OutputLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetState {
    Asserted,
    Released,
}

pub struct ResetController {
    line: Box<dyn OutputLine>,
    switch: Box<dyn EdgeInput>,
    hold: Duration,
    state: ResetState,
}

impl ResetController {
    pub fn new(line: Box<dyn OutputLine>, switch: Box<dyn EdgeInput>, hold: Duration) -> Self {
        Self {
            line,
            switch,
            hold,
            state: ResetState::Released,
        }
    }

    pub fn state(&self) -> ResetState {
        self.state
    }

    /// The power-up reset pulse: assert, hold, release.
    pub async fn startup_pulse(&mut self) -> Result<()> {
        info!(hold_ms = self.hold.as_millis() as u64, "resetting target CPU");
        self.assert_and_hold().await?;
        self.release().await
    }

    async fn assert_and_hold(&mut self) -> Result<()> {
        self.state = ResetState::Asserted;
        self.line.set_high().await?;
        time::sleep(self.hold).await;
        Ok(())
    }

    async fn release(&mut self) -> Result<()> {
        self.state = ResetState::Released;
        self.line.set_low().await
    }

    /// Watch the reset switch until cancelled. Runs alongside the bridge
    /// loop; while a hold is in progress no further edges are serviced.
    pub async fn task(mut self, running: CancellationToken) {
        trace!("Reset task started.");
        loop {
            tokio::select! {
                _ = running.cancelled() => break,
                edge = self.switch.wait_for_edge() => match edge {
                    Ok(Level::Low) => {
                        info!("Reset switch pressed.");
                        if let Err(e) = self.press().await {
                            error!("Reset line failed: {e}");
                            break;
                        }
                    }
                    Ok(Level::High) => {
                        if let Err(e) = self.release().await {
                            error!("Reset line failed: {e}");
                            break;
                        }
                    }
                    Err(e) => {
                        error!("Reset switch failed: {e}");
                        break;
                    }
                },
            }
        }
        trace!("Reset task stopped.");
    }

    async fn press(&mut self) -> Result<()> {
        self.assert_and_hold().await?;
        self.release().await
    }
}
