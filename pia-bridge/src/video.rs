//! Video channel: characters the replica prints, back to the host.
//!
//! The bridge raises RDA (ready to accept data) and samples the DA line
//! after a short settle. When the PIA has latched a character the byte is
//! read from the video port with bit 7 masked off (the bus carries validity
//! there, not data). With nothing pending, RDA simply stays up until the
//! next poll re-asserts it.

use tokio::time;
use tracing::trace;

use crate::board;
use crate::error::Result;
use crate::expander::Expander;
use crate::hw::{InputLine, OutputLine, Transport};

pub struct Video {
    rda: Box<dyn OutputLine>,
    da: Box<dyn InputLine>,
    device: u8,
}

impl Video {
    pub fn new(rda: Box<dyn OutputLine>, da: Box<dyn InputLine>, device: u8) -> Self {
        Self { rda, da, device }
    }

    /// Offer to accept one character; `None` means nothing was pending.
    pub async fn poll<E: Expander>(&mut self, exp: &mut E) -> Result<Option<u8>> {
        self.rda.set_high().await?;
        time::sleep(board::VIDEO_SETTLE).await;

        if !self.da.level().await?.is_high() {
            return Ok(None);
        }

        let byte = exp.read_reg(self.device, board::VIDEO_DATA).await? & 0x7F;
        self.rda.set_low().await?;
        trace!(byte, "video byte received");
        Ok(Some(byte))
    }
}

/// Forward one target byte to the host terminal. The Apple 1 ends lines
/// with a bare CR; terminals want the LF too, so one is emitted ahead of
/// every CR. Everything else passes verbatim.
pub async fn emit_to_host<T: Transport>(transport: &mut T, byte: u8) -> Result<()> {
    if byte == b'\r' {
        transport.write_byte(b'\n').await?;
    }
    transport.write_byte(byte).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::sim::{SimExpander, SimLine, SimTransport};
    use crate::hw::Level;

    fn video(rda: &SimLine, da: &SimLine) -> Video {
        Video::new(Box::new(rda.clone()), Box::new(da.clone()), 0)
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_pending_returns_none_and_leaves_rda_up() {
        let rda = SimLine::new(Level::Low);
        let da = SimLine::new(Level::Low);
        let mut exp = SimExpander::new();
        let mut vid = video(&rda, &da);

        assert_eq!(vid.poll(&mut exp).await.unwrap(), None);
        assert_eq!(rda.get(), Level::High);
    }

    #[tokio::test(start_paused = true)]
    async fn pending_byte_is_masked_and_rda_dropped() {
        let rda = SimLine::new(Level::Low);
        let da = SimLine::new(Level::High);
        let mut exp = SimExpander::new();
        exp.set_reg(0, board::VIDEO_DATA, 0x8D); // CR with the valid bit set
        let mut vid = video(&rda, &da);

        assert_eq!(vid.poll(&mut exp).await.unwrap(), Some(0x0D));
        assert_eq!(rda.get(), Level::Low);
    }

    #[tokio::test]
    async fn carriage_return_becomes_lf_cr() {
        let mut transport = SimTransport::new();
        emit_to_host(&mut transport, b'\r').await.unwrap();
        assert_eq!(transport.output(), b"\n\r");
    }

    #[tokio::test]
    async fn ordinary_bytes_pass_verbatim() {
        let mut transport = SimTransport::new();
        emit_to_host(&mut transport, b'A').await.unwrap();
        assert_eq!(transport.output(), b"A");
    }
}
