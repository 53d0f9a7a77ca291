//! Clock generator for the target CPU.
//!
//! The original hardware ran a timer in toggle-on-compare mode off a 16 MHz
//! oscillator, so the output frequency is osc / (2 * (divider + 1)). The
//! divider is a compile-time choice in [`board`]; once the square wave is
//! started it runs forever.

use tracing::info;

use crate::board;
use crate::error::Result;
use crate::hw::SquareWave;

pub struct ClockGenerator {
    divider: u16,
}

impl ClockGenerator {
    pub fn new(divider: u16) -> Self {
        Self { divider }
    }

    pub fn frequency_hz(&self) -> u32 {
        board::OSC_HZ / (2 * (u32::from(self.divider) + 1))
    }

    pub fn period_ns(&self) -> u32 {
        1_000_000_000 / self.frequency_hz()
    }

    pub async fn start<W: SquareWave>(&self, timer: &mut W) -> Result<()> {
        info!(
            hz = self.frequency_hz(),
            divider = self.divider,
            "starting target CPU clock"
        );
        timer.start(self.period_ns()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::sim::SimSquareWave;

    #[test]
    fn divider_3_gives_2mhz() {
        let clock = ClockGenerator::new(3);
        assert_eq!(clock.frequency_hz(), 2_000_000);
        assert_eq!(clock.period_ns(), 500);
    }

    #[test]
    fn divider_7_gives_1mhz() {
        let clock = ClockGenerator::new(7);
        assert_eq!(clock.frequency_hz(), 1_000_000);
        assert_eq!(clock.period_ns(), 1000);
    }

    #[tokio::test]
    async fn start_programs_the_timer() {
        let mut timer = SimSquareWave::new();
        ClockGenerator::new(board::CLOCK_DIVIDER)
            .start(&mut timer)
            .await
            .unwrap();
        assert_eq!(timer.period_ns(), Some(500));
    }
}
