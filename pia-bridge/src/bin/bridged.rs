use tokio::signal::unix::{self, SignalKind};
use tokio_serial::SerialPortBuilderExt;
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use pia_bridge::board;
use pia_bridge::bridge::{self, Bridge};
use pia_bridge::clock::ClockGenerator;
use pia_bridge::expander::Mcp23017;
use pia_bridge::hw::linux::{I2cDev, SerialTransport, SysfsInput, SysfsOutput, SysfsPwm};
use pia_bridge::keyboard::{Keyboard, KeyboardConfig};
use pia_bridge::reset::ResetController;
use pia_bridge::tracing::{self, prelude::*};
use pia_bridge::video::Video;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing::init_journald_or_stdout();

    // Host side first, so the banner is the first thing the terminal sees.
    let port = tokio_serial::new(board::SERIAL_DEVICE, board::BAUD)
        .open_native_async()?;
    let mut transport = SerialTransport::new(port);
    bridge::banner(&mut transport).await?;

    let mut expander = Mcp23017::new(I2cDev::open(board::I2C_BUS)?);
    expander.probe(board::PIA_DEVICE).await?;

    // Line directions are fixed here and never change at runtime.
    let kbd_strobe = SysfsOutput::new(board::KBD_STROBE_GPIO)?;
    let kbd_ready = SysfsInput::new(board::KBD_READY_GPIO)?;
    let video_rda = SysfsOutput::new(board::VIDEO_RDA_GPIO)?;
    let video_da = SysfsInput::new(board::VIDEO_DA_GPIO)?;
    let reset_out = SysfsOutput::new(board::RESET_OUT_GPIO)?;
    let reset_switch = SysfsInput::new(board::RESET_SWITCH_GPIO)?;

    let mut clock_timer = SysfsPwm::new(board::PWM_CHIP, board::PWM_CHANNEL)?;
    ClockGenerator::new(board::CLOCK_DIVIDER)
        .start(&mut clock_timer)
        .await?;

    let mut reset = ResetController::new(
        Box::new(reset_out),
        Box::new(reset_switch),
        board::RESET_HOLD,
    );
    reset.startup_pulse().await?;

    let running = CancellationToken::new();
    let tracker = TaskTracker::new();
    tracker.spawn(reset.task(running.clone()));

    let keyboard = Keyboard::new(
        Box::new(kbd_strobe),
        Box::new(kbd_ready),
        board::PIA_DEVICE,
        KeyboardConfig::default(),
    );
    let video = Video::new(Box::new(video_rda), Box::new(video_da), board::PIA_DEVICE);
    let mut bridge = Bridge::new(transport, expander, keyboard, video);
    bridge.init().await?;

    tracker.spawn({
        let running = running.clone();
        async move {
            if let Err(e) = bridge.run(running.clone()).await {
                error!("Bridge stopped: {e}");
                running.cancel();
            }
        }
    });
    tracker.close();
    info!("Started.");

    let mut sigint = unix::signal(SignalKind::interrupt()).unwrap();
    let mut sigterm = unix::signal(SignalKind::terminate()).unwrap();
    tokio::select! {
        _ = sigint.recv() => {},
        _ = sigterm.recv() => {},
        _ = running.cancelled() => {},
    }

    trace!("Shutting down.");
    running.cancel();

    tracker.wait().await;
    info!("Exiting.");
    Ok(())
}
