//! End-to-end bridge tests over the simulated hardware backend.

use pia_bridge::board;
use pia_bridge::bridge::{self, Bridge};
use pia_bridge::hw::sim::{SimExpander, SimLine, SimTransport};
use pia_bridge::hw::Level;
use pia_bridge::keyboard::{Keyboard, KeyboardConfig};
use pia_bridge::video::Video;

struct Rig {
    transport: SimTransport,
    expander: SimExpander,
    strobe: SimLine,
    rda: SimLine,
    da: SimLine,
}

fn rig() -> (Rig, Bridge<SimTransport, SimExpander>) {
    let rig = Rig {
        transport: SimTransport::new(),
        expander: SimExpander::new(),
        strobe: SimLine::new(Level::Low),
        rda: SimLine::new(Level::Low),
        da: SimLine::new(Level::Low),
    };
    // The PIA acknowledges instantly in these tests.
    let ready = SimLine::new(Level::High);
    let keyboard = Keyboard::new(
        Box::new(rig.strobe.clone()),
        Box::new(ready),
        board::PIA_DEVICE,
        KeyboardConfig::default(),
    );
    let video = Video::new(
        Box::new(rig.rda.clone()),
        Box::new(rig.da.clone()),
        board::PIA_DEVICE,
    );
    let bridge = Bridge::new(rig.transport.clone(), rig.expander.clone(), keyboard, video);
    (rig, bridge)
}

#[tokio::test(start_paused = true)]
async fn init_programs_the_pia_ports() {
    let (rig, mut bridge) = rig();

    bridge.init().await.unwrap();

    assert_eq!(
        rig.expander.writes(),
        vec![
            (board::PIA_DEVICE, board::VIDEO_DIR, 0xFF),
            (board::PIA_DEVICE, board::VIDEO_PULLUP, 0x80),
            (board::PIA_DEVICE, board::KBD_DIR, 0x00),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn banner_reaches_the_host() {
    let mut transport = SimTransport::new();
    bridge::banner(&mut transport).await.unwrap();
    assert_eq!(transport.output(), board::BANNER);
}

#[tokio::test(start_paused = true)]
async fn keystroke_reaches_the_keyboard_port() {
    let (rig, mut bridge) = rig();

    rig.transport.push_input(b"h");
    assert!(bridge.service_once().await.unwrap());

    // 'h' folds to 'H' and goes out with the valid bit set
    assert_eq!(
        rig.expander.writes(),
        vec![(board::PIA_DEVICE, board::KBD_DATA, 0xC8)]
    );
    assert_eq!(
        rig.strobe.history(),
        vec![Level::Low, Level::High, Level::Low]
    );
}

#[tokio::test(start_paused = true)]
async fn unsupported_keystroke_moves_nothing_to_the_port() {
    let (rig, mut bridge) = rig();

    rig.transport.push_input(&[123]); // '{' has no Apple 1 code
    bridge.service_once().await.unwrap();

    assert!(rig.expander.writes().is_empty());
}

#[tokio::test(start_paused = true)]
async fn video_carriage_return_reaches_host_as_lf_cr() {
    let (rig, mut bridge) = rig();

    rig.expander.set_reg(board::PIA_DEVICE, board::VIDEO_DATA, 0x8D);
    rig.da.drive(Level::High);

    assert!(bridge.service_once().await.unwrap());

    assert_eq!(rig.transport.output(), b"\n\r");
    assert_eq!(rig.rda.get(), Level::Low);
}

#[tokio::test(start_paused = true)]
async fn idle_pass_moves_nothing() {
    let (rig, mut bridge) = rig();

    assert!(!bridge.service_once().await.unwrap());

    assert!(rig.transport.output().is_empty());
    assert!(rig.expander.writes().is_empty());
    // RDA stays offered until data shows up
    assert_eq!(rig.rda.get(), Level::High);
}

#[tokio::test(start_paused = true)]
async fn keyboard_is_serviced_before_video_in_one_pass() {
    let (rig, mut bridge) = rig();

    rig.transport.push_input(b"a");
    rig.expander.set_reg(board::PIA_DEVICE, board::VIDEO_DATA, 0x8D);
    rig.da.drive(Level::High);

    assert!(bridge.service_once().await.unwrap());

    // Keystroke landed and the video byte came back in the same pass, with
    // the keyboard write logged ahead of any video activity.
    assert_eq!(
        rig.expander.writes(),
        vec![(board::PIA_DEVICE, board::KBD_DATA, b'A' | 0x80)]
    );
    assert_eq!(rig.transport.output(), b"\n\r");
}
