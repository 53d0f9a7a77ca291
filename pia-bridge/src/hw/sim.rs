//! Simulated hardware for tests.
//!
//! Each double is a cheaply clonable handle over shared state, so a test can
//! keep one side and hand the other to the code under test: drive input
//! lines, script serial input, and inspect every level and register write
//! the bridge produced.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::error::{Error, Result};
use crate::expander::{Expander, Register};
use crate::hw::{EdgeInput, InputLine, Level, OutputLine, SquareWave, Transport};

/// A signal line. Implements both line directions; a test drives it with
/// [`SimLine::drive`] and observes with [`SimLine::get`] or
/// [`SimLine::history`].
#[derive(Clone)]
pub struct SimLine {
    tx: Arc<watch::Sender<Level>>,
    rx: watch::Receiver<Level>,
    history: Arc<Mutex<Vec<Level>>>,
}

impl SimLine {
    pub fn new(initial: Level) -> Self {
        let (tx, rx) = watch::channel(initial);
        Self {
            tx: Arc::new(tx),
            rx,
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Set the level from the test side, waking any edge waiter.
    pub fn drive(&self, level: Level) {
        self.tx.send_replace(level);
        self.history.lock().push(level);
    }

    pub fn get(&self) -> Level {
        *self.rx.borrow()
    }

    /// Every level ever applied, oldest first.
    pub fn history(&self) -> Vec<Level> {
        self.history.lock().clone()
    }
}

#[async_trait]
impl OutputLine for SimLine {
    async fn set(&mut self, level: Level) -> Result<()> {
        self.drive(level);
        Ok(())
    }
}

#[async_trait]
impl InputLine for SimLine {
    async fn level(&mut self) -> Result<Level> {
        Ok(*self.rx.borrow())
    }
}

#[async_trait]
impl EdgeInput for SimLine {
    async fn wait_for_edge(&mut self) -> Result<Level> {
        self.rx
            .changed()
            .await
            .map_err(|_| Error::Gpio("sim line closed".into()))?;
        Ok(*self.rx.borrow_and_update())
    }
}

#[derive(Default)]
struct SimExpanderState {
    registers: HashMap<(u8, Register), u8>,
    writes: Vec<(u8, Register, u8)>,
}

/// An in-memory register file standing in for the MCP23017.
#[derive(Clone, Default)]
pub struct SimExpander {
    state: Arc<Mutex<SimExpanderState>>,
}

impl SimExpander {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a register value from the test side, bypassing the write log.
    pub fn set_reg(&self, device: u8, reg: Register, value: u8) {
        self.state.lock().registers.insert((device, reg), value);
    }

    pub fn reg(&self, device: u8, reg: Register) -> u8 {
        self.state
            .lock()
            .registers
            .get(&(device, reg))
            .copied()
            .unwrap_or(0)
    }

    /// Every register write the code under test issued, in order.
    pub fn writes(&self) -> Vec<(u8, Register, u8)> {
        self.state.lock().writes.clone()
    }
}

#[async_trait]
impl Expander for SimExpander {
    async fn write_reg(&mut self, device: u8, reg: Register, value: u8) -> Result<()> {
        let mut state = self.state.lock();
        state.registers.insert((device, reg), value);
        state.writes.push((device, reg, value));
        Ok(())
    }

    async fn read_reg(&mut self, device: u8, reg: Register) -> Result<u8> {
        Ok(self.reg(device, reg))
    }
}

#[derive(Default)]
struct SimTransportState {
    input: VecDeque<u8>,
    output: Vec<u8>,
}

/// A scripted serial transport.
#[derive(Clone, Default)]
pub struct SimTransport {
    state: Arc<Mutex<SimTransportState>>,
}

impl SimTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue bytes as if the host had typed them.
    pub fn push_input(&self, bytes: &[u8]) {
        self.state.lock().input.extend(bytes);
    }

    /// Everything written towards the host so far.
    pub fn output(&self) -> Vec<u8> {
        self.state.lock().output.clone()
    }
}

#[async_trait]
impl Transport for SimTransport {
    async fn bytes_available(&mut self) -> Result<usize> {
        Ok(self.state.lock().input.len())
    }

    async fn read_byte(&mut self) -> Result<u8> {
        self.state
            .lock()
            .input
            .pop_front()
            .ok_or_else(|| Error::Hardware("sim transport read past scripted input".into()))
    }

    async fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.state.lock().output.push(byte);
        Ok(())
    }
}

/// Records the square-wave configuration instead of toggling a pin.
#[derive(Clone, Default)]
pub struct SimSquareWave {
    period_ns: Arc<Mutex<Option<u32>>>,
}

impl SimSquareWave {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn period_ns(&self) -> Option<u32> {
        *self.period_ns.lock()
    }
}

#[async_trait]
impl SquareWave for SimSquareWave {
    async fn start(&mut self, period_ns: u32) -> Result<()> {
        *self.period_ns.lock() = Some(period_ns);
        Ok(())
    }
}
