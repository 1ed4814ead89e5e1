//! In-memory SmartASD driver.
//!
//! [`SimulatedDriver`] implements [`SmartApi`] without any hardware so the
//! binding, the LED controller and the CLI can run on machines without the
//! vendor library. Boards can be plugged and unplugged at runtime, input
//! snapshots are queued by the test, and any entry point can be scripted
//! to fail with a chosen status.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use smartasd_driver::{InputFlags, InputSnapshot, SimulatedDriver, SmartAsdDevice};
//!
//! let sim = Arc::new(SimulatedDriver::new());
//! let id = sim.add_board("SmartASD 1");
//!
//! let device = SmartAsdDevice::attach(sim.clone(), "*")?;
//! device.set_all(0xff, 0xff)?;
//! assert_eq!(sim.outputs(id), Some(0xff));
//!
//! let mut snapshot = InputSnapshot::default();
//! snapshot.set(InputFlags::D1, true);
//! sim.push_input(id, snapshot);
//! assert!(device.get_all(Duration::from_millis(10))?.is_set(InputFlags::D1));
//! # Ok::<(), smartasd_driver::SmartAsdError>(())
//! ```

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use smartapi_sys::smart_input;
use tracing::{debug, trace};

use crate::api::{DeviceId, Operation, SmartApi, Status, STATUS_OK};
use crate::input::InputSnapshot;
use crate::output::{OutputWrite, OUTPUT_CHANNELS};

/// No snapshot arrived before the timeout.
pub const SIM_STATUS_TIMEOUT: Status = -1;
/// The device was not opened (or has been closed).
pub const SIM_STATUS_NOT_OPEN: Status = -2;
/// No board with that identifier is plugged in.
pub const SIM_STATUS_NO_DEVICE: Status = -3;
/// Output channel outside 0..=31.
pub const SIM_STATUS_BAD_CHANNEL: Status = -4;

/// First identifier handed out; looks like a heap address in logs.
const FIRST_DEVICE_ID: usize = 0x1000;

/// Number of recent calls kept by [`SimulatedDriver::calls`].
pub const CALL_LOG_CAPACITY: usize = 1024;

/// A recorded call into the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimCall {
    pub operation: Operation,
    pub device: Option<DeviceId>,
}

#[derive(Debug)]
struct SimBoard {
    id: DeviceId,
    name: String,
    open: bool,
    outputs: u32,
    pending: VecDeque<InputSnapshot>,
    open_count: u32,
}

#[derive(Debug, Default)]
struct SimState {
    boards: Vec<SimBoard>,
    next_id: usize,
    failures: HashMap<Operation, VecDeque<Status>>,
    calls: VecDeque<SimCall>,
    call_counts: HashMap<Operation, usize>,
}

impl SimState {
    fn board_mut(&mut self, id: DeviceId) -> Option<&mut SimBoard> {
        self.boards.iter_mut().find(|b| b.id == id)
    }

    fn record(&mut self, operation: Operation, device: Option<DeviceId>) -> Option<Status> {
        if self.calls.len() == CALL_LOG_CAPACITY {
            self.calls.pop_front();
        }
        self.calls.push_back(SimCall { operation, device });
        *self.call_counts.entry(operation).or_default() += 1;
        self.failures
            .get_mut(&operation)
            .and_then(|queue| queue.pop_front())
    }

    fn open_board_mut(&mut self, id: DeviceId) -> Result<&mut SimBoard, Status> {
        match self.board_mut(id) {
            None => Err(SIM_STATUS_NO_DEVICE),
            Some(board) if !board.open => Err(SIM_STATUS_NOT_OPEN),
            Some(board) => Ok(board),
        }
    }
}

/// Simulated driver backend.
#[derive(Debug)]
pub struct SimulatedDriver {
    state: Mutex<SimState>,
    input_ready: Condvar,
}

impl Default for SimulatedDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedDriver {
    /// Create a driver with no boards attached.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState {
                next_id: FIRST_DEVICE_ID,
                ..SimState::default()
            }),
            input_ready: Condvar::new(),
        }
    }

    /// Create a driver with one board per name, in scan order.
    pub fn with_boards<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let driver = Self::new();
        for name in names {
            driver.add_board(name);
        }
        driver
    }

    /// Plug in a board; it is appended to the scan order.
    pub fn add_board(&self, name: impl Into<String>) -> DeviceId {
        let mut state = self.state.lock();
        let id = DeviceId::from_raw(state.next_id);
        state.next_id += 0x10;
        let name = name.into();
        debug!(device = %id, name = %name, "Simulated board attached");
        state.boards.push(SimBoard {
            id,
            name,
            open: false,
            outputs: 0,
            pending: VecDeque::new(),
            open_count: 0,
        });
        id
    }

    /// Unplug a board. Later calls for it fail with [`SIM_STATUS_NO_DEVICE`].
    pub fn remove_board(&self, id: DeviceId) -> bool {
        let mut state = self.state.lock();
        let before = state.boards.len();
        state.boards.retain(|b| b.id != id);
        let removed = state.boards.len() != before;
        if removed {
            debug!(device = %id, "Simulated board detached");
            self.input_ready.notify_all();
        }
        removed
    }

    /// Queue a snapshot for the next `get_all` on `id`.
    pub fn push_input(&self, id: DeviceId, snapshot: InputSnapshot) -> bool {
        let mut state = self.state.lock();
        let Some(board) = state.board_mut(id) else {
            return false;
        };
        board.pending.push_back(snapshot);
        self.input_ready.notify_all();
        true
    }

    /// Current output word of a board.
    pub fn outputs(&self, id: DeviceId) -> Option<u32> {
        self.state.lock().board_mut(id).map(|b| b.outputs)
    }

    /// Whether a board is currently open.
    pub fn is_open(&self, id: DeviceId) -> bool {
        self.state.lock().board_mut(id).is_some_and(|b| b.open)
    }

    /// How many times a board has been opened.
    pub fn open_count(&self, id: DeviceId) -> u32 {
        self.state.lock().board_mut(id).map_or(0, |b| b.open_count)
    }

    /// Make the next call to `operation` return `code` instead of running.
    ///
    /// Several failures for the same operation are consumed in order.
    /// `Scan` and `Name` have no status to return; a scripted failure makes
    /// them report no devices / no name.
    pub fn fail_next(&self, operation: Operation, code: Status) {
        self.state
            .lock()
            .failures
            .entry(operation)
            .or_default()
            .push_back(code);
    }

    /// The most recent calls, oldest first, up to [`CALL_LOG_CAPACITY`].
    pub fn calls(&self) -> Vec<SimCall> {
        self.state.lock().calls.iter().copied().collect()
    }

    /// Number of calls made to `operation` since the driver was created.
    pub fn call_count(&self, operation: Operation) -> usize {
        self.state
            .lock()
            .call_counts
            .get(&operation)
            .copied()
            .unwrap_or(0)
    }
}

impl SmartApi for SimulatedDriver {
    fn backend(&self) -> &'static str {
        "simulated"
    }

    fn scan(&self) -> Vec<DeviceId> {
        let mut state = self.state.lock();
        if state.record(Operation::Scan, None).is_some() {
            return Vec::new();
        }
        state.boards.iter().map(|b| b.id).collect()
    }

    fn name(&self, device: DeviceId) -> Option<String> {
        let mut state = self.state.lock();
        if state.record(Operation::Name, Some(device)).is_some() {
            return None;
        }
        state.board_mut(device).map(|b| b.name.clone())
    }

    fn open(&self, device: DeviceId) -> Status {
        let mut state = self.state.lock();
        if let Some(code) = state.record(Operation::Open, Some(device)) {
            return code;
        }
        match state.board_mut(device) {
            Some(board) => {
                board.open = true;
                board.open_count += 1;
                STATUS_OK
            }
            None => SIM_STATUS_NO_DEVICE,
        }
    }

    fn close(&self, device: DeviceId) {
        let mut state = self.state.lock();
        state.record(Operation::Close, Some(device));
        if let Some(board) = state.board_mut(device) {
            board.open = false;
            board.pending.clear();
        }
        self.input_ready.notify_all();
    }

    fn set_all(&self, device: DeviceId, state_bits: u32, mask: u32) -> Status {
        let mut state = self.state.lock();
        if let Some(code) = state.record(Operation::SetAll, Some(device)) {
            return code;
        }
        match state.open_board_mut(device) {
            Ok(board) => {
                board.outputs = OutputWrite::new(state_bits, mask).apply(board.outputs);
                trace!(device = %device, outputs = board.outputs, "Simulated outputs written");
                STATUS_OK
            }
            Err(code) => code,
        }
    }

    fn set_single(&self, device: DeviceId, channel: i32, on: i32) -> Status {
        let mut state = self.state.lock();
        if let Some(code) = state.record(Operation::SetSingle, Some(device)) {
            return code;
        }
        let channel = match u32::try_from(channel) {
            Ok(ch) if ch < OUTPUT_CHANNELS => ch,
            _ => return SIM_STATUS_BAD_CHANNEL,
        };
        match state.open_board_mut(device) {
            Ok(board) => {
                let mask = 1u32 << channel;
                let write = OutputWrite::new(if on != 0 { mask } else { 0 }, mask);
                board.outputs = write.apply(board.outputs);
                STATUS_OK
            }
            Err(code) => code,
        }
    }

    fn get_all(&self, device: DeviceId, input: &mut smart_input, timeout_ms: i32) -> Status {
        let mut state = self.state.lock();
        if let Some(code) = state.record(Operation::GetAll, Some(device)) {
            return code;
        }
        let deadline = Instant::now() + Duration::from_millis(timeout_ms.max(0) as u64);
        loop {
            match state.open_board_mut(device) {
                Err(code) => return code,
                Ok(board) => {
                    if let Some(snapshot) = board.pending.pop_front() {
                        *input = snapshot.into();
                        return STATUS_OK;
                    }
                }
            }
            if self.input_ready.wait_until(&mut state, deadline).timed_out() {
                // Last look: a snapshot may have landed together with the timeout
                return match state.open_board_mut(device) {
                    Err(code) => code,
                    Ok(board) => match board.pending.pop_front() {
                        Some(snapshot) => {
                            *input = snapshot.into();
                            STATUS_OK
                        }
                        None => SIM_STATUS_TIMEOUT,
                    },
                };
            }
        }
    }
}
