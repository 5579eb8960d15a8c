//! Simulated time sync slave.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::ErrorCode;
use crate::hal::{NodeId, TimeSyncSlave};

#[derive(Default)]
struct State {
    fail_with: Option<ErrorCode>,
    started: bool,
    master: NodeId,
}

/// Time sync slave with a scripted start result and a settable master.
pub struct SimTimeSync {
    state: Arc<Mutex<State>>,
}

/// Shared view of a [`SimTimeSync`]'s state.
#[derive(Clone)]
pub struct SimTimeSyncHandle {
    state: Arc<Mutex<State>>,
}

impl SimTimeSync {
    /// Starts successfully; no master until one is set.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// `start()` returns `code`.
    pub fn failing(code: ErrorCode) -> Self {
        let sync = Self::new();
        sync.state.lock().fail_with = Some(code);
        sync
    }

    pub fn handle(&self) -> SimTimeSyncHandle {
        SimTimeSyncHandle {
            state: Arc::clone(&self.state),
        }
    }
}

impl Default for SimTimeSync {
    fn default() -> Self {
        Self::new()
    }
}

impl SimTimeSyncHandle {
    pub fn is_started(&self) -> bool {
        self.state.lock().started
    }

    /// Simulates hearing a time master with identity `id`.
    pub fn set_master(&self, id: NodeId) {
        self.state.lock().master = id;
    }
}

#[async_trait]
impl TimeSyncSlave for SimTimeSync {
    async fn start(&mut self) -> Result<(), ErrorCode> {
        let mut s = self.state.lock();
        if let Some(code) = s.fail_with {
            return Err(code);
        }
        s.started = true;
        Ok(())
    }

    fn master_node_id(&self) -> NodeId {
        self.state.lock().master
    }
}
