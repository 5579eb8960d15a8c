//! Simulated protocol node.
//!
//! [`SimNode`] is the collaborator handed to the supervisor. [`SimNodeHandle`]
//! shares its state so a test or the demo binary can script results and
//! inspect calls while the supervisor owns the node.

use std::collections::{BTreeSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::ErrorCode;
use crate::hal::{
    AllocatorUsage, CompatibilityOutcome, LogLevel, NodeHealth, NodeId, ProtocolNode,
};

/// Allocator block size in bytes.
pub const BLOCK_SIZE: usize = 64;

/// Blocks taken by the one-time setup performed on the first successful start.
const SETUP_BLOCKS: usize = 12;

/// Scripted outcome of one `spin()` call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpinStep {
    /// Dispatch for the full timeout, then succeed.
    Ok,
    /// Return the code immediately.
    Fail(ErrorCode),
    /// Never return.
    Hang,
}

struct Inner {
    start_script: VecDeque<Result<(), ErrorCode>>,
    compat_script: VecDeque<Result<CompatibilityOutcome, ErrorCode>>,
    spin_script: VecDeque<SpinStep>,
    /// Identities held by other participants on the bus.
    peers: BTreeSet<NodeId>,

    started: bool,
    start_calls: u32,
    setup_runs: u32,
    compat_checks: u32,
    spin_calls: u64,

    health: NodeHealth,
    log_level: LogLevel,
    info_logs: Vec<(String, String)>,

    total_blocks: usize,
    used_blocks: usize,
}

/// Shared view of a [`SimNode`]'s scripts and counters.
#[derive(Clone)]
pub struct SimNodeHandle {
    inner: Arc<Mutex<Inner>>,
}

impl SimNodeHandle {
    /// Queues results for upcoming `start()` calls that reach the engine.
    pub fn script_start(&self, results: impl IntoIterator<Item = Result<(), ErrorCode>>) {
        self.inner.lock().start_script.extend(results);
    }

    /// Queues results for upcoming compatibility checks.
    pub fn script_compat(
        &self,
        results: impl IntoIterator<Item = Result<CompatibilityOutcome, ErrorCode>>,
    ) {
        self.inner.lock().compat_script.extend(results);
    }

    pub fn script_spin(&self, steps: impl IntoIterator<Item = SpinStep>) {
        self.inner.lock().spin_script.extend(steps);
    }

    /// Puts a participant with identity `id` on the simulated bus.
    pub fn add_peer(&self, id: NodeId) {
        self.inner.lock().peers.insert(id);
    }

    pub fn remove_peer(&self, id: NodeId) {
        self.inner.lock().peers.remove(&id);
    }

    pub fn start_calls(&self) -> u32 {
        self.inner.lock().start_calls
    }

    /// How many times the one-time setup ran.
    pub fn setup_runs(&self) -> u32 {
        self.inner.lock().setup_runs
    }

    pub fn compat_checks(&self) -> u32 {
        self.inner.lock().compat_checks
    }

    pub fn spin_calls(&self) -> u64 {
        self.inner.lock().spin_calls
    }

    pub fn is_started(&self) -> bool {
        self.inner.lock().started
    }

    pub fn health(&self) -> NodeHealth {
        self.inner.lock().health
    }

    pub fn log_level(&self) -> LogLevel {
        self.inner.lock().log_level
    }

    /// `(source, message)` pairs accepted by the on-bus logger.
    pub fn info_logs(&self) -> Vec<(String, String)> {
        self.inner.lock().info_logs.clone()
    }
}

/// Protocol node backed by scripts and a block allocator model.
pub struct SimNode {
    id: NodeId,
    name: String,
    handle: SimNodeHandle,
}

impl SimNode {
    /// Creates an unstarted node whose allocator holds `pool_bytes`.
    pub fn new(pool_bytes: usize) -> Self {
        let inner = Inner {
            start_script: VecDeque::new(),
            compat_script: VecDeque::new(),
            spin_script: VecDeque::new(),
            peers: BTreeSet::new(),
            started: false,
            start_calls: 0,
            setup_runs: 0,
            compat_checks: 0,
            spin_calls: 0,
            health: NodeHealth::Initializing,
            log_level: LogLevel::default(),
            info_logs: Vec::new(),
            total_blocks: pool_bytes / BLOCK_SIZE,
            used_blocks: 0,
        };
        Self {
            id: NodeId::UNSET,
            name: String::new(),
            handle: SimNodeHandle {
                inner: Arc::new(Mutex::new(inner)),
            },
        }
    }

    pub fn handle(&self) -> SimNodeHandle {
        self.handle.clone()
    }
}

#[async_trait]
impl ProtocolNode for SimNode {
    fn node_id(&self) -> NodeId {
        self.id
    }

    fn set_node_id(&mut self, id: NodeId) {
        self.id = id;
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_owned();
    }

    async fn start(&mut self) -> Result<(), ErrorCode> {
        let mut g = self.handle.inner.lock();
        g.start_calls += 1;
        if g.started {
            return Ok(());
        }
        if let Some(Err(code)) = g.start_script.pop_front() {
            return Err(code);
        }
        if g.total_blocks < SETUP_BLOCKS {
            return Err(ErrorCode::MEMORY);
        }
        g.used_blocks += SETUP_BLOCKS;
        g.setup_runs += 1;
        g.started = true;
        Ok(())
    }

    async fn check_network_compatibility(&mut self) -> Result<CompatibilityOutcome, ErrorCode> {
        let mut g = self.handle.inner.lock();
        g.compat_checks += 1;
        if !g.started {
            return Err(ErrorCode::NOT_INITED);
        }
        if let Some(scripted) = g.compat_script.pop_front() {
            return scripted;
        }
        if g.peers.contains(&self.id) {
            return Ok(CompatibilityOutcome::conflict(self.id));
        }
        Ok(CompatibilityOutcome::compatible())
    }

    async fn spin(&mut self, timeout: Duration) -> Result<(), ErrorCode> {
        let step = {
            let mut g = self.handle.inner.lock();
            g.spin_calls += 1;
            if !g.started {
                return Err(ErrorCode::NOT_INITED);
            }
            g.spin_script.pop_front().unwrap_or(SpinStep::Ok)
        };
        match step {
            SpinStep::Ok => {
                tokio::time::sleep(timeout).await;
                Ok(())
            }
            SpinStep::Fail(code) => Err(code),
            SpinStep::Hang => {
                std::future::pending::<()>().await;
                Ok(())
            }
        }
    }

    fn health(&self) -> NodeHealth {
        self.handle.health()
    }

    fn set_status_ok(&mut self) {
        self.handle.inner.lock().health = NodeHealth::Ok;
    }

    fn set_log_level(&mut self, level: LogLevel) {
        self.handle.inner.lock().log_level = level;
    }

    fn log_info(&mut self, source: &str, message: &str) {
        let mut g = self.handle.inner.lock();
        if g.log_level > LogLevel::Info {
            return;
        }
        tracing::debug!(node_id = self.id.get(), source, message, "on-bus log");
        g.info_logs.push((source.to_owned(), message.to_owned()));
    }

    fn allocator_usage(&self) -> AllocatorUsage {
        let g = self.handle.inner.lock();
        AllocatorUsage {
            used_blocks: g.used_blocks,
            free_blocks: g.total_blocks - g.used_blocks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn start_is_idempotent() {
        let mut node = SimNode::new(16384);
        let handle = node.handle();

        assert_eq!(node.start().await, Ok(()));
        assert_eq!(node.start().await, Ok(()));

        assert_eq!(handle.start_calls(), 2);
        assert_eq!(handle.setup_runs(), 1);
        assert_eq!(
            node.allocator_usage(),
            AllocatorUsage {
                used_blocks: SETUP_BLOCKS,
                free_blocks: 256 - SETUP_BLOCKS
            }
        );
    }

    #[tokio::test]
    async fn tiny_pool_fails_start() {
        let mut node = SimNode::new(BLOCK_SIZE);
        assert_eq!(node.start().await, Err(ErrorCode::MEMORY));
        assert!(!node.handle().is_started());
    }

    #[tokio::test]
    async fn peer_with_same_identity_conflicts() {
        let mut node = SimNode::new(4096);
        node.set_node_id(NodeId::new(42));
        let handle = node.handle();

        assert_eq!(
            node.check_network_compatibility().await,
            Err(ErrorCode::NOT_INITED)
        );

        node.start().await.expect("starts");
        handle.add_peer(NodeId::new(42));
        assert_eq!(
            node.check_network_compatibility().await,
            Ok(CompatibilityOutcome::conflict(NodeId::new(42)))
        );

        handle.remove_peer(NodeId::new(42));
        assert!(node
            .check_network_compatibility()
            .await
            .expect("check runs")
            .is_ok());
    }

    #[tokio::test]
    async fn on_bus_logger_respects_level() {
        let mut node = SimNode::new(4096);
        node.log_info("app", "dropped");
        node.set_log_level(LogLevel::Info);
        node.log_info("app", "kept");
        assert_eq!(
            node.handle().info_logs(),
            vec![("app".to_owned(), "kept".to_owned())]
        );
    }
}
