//! Full supervisor runs on the simulated platform.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::time;

use nodevisor::sim::{SimCanDriver, SimClock, SimIndicator, SimNode, SimTimeSync};
use nodevisor::{
    CompatibilityOutcome, Config, ErrorCode, Event, EventKind, NodeId, NodeState, Platform,
    Subscribe, Supervisor,
};

#[derive(Default)]
struct Recorder {
    kinds: Mutex<Vec<EventKind>>,
}

#[async_trait]
impl Subscribe for Recorder {
    async fn on_event(&self, ev: &Event) {
        self.kinds.lock().push(ev.kind);
    }

    fn name(&self) -> &'static str {
        "recorder"
    }
}

fn platform(cfg: &Config) -> (Platform, Arc<SimCanDriver>, Arc<SimIndicator>) {
    let can = SimCanDriver::init(cfg.can_bitrate, cfg.can_interfaces).expect("valid bitrate");
    let led = Arc::new(SimIndicator::new());
    let platform = Platform {
        transport: can.clone(),
        clock: Arc::new(SimClock::new()),
        indicator: led.clone(),
    };
    (platform, can, led)
}

#[tokio::test(start_paused = true)]
async fn reaches_operational_and_reports_health() {
    let cfg = Config::default();
    let (platform, can, _led) = platform(&cfg);
    can.inject_errors(0, 5);

    let node = SimNode::new(cfg.memory_pool_bytes);
    let handle = node.handle();
    let sup = Supervisor::builder(cfg, platform)
        .build(move || node, SimTimeSync::new())
        .expect("valid config");
    let tracker = sup.tracker();
    let task = tokio::spawn(sup.run());

    time::sleep(Duration::from_millis(12_500)).await;

    let snap = tracker.snapshot().await;
    assert_eq!(snap.state, NodeState::Operational);
    assert_eq!(snap.start_attempts, 1);
    assert_eq!(snap.health_reports, 2);
    assert_eq!(snap.clock_reports, 2);
    let health = snap.last_health.expect("health snapshot");
    assert_eq!(health.can_errors, vec![5, 0]);
    assert_eq!(health.iteration, 2);

    assert_eq!(handle.spin_calls(), 3);
    assert_eq!(handle.info_logs().len(), 2);

    task.abort();
}

#[tokio::test(start_paused = true)]
async fn identity_comes_from_config() {
    let mut cfg = Config::default();
    cfg.node_id = NodeId::new(17);
    cfg.node_name = "org.example.sensor".into();
    let (platform, _can, _led) = platform(&cfg);

    let recorder = Arc::new(Recorder::default());
    let subs: Vec<Arc<dyn Subscribe>> = vec![recorder.clone()];
    let sup = Supervisor::builder(cfg, platform)
        .with_subscribers(subs)
        .build(|| SimNode::new(4096), SimTimeSync::new())
        .expect("valid config");
    let mut rx = sup.bus().subscribe();
    let task = tokio::spawn(sup.run());

    let constructed = rx.recv().await.expect("bus open");
    assert_eq!(constructed.kind, EventKind::NodeConstructed);
    assert_eq!(constructed.node, Some(NodeId::new(17)));
    assert_eq!(constructed.reason.as_deref(), Some("org.example.sensor"));

    time::sleep(Duration::from_millis(100)).await;
    let kinds = recorder.kinds.lock().clone();
    assert_eq!(
        kinds,
        vec![
            EventKind::NodeConstructed,
            EventKind::StartAttempt,
            EventKind::CompatibilityChecking,
            EventKind::BringUpComplete,
            EventKind::TimeSyncStarting,
            EventKind::TimeSyncStarted,
            EventKind::Operational,
        ]
    );

    task.abort();
}

#[tokio::test(start_paused = true)]
async fn conflict_then_recovery_is_tracked() {
    let cfg = Config::default();
    let (platform, _can, _led) = platform(&cfg);

    let node = SimNode::new(cfg.memory_pool_bytes);
    node.handle()
        .script_compat([Ok(CompatibilityOutcome::conflict(NodeId::new(42)))]);
    let sup = Supervisor::builder(cfg, platform)
        .build(move || node, SimTimeSync::new())
        .expect("valid config");
    let tracker = sup.tracker();
    let task = tokio::spawn(sup.run());

    time::sleep(Duration::from_secs(1)).await;
    let snap = tracker.snapshot().await;
    assert_eq!(snap.state, NodeState::Retrying);
    assert_eq!(snap.conflicts, 1);
    assert_eq!(snap.last_conflict, Some(NodeId::new(42)));

    time::sleep(Duration::from_secs(3)).await;
    let snap = tracker.snapshot().await;
    assert_eq!(snap.state, NodeState::Operational);
    assert_eq!(snap.conflicts, 1);
    assert_eq!(snap.start_attempts, 2);

    task.abort();
}

#[tokio::test(start_paused = true)]
async fn time_sync_failure_halts_with_blinking_led() {
    let cfg = Config::default();
    let (platform, _can, led) = platform(&cfg);

    let node = SimNode::new(cfg.memory_pool_bytes);
    let handle = node.handle();
    let sup = Supervisor::builder(cfg, platform)
        .build(move || node, SimTimeSync::failing(ErrorCode::MEMORY))
        .expect("valid config");
    let tracker = sup.tracker();
    let task = tokio::spawn(sup.run());

    time::sleep(Duration::from_millis(4_500)).await;

    let snap = tracker.snapshot().await;
    assert_eq!(snap.state, NodeState::FatalHalt);
    assert_eq!(snap.halt_code, Some(ErrorCode::MEMORY));
    assert_eq!(handle.spin_calls(), 0);

    let writes = led.writes();
    let tail = &writes[writes.len().saturating_sub(5)..];
    assert_eq!(tail, [false, true, false, true, false]);
    assert!(!led.is_on());

    task.abort();
}
