//! Bring-up scenarios driven stage by stage.

use std::time::Duration;

use tokio::time::{self, Instant};

use nodevisor::sim::{SimCanDriver, SimClock, SimNode, SimTimeSync};
use nodevisor::{
    BackoffPolicy, BringUpSupervisor, Bus, CompatibilityOutcome, Config, DiagnosticsLoop, ErrorCode,
    Event, EventKind, NodeId, ProtocolNode, start_time_sync,
};

fn drain(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(ev) = rx.try_recv() {
        out.push(ev);
    }
    out
}

fn count(events: &[Event], kind: EventKind) -> usize {
    events.iter().filter(|e| e.kind == kind).count()
}

#[tokio::test(start_paused = true)]
async fn two_failed_starts_then_operational() {
    nodevisor::logging::init_for_tests();
    let cfg = Config::default();
    let bus = Bus::new(256);
    let mut rx = bus.subscribe();

    let mut node = SimNode::new(cfg.memory_pool_bytes);
    node.set_node_id(cfg.node_id);
    let handle = node.handle();
    handle.script_start([Err(ErrorCode::FAILURE), Err(ErrorCode::FAILURE)]);

    let begin = Instant::now();
    let started = BringUpSupervisor::new(cfg.backoff, bus.clone())
        .run(&mut node)
        .await;
    assert_eq!(begin.elapsed(), Duration::from_secs(6));

    let report = *started.report();
    assert_eq!(report.attempts, 3);
    assert_eq!(report.compatibility_checks, 1);
    assert_eq!(report.backoff_total, Duration::from_secs(6));

    let op = start_time_sync(started, SimTimeSync::new(), &bus)
        .await
        .expect("time sync starts");
    let can = SimCanDriver::init(cfg.can_bitrate, cfg.can_interfaces).expect("valid bitrate");
    let _diag = DiagnosticsLoop::enter(op, can, std::sync::Arc::new(SimClock::new()), bus, &cfg);

    let events = drain(&mut rx);
    assert_eq!(count(&events, EventKind::StartAttempt), 3);
    assert_eq!(count(&events, EventKind::StartFailed), 2);
    assert_eq!(count(&events, EventKind::CompatibilityChecking), 1);
    assert_eq!(count(&events, EventKind::BackoffScheduled), 2);
    assert_eq!(events.last().map(|e| e.kind), Some(EventKind::Operational));
    assert_eq!(handle.start_calls(), 3);
    assert_eq!(handle.setup_runs(), 1);
}

#[tokio::test(start_paused = true)]
async fn conflict_is_reported_once_then_cleared() {
    let bus = Bus::new(256);
    let mut rx = bus.subscribe();
    let mut node = SimNode::new(4096);
    node.set_node_id(NodeId::new(64));
    let handle = node.handle();
    handle.script_compat([Ok(CompatibilityOutcome::conflict(NodeId::new(42)))]);

    let started = BringUpSupervisor::new(BackoffPolicy::default(), bus.clone())
        .run(&mut node)
        .await;
    assert_eq!(started.report().attempts, 2);
    assert_eq!(started.report().conflicts, 1);

    let events = drain(&mut rx);
    let conflicts: Vec<_> = events
        .iter()
        .filter(|e| e.kind == EventKind::NetworkConflict)
        .collect();
    assert_eq!(conflicts.len(), 1);
    assert_eq!(conflicts[0].node, Some(NodeId::new(42)));
    assert_eq!(events.last().map(|e| e.kind), Some(EventKind::BringUpComplete));

    // The second attempt reuses the started node.
    assert_eq!(handle.setup_runs(), 1);
    assert_eq!(handle.compat_checks(), 2);
}

#[tokio::test(start_paused = true)]
async fn peer_leaving_during_backoff_unblocks_bring_up() {
    let bus = Bus::new(256);
    let id = NodeId::new(64);
    let mut node = SimNode::new(4096);
    node.set_node_id(id);
    let handle = node.handle();
    handle.add_peer(id);

    let supervisor = BringUpSupervisor::new(BackoffPolicy::constant(Duration::from_secs(3)), bus);
    let peer = handle.clone();
    let (started, ()) = tokio::join!(supervisor.run(&mut node), async move {
        time::sleep(Duration::from_secs(4)).await;
        peer.remove_peer(id);
    });

    // Conflicts at t=0 and t=3, peer gone at t=4, success at t=6.
    assert_eq!(started.report().attempts, 3);
    assert_eq!(started.report().conflicts, 2);
    assert_eq!(started.report().backoff_total, Duration::from_secs(6));
}

#[tokio::test(start_paused = true)]
async fn time_sync_failure_never_reaches_dispatch() {
    let bus = Bus::new(64);
    let mut node = SimNode::new(4096);
    let handle = node.handle();

    let started = BringUpSupervisor::new(BackoffPolicy::default(), bus.clone())
        .run(&mut node)
        .await;
    let err = match start_time_sync(started, SimTimeSync::failing(ErrorCode::MEMORY), &bus).await {
        Ok(_) => panic!("time sync must fail"),
        Err(e) => e,
    };

    assert!(err.is_fatal());
    assert_eq!(err.code(), ErrorCode::MEMORY);
    assert_eq!(handle.spin_calls(), 0);
}
