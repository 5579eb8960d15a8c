use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use nodevisor::sim::{init_platform_or_halt, SimClock, SimIndicator, SimNode, SimTimeSync};
use nodevisor::{CompatibilityOutcome, Config, ErrorCode, NodeId, Subscribe, Supervisor};

#[derive(Parser)]
#[command(name = "nodevisor", about = "CAN field-bus node supervisor (simulated platform)")]
struct Cli {
    /// Path to configuration file; built-in defaults are used when absent
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `node.id`
    #[arg(long)]
    node_id: Option<u8>,

    /// Override `node.name`
    #[arg(long)]
    name: Option<String>,

    /// Report a conflict with this peer on the first compatibility check
    #[arg(long, value_name = "ID")]
    peer_conflict: Option<u8>,

    /// Fail this many start attempts before succeeding
    #[arg(long, value_name = "N", default_value_t = 0)]
    fail_starts: usize,

    /// Largest gap between simulated frames, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 200)]
    traffic_gap_ms: u64,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    nodevisor::logging::init_from_env();

    let mut cfg = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("failed to load config from {}: {e}", path.display());
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    if let Some(id) = cli.node_id {
        cfg.node_id = NodeId::new(id);
    }
    if let Some(name) = cli.name.clone() {
        cfg.node_name = name;
    }
    if let Err(e) = cfg.validate() {
        eprintln!("{e}");
        std::process::exit(1);
    }

    let (platform, can) = init_platform_or_halt(
        &cfg,
        Arc::new(SimClock::new()),
        Arc::new(SimIndicator::new()),
    )
    .await;
    can.spawn_traffic(Duration::from_millis(cli.traffic_gap_ms));

    let pool = cfg.memory_pool_bytes;
    let fail_starts = cli.fail_starts;
    let peer_conflict = cli.peer_conflict.map(NodeId::new);
    let make_node = move || {
        let node = SimNode::new(pool);
        let handle = node.handle();
        handle.script_start(std::iter::repeat_n(Err(ErrorCode::FAILURE), fail_starts));
        if let Some(peer) = peer_conflict {
            handle.script_compat([Ok(CompatibilityOutcome::conflict(peer))]);
        }
        node
    };

    #[cfg(feature = "logging")]
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(nodevisor::EventLog)];
    #[cfg(not(feature = "logging"))]
    let subs: Vec<Arc<dyn Subscribe>> = Vec::new();

    let sup = match Supervisor::builder(cfg, platform)
        .with_subscribers(subs)
        .build(make_node, SimTimeSync::new())
    {
        Ok(sup) => sup,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    match sup.run().await {}
}
