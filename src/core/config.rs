//! # Runtime configuration.
//!
//! Provides [`Config`], the centralized settings for a supervised node.
//!
//! Config is used in three places:
//! 1. **Node construction**: identity and name applied by the node slot
//! 2. **Supervisory task**: bring-up backoff, spin bound
//! 3. **Activity task / halt**: sampling cadence, blink period
//!
//! ## Sentinel values
//! - `spin_grace = 0s` → the supervisor trusts the engine's own spin bound
//!   (no outer deadline, see [`Config::spin_deadline`])
//!
//! ## TOML
//! ```toml
//! bus_capacity = 1024
//!
//! [node]
//! id = 64
//! name = "org.nodevisor.demo"
//! memory_pool_bytes = 16384
//!
//! [can]
//! bitrate = 1000000
//! interfaces = 2
//!
//! [bringup.backoff]
//! first_ms = 3000
//! max_ms = 3000
//! factor = 1.0
//! jitter = "none"
//!
//! [diagnostics]
//! spin_timeout_ms = 5000
//! spin_grace_ms = 1000
//!
//! [activity]
//! sample_period_ms = 25
//! samples_per_cycle = 200
//!
//! [halt]
//! blink_half_period_ms = 1000
//! ```

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::hal::NodeId;
use crate::policies::BackoffPolicy;
use crate::policies::backoff::BackoffSection;

/// Settings for one supervised node.
///
/// ## Field semantics
/// - `node_id`, `node_name`: identity applied once at construction
/// - `memory_pool_bytes`: protocol engine allocator pool size
/// - `can_bitrate`, `can_interfaces`: handed to the CAN driver at platform init
/// - `backoff`: delay between bring-up attempts (default fixed 3s)
/// - `spin_timeout`: bound passed to every `spin()` call
/// - `spin_grace`: extra time before the supervisor declares a spin overrun (`0s` = none)
/// - `sample_period`, `samples_per_cycle`: activity indicator cadence
/// - `blink_half_period`: indicator off/on period in the halt state
/// - `bus_capacity`: event bus ring buffer size (min 1; clamped by Bus)
#[derive(Clone, Debug)]
pub struct Config {
    pub node_id: NodeId,
    pub node_name: String,
    pub memory_pool_bytes: usize,

    pub can_bitrate: u32,
    pub can_interfaces: usize,

    pub backoff: BackoffPolicy,

    pub spin_timeout: Duration,
    pub spin_grace: Duration,

    pub sample_period: Duration,
    pub samples_per_cycle: u32,

    pub blink_half_period: Duration,

    pub bus_capacity: usize,
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - node 64, `org.nodevisor.demo`, 16 KiB pool
    /// - 1 Mbit/s on 2 interfaces
    /// - fixed 3s bring-up backoff
    /// - 5s spin bound with 1s grace
    /// - 200 samples × 25ms activity cycle
    /// - 1s halt blink
    fn default() -> Self {
        Self {
            node_id: NodeId::new(64),
            node_name: "org.nodevisor.demo".to_string(),
            memory_pool_bytes: 16384,
            can_bitrate: 1_000_000,
            can_interfaces: 2,
            backoff: BackoffPolicy::default(),
            spin_timeout: Duration::from_millis(5000),
            spin_grace: Duration::from_millis(1000),
            sample_period: Duration::from_millis(25),
            samples_per_cycle: 200,
            blink_half_period: Duration::from_secs(1),
            bus_capacity: 1024,
        }
    }
}

impl Config {
    /// Loads and validates configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses and validates configuration from a TOML string.
    ///
    /// Missing sections and keys fall back to [`Config::default`].
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(s)?;
        let cfg = Config::from(file);
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects values the runtime cannot operate with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.node_id.is_unicast() {
            return Err(ConfigError::Invalid(format!(
                "node id {} outside 1..={}",
                self.node_id,
                NodeId::MAX
            )));
        }
        if self.node_name.trim().is_empty() {
            return Err(ConfigError::Invalid("node name is empty".into()));
        }
        if self.can_interfaces == 0 {
            return Err(ConfigError::Invalid("at least one CAN interface required".into()));
        }
        if self.spin_timeout.is_zero() {
            return Err(ConfigError::Invalid("spin timeout must be non-zero".into()));
        }
        if self.sample_period.is_zero() || self.samples_per_cycle == 0 {
            return Err(ConfigError::Invalid(
                "activity sample period and samples per cycle must be non-zero".into(),
            ));
        }
        if self.blink_half_period.is_zero() {
            return Err(ConfigError::Invalid("halt blink period must be non-zero".into()));
        }
        if self.backoff.first.is_zero() || self.backoff.max.is_zero() {
            return Err(ConfigError::Invalid(
                "bring-up backoff first and max must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Outer deadline for one `spin()` call as an `Option`.
    ///
    /// - `None` → no outer deadline (`spin_grace == 0`)
    /// - `Some(d)` → `spin_timeout + spin_grace`
    #[inline]
    pub fn spin_deadline(&self) -> Option<Duration> {
        if self.spin_grace.is_zero() {
            None
        } else {
            Some(self.spin_timeout + self.spin_grace)
        }
    }

    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Nominal duration of one activity-indicator cycle.
    #[inline]
    pub fn activity_cycle(&self) -> Duration {
        self.sample_period * self.samples_per_cycle
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    bus_capacity: Option<usize>,
    node: NodeSection,
    can: CanSection,
    bringup: BringUpSection,
    diagnostics: DiagnosticsSection,
    activity: ActivitySection,
    halt: HaltSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct NodeSection {
    id: Option<NodeId>,
    name: Option<String>,
    memory_pool_bytes: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CanSection {
    bitrate: Option<u32>,
    interfaces: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct BringUpSection {
    backoff: BackoffSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct DiagnosticsSection {
    spin_timeout_ms: Option<u64>,
    spin_grace_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ActivitySection {
    sample_period_ms: Option<u64>,
    samples_per_cycle: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct HaltSection {
    blink_half_period_ms: Option<u64>,
}

impl From<ConfigFile> for Config {
    fn from(f: ConfigFile) -> Self {
        let d = Config::default();
        let ms = Duration::from_millis;
        Self {
            node_id: f.node.id.unwrap_or(d.node_id),
            node_name: f.node.name.unwrap_or(d.node_name),
            memory_pool_bytes: f.node.memory_pool_bytes.unwrap_or(d.memory_pool_bytes),
            can_bitrate: f.can.bitrate.unwrap_or(d.can_bitrate),
            can_interfaces: f.can.interfaces.unwrap_or(d.can_interfaces),
            backoff: f.bringup.backoff.into(),
            spin_timeout: f.diagnostics.spin_timeout_ms.map(ms).unwrap_or(d.spin_timeout),
            spin_grace: f.diagnostics.spin_grace_ms.map(ms).unwrap_or(d.spin_grace),
            sample_period: f.activity.sample_period_ms.map(ms).unwrap_or(d.sample_period),
            samples_per_cycle: f.activity.samples_per_cycle.unwrap_or(d.samples_per_cycle),
            blink_half_period: f
                .halt
                .blink_half_period_ms
                .map(ms)
                .unwrap_or(d.blink_half_period),
            bus_capacity: f.bus_capacity.unwrap_or(d.bus_capacity),
        }
    }
}
