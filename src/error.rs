//! Error types used by the nodevisor runtime and its collaborators.
//!
//! This module defines:
//!
//! - [`ErrorCode`]: the raw negative status code reported by a collaborator
//!   (driver, protocol engine, time sync).
//! - [`NodeError`]: failures observed by the supervisor while driving the node.
//! - [`ConfigError`]: failures while loading or validating configuration.
//!
//! [`NodeError`] provides `as_label` for logs and [`NodeError::is_fatal`] to
//! classify what routes to the fatal halt state.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::hal::NodeId;

/// Negative status code returned by a collaborator.
///
/// Collaborators report failure as a negative integer; the magnitude identifies
/// the error class. Codes are opaque to the supervisor: they are logged and,
/// for fatal paths, handed to the halt handler verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub i16);

impl ErrorCode {
    /// Unspecified failure.
    pub const FAILURE: ErrorCode = ErrorCode(-1);
    /// An argument was rejected (e.g. unsupported bitrate).
    pub const INVALID_PARAM: ErrorCode = ErrorCode(-2);
    /// Allocator pool exhausted.
    pub const MEMORY: ErrorCode = ErrorCode(-3);
    /// CAN driver reported an error.
    pub const DRIVER: ErrorCode = ErrorCode(-4);
    /// Operation requires a started node.
    pub const NOT_INITED: ErrorCode = ErrorCode(-8);
    /// Internal logic error (used when a supervisory task dies unexpectedly).
    pub const LOGIC: ErrorCode = ErrorCode(-10);

    /// Returns the raw integer value.
    #[inline]
    pub fn get(self) -> i16 {
        self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// # Errors observed while supervising the node.
///
/// Bring-up errors (`Start`, `Compatibility`, `Conflict`) and dispatch errors
/// (`Spin`, `SpinTimeout`) are transient and retried where they occur.
/// `TimeSync`, `Platform` and `TaskDied` are fatal.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NodeError {
    /// `start()` on the protocol node returned a negative code.
    #[error("node start failed: {code}")]
    Start {
        /// Code reported by the protocol engine.
        code: ErrorCode,
    },

    /// The network compatibility check itself failed to run.
    #[error("network compatibility check failed: {code}")]
    Compatibility {
        /// Code reported by the protocol engine.
        code: ErrorCode,
    },

    /// Another participant already holds this node's identity.
    #[error("network conflict with node {node}")]
    Conflict {
        /// Identity of the conflicting peer.
        node: NodeId,
    },

    /// Protocol dispatch returned a negative code.
    #[error("spin failed: {code}")]
    Spin {
        /// Code reported by the protocol engine.
        code: ErrorCode,
    },

    /// Protocol dispatch did not return within its bound.
    #[error("spin did not return within {timeout:?}")]
    SpinTimeout {
        /// Deadline that was exceeded.
        timeout: Duration,
    },

    /// Time sync slave refused to start.
    #[error("time sync start failed: {code}")]
    TimeSync {
        /// Code reported by the time sync collaborator.
        code: ErrorCode,
    },

    /// Platform or driver initialization failed.
    #[error("platform init failed: {code}")]
    Platform {
        /// Code reported by the platform.
        code: ErrorCode,
    },

    /// The supervisory task terminated abnormally.
    #[error("supervisory task died: {reason}")]
    TaskDied {
        /// Panic or join failure description.
        reason: String,
    },
}

impl NodeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use nodevisor::{ErrorCode, NodeError};
    ///
    /// let err = NodeError::Start { code: ErrorCode(-4) };
    /// assert_eq!(err.as_label(), "node_start_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            NodeError::Start { .. } => "node_start_failed",
            NodeError::Compatibility { .. } => "node_compat_check_failed",
            NodeError::Conflict { .. } => "node_network_conflict",
            NodeError::Spin { .. } => "node_spin_failed",
            NodeError::SpinTimeout { .. } => "node_spin_timeout",
            NodeError::TimeSync { .. } => "time_sync_start_failed",
            NodeError::Platform { .. } => "platform_init_failed",
            NodeError::TaskDied { .. } => "supervisor_task_died",
        }
    }

    /// Status code to report when this error ends in the halt state.
    ///
    /// Variants without a collaborator code map to a fixed code:
    /// `Conflict` and `SpinTimeout` → [`ErrorCode::FAILURE`],
    /// `TaskDied` → [`ErrorCode::LOGIC`].
    pub fn code(&self) -> ErrorCode {
        match self {
            NodeError::Start { code }
            | NodeError::Compatibility { code }
            | NodeError::Spin { code }
            | NodeError::TimeSync { code }
            | NodeError::Platform { code } => *code,
            NodeError::Conflict { .. } | NodeError::SpinTimeout { .. } => ErrorCode::FAILURE,
            NodeError::TaskDied { .. } => ErrorCode::LOGIC,
        }
    }

    /// Indicates whether the error routes to the fatal halt state.
    ///
    /// # Example
    /// ```
    /// use nodevisor::{ErrorCode, NodeError};
    ///
    /// assert!(NodeError::TimeSync { code: ErrorCode(-3) }.is_fatal());
    /// assert!(!NodeError::Spin { code: ErrorCode(-4) }.is_fatal());
    /// ```
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            NodeError::TimeSync { .. } | NodeError::Platform { .. } | NodeError::TaskDied { .. }
        )
    }
}

/// # Errors produced while loading configuration.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// Config file is not valid TOML or does not match the schema.
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but a value is out of range.
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_classification() {
        assert!(NodeError::Platform { code: ErrorCode::DRIVER }.is_fatal());
        assert!(NodeError::TaskDied { reason: "panic".into() }.is_fatal());
        assert!(!NodeError::Start { code: ErrorCode::FAILURE }.is_fatal());
        assert!(!NodeError::Conflict { node: NodeId::new(42) }.is_fatal());
        assert!(!NodeError::SpinTimeout { timeout: Duration::from_secs(5) }.is_fatal());
    }

    #[test]
    fn codes_pass_through() {
        let err = NodeError::TimeSync { code: ErrorCode(-7) };
        assert_eq!(err.code(), ErrorCode(-7));
        assert_eq!(
            NodeError::TaskDied { reason: String::new() }.code(),
            ErrorCode::LOGIC
        );
    }

    #[test]
    fn display_includes_details() {
        let err = NodeError::Conflict { node: NodeId::new(42) };
        assert_eq!(err.to_string(), "network conflict with node 42");
    }
}
