use manus_core::ManusErr;
use manus_protocol::Goto;
use manus_protocol::NodeId;
use thiserror::Error;

use crate::state::RunState;

/// The supervisor picked a target outside this run's team.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("supervisor chose `{choice}`, expected one of: {allowed}")]
pub struct RoutingViolation {
    pub choice: String,
    pub allowed: String,
}

/// Why a single node step failed.
#[derive(Debug, Error)]
pub enum NodeError {
    /// Provider, tool-agent or structured-output failure.
    #[error(transparent)]
    Provider(#[from] ManusErr),

    #[error(transparent)]
    Routing(#[from] RoutingViolation),
}

/// A run that ended without a clean termination.
///
/// Every variant raised after the run started carries the transcript
/// accumulated up to the failure.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("input could not be empty")]
    EmptyInput,

    #[error("{node} failed: {source}")]
    NodeFailed {
        node: NodeId,
        state: Box<RunState>,
        #[source]
        source: NodeError,
    },

    #[error("{from} may not hand off to {to}")]
    InvalidHandoff {
        from: NodeId,
        to: Goto,
        state: Box<RunState>,
    },

    #[error("run did not finish within {limit} steps")]
    StepLimitExceeded { limit: usize, state: Box<RunState> },
}

impl RunError {
    /// Node whose step caused the failure.
    pub fn node(&self) -> Option<NodeId> {
        match self {
            RunError::NodeFailed { node, .. } => Some(*node),
            RunError::InvalidHandoff { from, .. } => Some(*from),
            RunError::EmptyInput | RunError::StepLimitExceeded { .. } => None,
        }
    }

    /// Transcript and routing state at the moment of failure.
    pub fn state(&self) -> Option<&RunState> {
        match self {
            RunError::NodeFailed { state, .. }
            | RunError::InvalidHandoff { state, .. }
            | RunError::StepLimitExceeded { state, .. } => Some(state),
            RunError::EmptyInput => None,
        }
    }
}
