//! Closed identifiers for workflow nodes and routing targets.

use serde::Deserialize;
use serde::Serialize;
use strum_macros::AsRefStr;
use strum_macros::Display;
use strum_macros::EnumIter;
use strum_macros::EnumString;

/// Wire name of the termination target.
pub const END: &str = "__end__";

/// Every node of the workflow graph.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeId {
    Coordinator,
    Planner,
    Supervisor,
    Researcher,
    Coder,
    Browser,
    Reporter,
}

/// The nodes the Supervisor may delegate to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TeamMember {
    Researcher,
    Coder,
    Browser,
    Reporter,
}

impl TeamMember {
    pub fn node(self) -> NodeId {
        match self {
            TeamMember::Researcher => NodeId::Researcher,
            TeamMember::Coder => NodeId::Coder,
            TeamMember::Browser => NodeId::Browser,
            TeamMember::Reporter => NodeId::Reporter,
        }
    }

    /// The full default roster.
    pub fn all() -> Vec<TeamMember> {
        vec![
            TeamMember::Researcher,
            TeamMember::Coder,
            TeamMember::Browser,
            TeamMember::Reporter,
        ]
    }
}

impl From<TeamMember> for NodeId {
    fn from(member: TeamMember) -> Self {
        member.node()
    }
}

/// Control target produced by a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Goto {
    Node(NodeId),
    End,
}

impl Goto {
    pub fn node(self) -> Option<NodeId> {
        match self {
            Goto::Node(node) => Some(node),
            Goto::End => None,
        }
    }
}

impl From<NodeId> for Goto {
    fn from(node: NodeId) -> Self {
        Goto::Node(node)
    }
}

impl std::fmt::Display for Goto {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Goto::Node(node) => write!(f, "{node}"),
            Goto::End => f.write_str(END),
        }
    }
}

impl From<Goto> for String {
    fn from(goto: Goto) -> Self {
        goto.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown routing target `{0}`")]
pub struct UnknownTarget(pub String);

impl TryFrom<String> for Goto {
    type Error = UnknownTarget;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == END {
            return Ok(Goto::End);
        }
        value
            .parse::<NodeId>()
            .map(Goto::Node)
            .map_err(|_| UnknownTarget(value))
    }
}
