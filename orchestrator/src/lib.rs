//! Multi-agent workflow engine.
//!
//! A run threads one [`RunState`] through a fixed node graph: the
//! coordinator decides whether to plan, the planner drafts a JSON plan, and
//! the supervisor then routes between the worker agents until it answers
//! FINISH. Every node returns a [`Command`] delta that the driver applies,
//! so exactly one node is active at a time and the transcript only grows.

pub mod agents;
pub mod context;
pub mod error;
pub mod events;
pub mod graph;
pub mod nodes;
pub mod runtime;
pub mod state;
pub mod validation;

pub use agents::Agent;
pub use agents::ToolAgent;
pub use agents::WorkerAgents;
pub use context::WorkflowContext;
pub use error::NodeError;
pub use error::RoutingViolation;
pub use error::RunError;
pub use runtime::Orchestrator;
pub use runtime::RunOutcome;
pub use state::Command;
pub use state::RunConfig;
pub use state::RunState;
