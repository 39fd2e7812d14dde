//! The node behaviours. Each takes the run state by reference and returns
//! the delta to apply; none of them mutates the state.

mod coordinator;
mod planner;
mod reporter;
mod supervisor;
mod workers;

pub use coordinator::HANDOFF_MARKER;
pub use planner::SearchRecord;
pub use planner::normalize_search_results;

use manus_protocol::Message;
use manus_protocol::NodeId;

use crate::context::WorkflowContext;
use crate::error::NodeError;
use crate::state::Command;
use crate::state::RunState;

/// Runs one step of `node`.
pub(crate) async fn execute(
    node: NodeId,
    ctx: &WorkflowContext,
    state: &RunState,
) -> Result<Command, NodeError> {
    match node {
        NodeId::Coordinator => coordinator::run(ctx, state).await,
        NodeId::Planner => planner::run(ctx, state).await,
        NodeId::Supervisor => supervisor::run(ctx, state).await,
        NodeId::Researcher => workers::run(node, ctx.agents.researcher.as_ref(), state).await,
        NodeId::Coder => workers::run(node, ctx.agents.coder.as_ref(), state).await,
        NodeId::Browser => workers::run(node, ctx.agents.browser.as_ref(), state).await,
        NodeId::Reporter => reporter::run(ctx, state).await,
    }
}

/// Wraps a worker or reporter answer so the supervisor sees every result in
/// the same shape.
pub fn attributed_response(node: NodeId, text: &str) -> Message {
    Message::user(format!(
        "Response from {node}:\n\n<response>\n{text}\n</response>\n\n*Please execute the next step.*"
    ))
    .with_name(node.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use manus_protocol::Role;
    use pretty_assertions::assert_eq;

    #[test]
    fn envelope_names_the_role() {
        let message = attributed_response(NodeId::Coder, "42");
        assert_eq!(message.role, Role::User);
        assert_eq!(message.name.as_deref(), Some("coder"));
        assert_eq!(
            message.text(),
            "Response from coder:\n\n<response>\n42\n</response>\n\n*Please execute the next step.*"
        );
    }
}
