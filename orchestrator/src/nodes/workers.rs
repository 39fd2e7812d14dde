use manus_protocol::NodeId;

use super::attributed_response;
use crate::agents::Agent;
use crate::error::NodeError;
use crate::state::Command;
use crate::state::RunState;

/// Researcher, coder and browser share one shape: run the bound agent, wrap
/// its final answer, hand back to the supervisor.
pub(super) async fn run(
    node: NodeId,
    agent: &dyn Agent,
    state: &RunState,
) -> Result<Command, NodeError> {
    tracing::info!(agent = %node, "agent starting task");
    let response = agent.invoke(state).await?;
    tracing::info!(agent = %node, "agent completed task");
    tracing::debug!(agent = %node, %response, "agent response");

    Ok(Command::goto(NodeId::Supervisor).with_message(attributed_response(node, &response)))
}
