use manus_protocol::Goto;
use manus_protocol::NodeId;

use crate::context::WorkflowContext;
use crate::error::NodeError;
use crate::state::Command;
use crate::state::RunState;

/// Substring of the coordinator's answer that starts planning.
pub const HANDOFF_MARKER: &str = "handoff_to_planner";

pub(super) async fn run(ctx: &WorkflowContext, state: &RunState) -> Result<Command, NodeError> {
    tracing::info!("Coordinator talking");
    let messages = ctx
        .prompts
        .apply(NodeId::Coordinator, &state.prompt_vars(), state.messages());
    let response = ctx
        .model_for(NodeId::Coordinator)
        .await?
        .invoke(&messages)
        .await?;
    tracing::debug!(%response, "coordinator response");

    let goto = if response.contains(HANDOFF_MARKER) {
        Goto::Node(NodeId::Planner)
    } else {
        Goto::End
    };
    Ok(Command::goto(goto))
}
