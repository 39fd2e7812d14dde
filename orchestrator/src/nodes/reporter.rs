use manus_protocol::NodeId;

use super::attributed_response;
use crate::context::WorkflowContext;
use crate::error::NodeError;
use crate::state::Command;
use crate::state::RunState;

pub(super) async fn run(ctx: &WorkflowContext, state: &RunState) -> Result<Command, NodeError> {
    tracing::info!("Reporter writing final report");
    let messages = ctx
        .prompts
        .apply(NodeId::Reporter, &state.prompt_vars(), state.messages());
    let response = ctx
        .model_for(NodeId::Reporter)
        .await?
        .invoke(&messages)
        .await?;
    tracing::debug!(%response, "reporter response");

    Ok(Command::goto(NodeId::Supervisor)
        .with_message(attributed_response(NodeId::Reporter, &response)))
}
