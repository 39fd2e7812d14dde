use manus_protocol::Goto;
use manus_protocol::NodeId;

use crate::context::WorkflowContext;
use crate::error::NodeError;
use crate::state::Command;
use crate::state::RunState;
use crate::validation::parse_route;
use crate::validation::route_schema;

pub(super) async fn run(ctx: &WorkflowContext, state: &RunState) -> Result<Command, NodeError> {
    tracing::info!("Supervisor evaluating next action");
    let messages = ctx
        .prompts
        .apply(NodeId::Supervisor, &state.prompt_vars(), state.messages());
    let schema = route_schema(state.team_members());
    let response = ctx
        .model_for(NodeId::Supervisor)
        .await?
        .invoke_structured(&messages, &schema)
        .await?;
    tracing::debug!(%response, "supervisor response");

    let goto = parse_route(&response, state.team_members())?;
    match goto {
        Goto::End => tracing::info!("Workflow completed"),
        Goto::Node(node) => tracing::info!("Supervisor delegating to {node}"),
    }
    Ok(Command::goto(goto).with_next(goto))
}
