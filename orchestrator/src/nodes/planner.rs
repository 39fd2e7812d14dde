use futures::StreamExt;
use manus_core::LlmTier;
use manus_core::ManusErr;
use manus_protocol::Goto;
use manus_protocol::Message;
use manus_protocol::NodeId;
use serde::Serialize;
use serde_json::Value;

use crate::context::WorkflowContext;
use crate::error::NodeError;
use crate::state::Command;
use crate::state::RunState;
use crate::validation::is_valid_plan;
use crate::validation::parse_plan;
use crate::validation::strip_json_fence;

const NO_TITLE: &str = "No title";
const NO_CONTENT: &str = "No content";
const SEARCH_RESULT_TITLE: &str = "Search results";

/// One pre-planning search hit as shown to the planner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchRecord {
    pub title: String,
    pub content: String,
}

/// Coerces whatever the search provider returned into `{title, content}`
/// records. A string becomes one record; any other non-list value is
/// stringified into one record.
pub fn normalize_search_results(results: Value) -> Vec<SearchRecord> {
    match results {
        Value::Array(items) => items.into_iter().map(record_from_item).collect(),
        Value::String(content) => vec![SearchRecord {
            title: SEARCH_RESULT_TITLE.to_string(),
            content,
        }],
        other => vec![SearchRecord {
            title: SEARCH_RESULT_TITLE.to_string(),
            content: other.to_string(),
        }],
    }
}

fn record_from_item(item: Value) -> SearchRecord {
    let field = |key: &str, default: &str| match item.get(key) {
        Some(Value::String(text)) => text.clone(),
        Some(Value::Null) | None => default.to_string(),
        Some(other) => other.to_string(),
    };
    match &item {
        Value::Object(_) => SearchRecord {
            title: field("title", NO_TITLE),
            content: field("content", NO_CONTENT),
        },
        Value::String(text) => SearchRecord {
            title: NO_TITLE.to_string(),
            content: text.clone(),
        },
        other => SearchRecord {
            title: NO_TITLE.to_string(),
            content: other.to_string(),
        },
    }
}

pub(super) async fn run(ctx: &WorkflowContext, state: &RunState) -> Result<Command, NodeError> {
    tracing::info!("Planner generating full plan");
    let mut messages = ctx
        .prompts
        .apply(NodeId::Planner, &state.prompt_vars(), state.messages());

    let tier = if state.deep_thinking_mode() {
        ctx.agent_llm_map.tier_for(NodeId::Planner)
    } else {
        LlmTier::Basic
    };

    if state.search_before_planning() {
        let query = state.latest_user_text().unwrap_or_default();
        let results = ctx.search.search(&query).await?;
        let records = normalize_search_results(results);
        tracing::debug!(count = records.len(), "pre-planning search results");
        let block = serde_json::to_string(&records).map_err(ManusErr::from)?;
        if let Some(last) = messages.last_mut() {
            last.content
                .push_text(&format!("\n\n# Relative Search Results\n\n{block}"));
        }
    }

    let model = ctx.model(tier).await?;
    let mut chunks = model.stream(&messages).await?;
    let mut full_response = String::new();
    while let Some(chunk) = chunks.next().await {
        full_response.push_str(&chunk?);
    }
    tracing::debug!(response = %full_response, "planner response");

    let plan = strip_json_fence(&full_response).to_string();
    let message = Message::user(plan.clone()).with_name(NodeId::Planner.as_ref());

    if !is_valid_plan(&plan) {
        tracing::warn!("Planner response is not a valid JSON");
        return Ok(Command::goto(Goto::End).with_message(message));
    }

    if let Some(parsed) = parse_plan(&plan) {
        tracing::info!(title = %parsed.title, steps = parsed.steps.len(), "plan ready");
    }
    Ok(Command::goto(NodeId::Supervisor)
        .with_message(message)
        .with_full_plan(plan))
}
