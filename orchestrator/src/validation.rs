//! Checks applied to model output before it can steer the run.

use manus_core::llm::OutputSchema;
use manus_protocol::Goto;
use manus_protocol::NodeId;
use manus_protocol::TeamMember;
use manus_protocol::plan::Plan;
use serde_json::Value;
use serde_json::json;

use crate::error::RoutingViolation;

/// The supervisor's termination choice.
pub const FINISH: &str = "FINISH";

/// Removes a leading ```` ```json ```` and a trailing ```` ``` ```` fence if
/// present, along with surrounding whitespace.
pub fn strip_json_fence(text: &str) -> &str {
    let text = text.trim();
    let text = text.strip_prefix("```json").unwrap_or(text);
    let text = text.strip_suffix("```").unwrap_or(text);
    text.trim()
}

/// Whether the planner output is usable: any well-formed JSON document.
pub fn is_valid_plan(text: &str) -> bool {
    serde_json::from_str::<Value>(text).is_ok()
}

/// Best-effort typed view of a plan, for logging. A plan can be valid JSON
/// without matching this shape.
pub fn parse_plan(text: &str) -> Option<Plan> {
    serde_json::from_str(text).ok()
}

/// Structured-output schema for the supervisor: `{"next": <member>|"FINISH"}`.
pub fn route_schema(team_members: &[TeamMember]) -> OutputSchema {
    OutputSchema {
        name: "Router".to_string(),
        schema: json!({
            "type": "object",
            "properties": {
                "next": {
                    "type": "string",
                    "enum": route_options(team_members),
                },
            },
            "required": ["next"],
            "additionalProperties": false,
        }),
    }
}

fn route_options(team_members: &[TeamMember]) -> Vec<String> {
    team_members
        .iter()
        .map(ToString::to_string)
        .chain(std::iter::once(FINISH.to_string()))
        .collect()
}

/// Maps a supervisor answer to a routing target. Only members of this run's
/// team, or FINISH, are accepted.
pub fn parse_route(value: &Value, team_members: &[TeamMember]) -> Result<Goto, RoutingViolation> {
    let violation = || RoutingViolation {
        choice: value
            .get("next")
            .and_then(Value::as_str)
            .map_or_else(|| value.to_string(), str::to_string),
        allowed: route_options(team_members).join(", "),
    };

    let choice = value.get("next").and_then(Value::as_str).ok_or_else(violation)?;
    if choice == FINISH {
        return Ok(Goto::End);
    }
    match choice.parse::<TeamMember>() {
        Ok(member) if team_members.contains(&member) => Ok(Goto::Node(member.node())),
        _ => Err(violation()),
    }
}

/// The edges of the workflow graph.
pub fn is_allowed_handoff(from: NodeId, to: Goto) -> bool {
    use NodeId::*;

    match (from, to) {
        (Coordinator, Goto::Node(Planner) | Goto::End) => true,
        (Planner, Goto::Node(Supervisor) | Goto::End) => true,
        (Supervisor, Goto::End) => true,
        (Supervisor, Goto::Node(target)) => matches!(target, Researcher | Coder | Browser | Reporter),
        (Researcher | Coder | Browser | Reporter, Goto::Node(Supervisor)) => true,
        _ => false,
    }
}
