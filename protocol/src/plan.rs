use serde::Deserialize;
use serde::Serialize;

// Shape requested from the planner prompt. The orchestrator only requires the
// plan to be valid JSON, so every field is lenient.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub thought: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub steps: Vec<PlanStep>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanStep {
    #[serde(default)]
    pub agent_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Optional remark for the executing agent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}
