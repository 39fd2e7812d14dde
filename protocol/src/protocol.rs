//! Events a workflow run surfaces to its caller.
//!
//! A streaming run produces zero or more [`WorkflowEvent::StepCompleted`]
//! events followed by exactly one terminal event, either
//! [`WorkflowEvent::RunFinished`] or [`WorkflowEvent::Error`].

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::models::Message;
use crate::nodes::Goto;
use crate::nodes::NodeId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum WorkflowEvent {
    StepCompleted(StepCompletedEvent),
    RunFinished(RunFinishedEvent),
    Error(ErrorEvent),
}

impl WorkflowEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkflowEvent::StepCompleted(_))
    }

    pub fn run_id(&self) -> RunId {
        match self {
            WorkflowEvent::StepCompleted(ev) => ev.run_id,
            WorkflowEvent::RunFinished(ev) => ev.run_id,
            WorkflowEvent::Error(ev) => ev.run_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepCompletedEvent {
    pub run_id: RunId,
    /// 1-based index of the step within the run.
    pub step: usize,
    pub node: NodeId,
    /// Messages this step appended to the transcript, in order.
    pub messages: Vec<Message>,
    pub goto: Goto,
    /// Set only by the step that produced the plan.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_plan: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    /// The coordinator answered without handing off to the planner.
    NoHandoff,
    /// The planner produced something that is not valid JSON.
    InvalidPlan,
    /// The supervisor chose FINISH.
    Finished,
    /// The caller cancelled the run between steps.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunFinishedEvent {
    pub run_id: RunId,
    pub steps: usize,
    pub reason: FinishReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEvent {
    pub run_id: RunId,
    pub steps: usize,
    /// Node whose step failed, if the failure happened inside a step.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node: Option<NodeId>,
    pub message: String,
}
