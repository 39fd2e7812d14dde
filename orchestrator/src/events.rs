//! Builds the events a run surfaces to its caller.

use manus_protocol::NodeId;
use manus_protocol::RunId;
use manus_protocol::WorkflowEvent;
use manus_protocol::protocol::ErrorEvent;
use manus_protocol::protocol::FinishReason;
use manus_protocol::protocol::RunFinishedEvent;
use manus_protocol::protocol::StepCompletedEvent;

use crate::error::RunError;
use crate::state::Command;

/// Stamps every event of one run with its id.
#[derive(Debug, Clone, Copy)]
pub struct EventEmitter {
    run_id: RunId,
}

impl EventEmitter {
    pub fn new(run_id: RunId) -> Self {
        Self { run_id }
    }

    pub fn run_id(&self) -> RunId {
        self.run_id
    }

    pub fn step_completed(&self, step: usize, node: NodeId, command: &Command) -> WorkflowEvent {
        WorkflowEvent::StepCompleted(StepCompletedEvent {
            run_id: self.run_id,
            step,
            node,
            messages: command.messages.clone(),
            goto: command.goto,
            full_plan: command.full_plan.clone(),
        })
    }

    pub fn run_finished(&self, steps: usize, reason: FinishReason) -> WorkflowEvent {
        WorkflowEvent::RunFinished(RunFinishedEvent {
            run_id: self.run_id,
            steps,
            reason,
        })
    }

    pub fn error(&self, steps: usize, err: &RunError) -> WorkflowEvent {
        WorkflowEvent::Error(ErrorEvent {
            run_id: self.run_id,
            steps,
            node: err.node(),
            message: err.to_string(),
        })
    }
}
