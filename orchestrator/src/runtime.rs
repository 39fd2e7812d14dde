//! The run driver: dispatches one node at a time until a termination signal.

use std::sync::Arc;

use futures::Stream;
use manus_protocol::Goto;
use manus_protocol::Message;
use manus_protocol::NodeId;
use manus_protocol::RunId;
use manus_protocol::WorkflowEvent;
use manus_protocol::protocol::FinishReason;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::context::WorkflowContext;
use crate::error::RunError;
use crate::events::EventEmitter;
use crate::nodes;
use crate::state::RunConfig;
use crate::state::RunState;
use crate::validation::is_allowed_handoff;

/// Result of a run that reached a termination signal.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub run_id: RunId,
    pub state: RunState,
    pub reason: FinishReason,
    /// Number of node steps executed.
    pub steps: usize,
}

/// Entry point for workflow runs. Cheap to clone; clones share the context.
#[derive(Clone)]
pub struct Orchestrator {
    ctx: Arc<WorkflowContext>,
}

impl Orchestrator {
    pub fn new(ctx: WorkflowContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }

    /// Runs to termination and returns the final state.
    pub async fn run(
        &self,
        messages: Vec<Message>,
        config: RunConfig,
    ) -> Result<RunOutcome, RunError> {
        let mut driver = RunDriver::start(Arc::clone(&self.ctx), messages, config)?;
        loop {
            if let Progress::Finished(reason) = driver.advance().await? {
                return Ok(driver.finish(reason));
            }
        }
    }

    /// Lazily runs the workflow, yielding one event per completed step and
    /// then exactly one terminal event.
    ///
    /// Nothing is dispatched until the stream is polled, and `cancel` is
    /// checked before every step: once it fires, the stream yields
    /// `run_finished` with reason `cancelled` and ends. A provider call that
    /// is already in flight completes first.
    pub fn stream(
        &self,
        messages: Vec<Message>,
        config: RunConfig,
        cancel: CancellationToken,
    ) -> impl Stream<Item = WorkflowEvent> + Send + 'static {
        let ctx = Arc::clone(&self.ctx);
        async_stream::stream! {
            match RunDriver::start(ctx, messages, config) {
                Err(err) => {
                    yield EventEmitter::new(RunId::new()).error(0, &err);
                }
                Ok(mut driver) => loop {
                    if cancel.is_cancelled() {
                        tracing::info!(run_id = %driver.emitter.run_id(), "run cancelled");
                        yield driver.emitter.run_finished(driver.steps, FinishReason::Cancelled);
                        break;
                    }
                    match driver.advance().await {
                        Ok(Progress::Step(event)) => {
                            yield event;
                        }
                        Ok(Progress::Finished(reason)) => {
                            yield driver.emitter.run_finished(driver.steps, reason);
                            break;
                        }
                        Err(err) => {
                            yield driver.emitter.error(driver.steps, &err);
                            break;
                        }
                    }
                },
            }
        }
    }
}

enum Progress {
    Step(WorkflowEvent),
    Finished(FinishReason),
}

/// Owns the state of one run. Single writer: steps run strictly one after
/// another.
struct RunDriver {
    ctx: Arc<WorkflowContext>,
    emitter: EventEmitter,
    state: RunState,
    current: Goto,
    last: Option<NodeId>,
    steps: usize,
    debug: bool,
}

impl RunDriver {
    fn start(
        ctx: Arc<WorkflowContext>,
        messages: Vec<Message>,
        config: RunConfig,
    ) -> Result<Self, RunError> {
        if messages.is_empty() {
            return Err(RunError::EmptyInput);
        }

        let emitter = EventEmitter::new(RunId::new());
        tracing::info!(
            run_id = %emitter.run_id(),
            messages = messages.len(),
            deep_thinking_mode = config.deep_thinking_mode,
            search_before_planning = config.search_before_planning,
            "starting workflow"
        );
        let state = RunState::new(messages, ctx.team_members.clone(), &config);
        Ok(Self {
            ctx,
            emitter,
            state,
            current: Goto::Node(NodeId::Coordinator),
            last: None,
            steps: 0,
            debug: config.debug,
        })
    }

    async fn advance(&mut self) -> Result<Progress, RunError> {
        let Some(node) = self.current.node() else {
            return Ok(Progress::Finished(finish_reason(self.last)));
        };

        if self.steps >= self.ctx.max_steps {
            tracing::error!(limit = self.ctx.max_steps, "step limit exceeded");
            return Err(RunError::StepLimitExceeded {
                limit: self.ctx.max_steps,
                state: Box::new(self.state.clone()),
            });
        }
        self.steps += 1;

        let span = tracing::info_span!(
            "step",
            run_id = %self.emitter.run_id(),
            step = self.steps,
            node = %node,
        );
        let command = match nodes::execute(node, &self.ctx, &self.state)
            .instrument(span)
            .await
        {
            Ok(command) => command,
            Err(source) => {
                tracing::error!(%node, error = %source, "node failed");
                return Err(RunError::NodeFailed {
                    node,
                    state: Box::new(self.state.clone()),
                    source,
                });
            }
        };

        if !is_allowed_handoff(node, command.goto) {
            return Err(RunError::InvalidHandoff {
                from: node,
                to: command.goto,
                state: Box::new(self.state.clone()),
            });
        }

        if self.debug {
            tracing::info!(%node, goto = %command.goto, messages = ?command.messages, "step completed");
        } else {
            tracing::debug!(%node, goto = %command.goto, "step completed");
        }

        let event = self.emitter.step_completed(self.steps, node, &command);
        self.current = command.goto;
        self.last = Some(node);
        self.state.apply(command);
        Ok(Progress::Step(event))
    }

    fn finish(self, reason: FinishReason) -> RunOutcome {
        tracing::info!(run_id = %self.emitter.run_id(), steps = self.steps, ?reason, "workflow finished");
        RunOutcome {
            run_id: self.emitter.run_id(),
            state: self.state,
            reason,
            steps: self.steps,
        }
    }
}

/// Which node ended the run decides how it ended.
fn finish_reason(last: Option<NodeId>) -> FinishReason {
    match last {
        Some(NodeId::Coordinator) => FinishReason::NoHandoff,
        Some(NodeId::Planner) => FinishReason::InvalidPlan,
        _ => FinishReason::Finished,
    }
}
