//! The agents bound to the worker nodes.

use std::sync::Arc;

use async_trait::async_trait;
use manus_core::LlmTier;
use manus_core::PromptLibrary;
use manus_core::ProviderRegistry;
use manus_core::ReactAgent;
use manus_core::Result;
use manus_core::ToolRegistry;
use manus_protocol::NodeId;

use crate::state::RunState;

/// A capability-scoped agent. It may take many internal turns; the run only
/// ever sees its final answer.
#[async_trait]
pub trait Agent: Send + Sync {
    async fn invoke(&self, state: &RunState) -> Result<String>;
}

/// Renders the node's role prompt over the run transcript and drives a
/// [`ReactAgent`] with a fixed tool set.
pub struct ToolAgent {
    node: NodeId,
    tier: LlmTier,
    providers: Arc<ProviderRegistry>,
    prompts: Arc<PromptLibrary>,
    tools: ToolRegistry,
    max_iterations: usize,
}

impl ToolAgent {
    pub fn new(
        node: NodeId,
        tier: LlmTier,
        providers: Arc<ProviderRegistry>,
        prompts: Arc<PromptLibrary>,
        tools: ToolRegistry,
        max_iterations: usize,
    ) -> Self {
        Self {
            node,
            tier,
            providers,
            prompts,
            tools,
            max_iterations,
        }
    }
}

#[async_trait]
impl Agent for ToolAgent {
    async fn invoke(&self, state: &RunState) -> Result<String> {
        let model = self.providers.get(self.tier).await?;
        let messages = self
            .prompts
            .apply(self.node, &state.prompt_vars(), state.messages());
        ReactAgent::new(
            self.node.to_string(),
            model,
            self.tools.clone(),
            self.max_iterations,
        )
        .run(messages)
        .await
    }
}

/// One agent per worker node.
#[derive(Clone)]
pub struct WorkerAgents {
    pub researcher: Arc<dyn Agent>,
    pub coder: Arc<dyn Agent>,
    pub browser: Arc<dyn Agent>,
}
