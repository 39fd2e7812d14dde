//! Everything a run needs from outside the state machine.

use std::sync::Arc;

use manus_core::ChatModel;
use manus_core::Config;
use manus_core::LlmTier;
use manus_core::PromptLibrary;
use manus_core::ProviderRegistry;
use manus_core::Result;
use manus_core::SearchProvider;
use manus_core::ToolRegistry;
use manus_core::config::AgentLlmMap;
use manus_core::config::DEFAULT_MAX_STEPS;
use manus_core::tools::handlers::BashHandler;
use manus_core::tools::handlers::BrowserHandler;
use manus_core::tools::handlers::CrawlHandler;
use manus_core::tools::handlers::PythonReplHandler;
use manus_core::tools::handlers::TavilySearch;
use manus_protocol::NodeId;
use manus_protocol::TeamMember;

use crate::agents::ToolAgent;
use crate::agents::WorkerAgents;

/// Shared, read-only collaborators of the workflow. One context serves any
/// number of concurrent runs.
pub struct WorkflowContext {
    pub providers: Arc<ProviderRegistry>,
    pub prompts: Arc<PromptLibrary>,
    pub search: Arc<dyn SearchProvider>,
    pub agents: WorkerAgents,
    pub agent_llm_map: AgentLlmMap,
    /// Snapshotted into every new run.
    pub team_members: Vec<TeamMember>,
    pub max_steps: usize,
}

impl WorkflowContext {
    pub fn new(
        providers: Arc<ProviderRegistry>,
        search: Arc<dyn SearchProvider>,
        agents: WorkerAgents,
    ) -> Self {
        Self {
            providers,
            prompts: Arc::new(PromptLibrary::builtin()),
            search,
            agents,
            agent_llm_map: AgentLlmMap::default(),
            team_members: TeamMember::all(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Wires the real providers and tools described by `config`.
    pub fn from_config(config: Arc<Config>) -> Result<Self> {
        let providers = Arc::new(ProviderRegistry::from_config(Arc::clone(&config)));
        let prompts = Arc::new(match &config.prompts_dir {
            Some(dir) => PromptLibrary::load(dir)?,
            None => PromptLibrary::builtin(),
        });

        let search = Arc::new(TavilySearch::new(config.search.clone()));

        let tool_agent = |node: NodeId, tools: ToolRegistry| {
            Arc::new(ToolAgent::new(
                node,
                config.agent_llm_map.tier_for(node),
                Arc::clone(&providers),
                Arc::clone(&prompts),
                tools,
                config.agent_max_iterations,
            ))
        };
        let agents = WorkerAgents {
            researcher: tool_agent(
                NodeId::Researcher,
                ToolRegistry::new()
                    .with(search.clone())
                    .with(Arc::new(CrawlHandler::new(config.crawl.clone()))),
            ),
            coder: tool_agent(
                NodeId::Coder,
                ToolRegistry::new()
                    .with(Arc::new(PythonReplHandler::new()))
                    .with(Arc::new(BashHandler)),
            ),
            browser: tool_agent(
                NodeId::Browser,
                ToolRegistry::new().with(Arc::new(BrowserHandler::new(config.browser.clone()))),
            ),
        };

        Ok(Self {
            providers,
            prompts,
            search,
            agents,
            agent_llm_map: config.agent_llm_map.clone(),
            team_members: config.team_members.clone(),
            max_steps: config.max_steps,
        })
    }

    pub fn with_team_members(mut self, team_members: Vec<TeamMember>) -> Self {
        self.team_members = team_members;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_prompts(mut self, prompts: PromptLibrary) -> Self {
        self.prompts = Arc::new(prompts);
        self
    }

    pub fn with_agent_llm_map(mut self, agent_llm_map: AgentLlmMap) -> Self {
        self.agent_llm_map = agent_llm_map;
        self
    }

    /// The model a node talks to according to the tier map.
    pub async fn model_for(&self, node: NodeId) -> Result<Arc<dyn ChatModel>> {
        self.model(self.agent_llm_map.tier_for(node)).await
    }

    pub async fn model(&self, tier: LlmTier) -> Result<Arc<dyn ChatModel>> {
        self.providers.get(tier).await
    }
}
