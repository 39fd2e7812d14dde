//! Layered configuration: built-in defaults, then `config.toml`, then the
//! process environment (after loading `.env`).

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;

use manus_protocol::NodeId;
use manus_protocol::TeamMember;
use serde::Deserialize;
use serde::Serialize;
use strum_macros::Display;

use crate::config_profile::ModelConfig;
use crate::config_profile::ModelProfile;
use crate::config_profile::non_empty;
use crate::error::ManusErr;
use crate::error::Result;

pub const DEFAULT_BASIC_MODEL: &str = "gpt-4o";
pub const DEFAULT_REASONING_MODEL: &str = "o1-mini";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";
pub const DEFAULT_SEARCH_MAX_RESULTS: usize = 5;
pub const DEFAULT_MAX_STEPS: usize = 25;
pub const DEFAULT_AGENT_MAX_ITERATIONS: usize = 10;

const TAVILY_BASE_URL: &str = "https://api.tavily.com";
const JINA_READER_BASE_URL: &str = "https://r.jina.ai";

/// Capability tier of a language model provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LlmTier {
    Basic,
    Reasoning,
    Vision,
}

/// Raw contents of `config.toml`. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigToml {
    #[serde(default)]
    pub models: ModelsToml,
    #[serde(default)]
    pub search: SearchToml,
    #[serde(default)]
    pub crawl: CrawlToml,
    #[serde(default)]
    pub browser: BrowserToml,
    pub team_members: Option<Vec<TeamMember>>,
    /// Node name to provider tier, e.g. `reporter = "reasoning"`.
    #[serde(default)]
    pub agent_llm_map: BTreeMap<String, LlmTier>,
    pub max_steps: Option<usize>,
    pub agent_max_iterations: Option<usize>,
    pub prompts_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelsToml {
    #[serde(default)]
    pub basic: ModelProfile,
    #[serde(default)]
    pub reasoning: ModelProfile,
    #[serde(default)]
    pub vision: ModelProfile,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchToml {
    pub api_key: Option<String>,
    pub max_results: Option<usize>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CrawlToml {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BrowserToml {
    pub endpoint: Option<String>,
    pub chrome_instance_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub api_key: Option<String>,
    pub max_results: usize,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrawlConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrowserConfig {
    /// Browser-automation service that executes natural-language instructions.
    pub endpoint: Option<String>,
    pub chrome_instance_path: Option<String>,
}

/// Which provider tier each node talks to.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentLlmMap(HashMap<NodeId, LlmTier>);

impl AgentLlmMap {
    pub fn tier_for(&self, node: NodeId) -> LlmTier {
        self.0.get(&node).copied().unwrap_or(LlmTier::Basic)
    }

    pub fn set(&mut self, node: NodeId, tier: LlmTier) {
        self.0.insert(node, tier);
    }
}

impl Default for AgentLlmMap {
    fn default() -> Self {
        Self(HashMap::from([
            (NodeId::Coordinator, LlmTier::Basic),
            (NodeId::Planner, LlmTier::Reasoning),
            (NodeId::Supervisor, LlmTier::Basic),
            (NodeId::Researcher, LlmTier::Basic),
            (NodeId::Coder, LlmTier::Basic),
            (NodeId::Browser, LlmTier::Vision),
            (NodeId::Reporter, LlmTier::Basic),
        ]))
    }
}

/// Resolved application configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub manus_home: PathBuf,
    pub basic: ModelConfig,
    pub reasoning: ModelConfig,
    pub vision: ModelConfig,
    pub search: SearchConfig,
    pub crawl: CrawlConfig,
    pub browser: BrowserConfig,
    pub team_members: Vec<TeamMember>,
    pub agent_llm_map: AgentLlmMap,
    /// Upper bound on node executions per run.
    pub max_steps: usize,
    /// Upper bound on model turns inside one tool-agent invocation.
    pub agent_max_iterations: usize,
    pub prompts_dir: Option<PathBuf>,
}

impl Config {
    /// Loads `.env`, then `config_path` (or `$MANUS_HOME/config.toml` when not
    /// given), then applies environment overrides.
    ///
    /// A missing default config file is not an error; a missing explicit one is.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "loaded .env");
        }

        let manus_home = find_manus_home()?;
        let cfg = match config_path {
            Some(path) => load_config_toml(path)?,
            None => {
                let default_path = manus_home.join("config.toml");
                if default_path.exists() {
                    load_config_toml(&default_path)?
                } else {
                    ConfigToml::default()
                }
            }
        };

        Self::from_sources(cfg, |key| std::env::var(key).ok(), manus_home)
    }

    /// Builds a config from parsed TOML and an environment lookup function.
    pub fn from_sources<F>(cfg: ConfigToml, env: F, manus_home: PathBuf) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_profile = |prefix: &str| ModelProfile {
            model: env(&format!("{prefix}_MODEL")),
            base_url: env(&format!("{prefix}_BASE_URL")),
            api_key: env(&format!("{prefix}_API_KEY")),
            temperature: None,
        };

        let basic = cfg
            .models
            .basic
            .resolve(env_profile("BASIC"), DEFAULT_BASIC_MODEL);
        let reasoning = cfg
            .models
            .reasoning
            .resolve(env_profile("REASONING"), DEFAULT_REASONING_MODEL);
        let vision = cfg
            .models
            .vision
            .resolve(env_profile("VL"), DEFAULT_VISION_MODEL);

        let max_results = match non_empty(env("TAVILY_MAX_RESULTS")) {
            Some(raw) => raw.trim().parse::<usize>().map_err(|e| {
                ManusErr::Config(format!("TAVILY_MAX_RESULTS must be a number: {e}"))
            })?,
            None => cfg.search.max_results.unwrap_or(DEFAULT_SEARCH_MAX_RESULTS),
        };
        let search = SearchConfig {
            api_key: non_empty(env("TAVILY_API_KEY")).or(non_empty(cfg.search.api_key)),
            max_results,
            base_url: non_empty(cfg.search.base_url)
                .unwrap_or_else(|| TAVILY_BASE_URL.to_string()),
        };

        let crawl = CrawlConfig {
            api_key: non_empty(env("JINA_API_KEY")).or(non_empty(cfg.crawl.api_key)),
            base_url: non_empty(cfg.crawl.base_url)
                .unwrap_or_else(|| JINA_READER_BASE_URL.to_string()),
        };

        let browser = BrowserConfig {
            endpoint: non_empty(env("BROWSER_ENDPOINT")).or(non_empty(cfg.browser.endpoint)),
            chrome_instance_path: non_empty(env("CHROME_INSTANCE_PATH"))
                .or(non_empty(cfg.browser.chrome_instance_path)),
        };

        let team_members = cfg.team_members.unwrap_or_else(TeamMember::all);
        if team_members.is_empty() {
            return Err(ManusErr::Config(
                "team_members must name at least one member".to_string(),
            ));
        }

        let mut agent_llm_map = AgentLlmMap::default();
        for (node, tier) in cfg.agent_llm_map {
            let node = node
                .parse::<NodeId>()
                .map_err(|_| ManusErr::Config(format!("unknown node `{node}` in agent_llm_map")))?;
            agent_llm_map.set(node, tier);
        }

        Ok(Self {
            manus_home,
            basic,
            reasoning,
            vision,
            search,
            crawl,
            browser,
            team_members,
            agent_llm_map,
            max_steps: positive("max_steps", cfg.max_steps, DEFAULT_MAX_STEPS)?,
            agent_max_iterations: positive(
                "agent_max_iterations",
                cfg.agent_max_iterations,
                DEFAULT_AGENT_MAX_ITERATIONS,
            )?,
            prompts_dir: cfg.prompts_dir,
        })
    }

    pub fn model(&self, tier: LlmTier) -> &ModelConfig {
        match tier {
            LlmTier::Basic => &self.basic,
            LlmTier::Reasoning => &self.reasoning,
            LlmTier::Vision => &self.vision,
        }
    }
}

fn positive(key: &str, value: Option<usize>, default: usize) -> Result<usize> {
    match value {
        Some(0) => Err(ManusErr::Config(format!("{key} must be at least 1"))),
        Some(value) => Ok(value),
        None => Ok(default),
    }
}

pub fn load_config_toml(path: &Path) -> Result<ConfigToml> {
    let contents = std::fs::read_to_string(path).map_err(|e| {
        ManusErr::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    toml::from_str(&contents)
        .map_err(|e| ManusErr::Config(format!("failed to parse {}: {e}", path.display())))
}

/// Returns `$MANUS_HOME` when set, otherwise `~/.manus`.
pub fn find_manus_home() -> Result<PathBuf> {
    if let Ok(val) = std::env::var("MANUS_HOME")
        && !val.is_empty()
    {
        return Ok(PathBuf::from(val));
    }

    let mut p = dirs::home_dir()
        .ok_or_else(|| ManusErr::Config("could not find home directory".to_string()))?;
    p.push(".manus");
    Ok(p)
}
