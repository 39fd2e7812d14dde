use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use super::check_status;
use crate::config::SearchConfig;
use crate::error::ManusErr;
use crate::error::Result;
use crate::tools::SearchProvider;
use crate::tools::ToolHandler;
use crate::tools::ToolSpec;
use crate::tools::required_str;

pub const TAVILY_TOOL_NAME: &str = "tavily_search";

/// Tavily web search. Serves both as the researcher's tool and as the
/// planner's pre-search provider.
pub struct TavilySearch {
    client: reqwest::Client,
    config: SearchConfig,
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize, Serialize)]
struct SearchHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

impl TavilySearch {
    pub fn new(config: SearchConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: SearchConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl SearchProvider for TavilySearch {
    async fn search(&self, query: &str) -> Result<Value> {
        let api_key = self.config.api_key.as_deref().ok_or_else(|| {
            ManusErr::Config("TAVILY_API_KEY is required for web search".to_string())
        })?;

        tracing::info!(query, max_results = self.config.max_results, "searching the web");
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(url)
            .json(&SearchRequest {
                api_key,
                query,
                max_results: self.config.max_results,
            })
            .send()
            .await?;
        let answer: SearchResponse = check_status(response).await?.json().await?;
        Ok(serde_json::to_value(answer.results)?)
    }
}

#[async_trait]
impl ToolHandler for TavilySearch {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: TAVILY_TOOL_NAME.to_string(),
            description: "A search engine optimized for comprehensive, accurate, and trusted \
                results. Useful for when you need to answer questions about current events. \
                Input should be a search query."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": { "type": "string", "description": "search query to look up" },
                },
                "required": ["query"],
            }),
        }
    }

    async fn handle(&self, arguments: Value) -> Result<String> {
        let query = required_str(TAVILY_TOOL_NAME, &arguments, "query")?;
        let results = self.search(query).await?;
        Ok(results.to_string())
    }
}
