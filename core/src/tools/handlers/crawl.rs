use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use super::check_status;
use crate::config::CrawlConfig;
use crate::error::Result;
use crate::tools::ToolHandler;
use crate::tools::ToolSpec;
use crate::tools::required_str;

pub const CRAWL_TOOL_NAME: &str = "crawl";

/// Fetches a page through the Jina reader, which answers with the
/// page's readable content as markdown.
pub struct CrawlHandler {
    client: reqwest::Client,
    config: CrawlConfig,
}

impl CrawlHandler {
    pub fn new(config: CrawlConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: CrawlConfig) -> Self {
        Self { client, config }
    }

    pub async fn crawl(&self, url: &str) -> Result<String> {
        let mut request = self
            .client
            .post(format!("{}/", self.config.base_url.trim_end_matches('/')))
            .header("X-Return-Format", "markdown")
            .json(&json!({ "url": url }));
        match &self.config.api_key {
            Some(api_key) => request = request.bearer_auth(api_key),
            None => tracing::warn!("JINA_API_KEY is not set, crawling with the anonymous rate limit"),
        }

        let response = check_status(request.send().await?).await?;
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ToolHandler for CrawlHandler {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: CRAWL_TOOL_NAME.to_string(),
            description: "Use this to crawl a url and get a readable content in markdown format."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "url": { "type": "string", "description": "The url to crawl." },
                },
                "required": ["url"],
            }),
        }
    }

    async fn handle(&self, arguments: Value) -> Result<String> {
        let url = required_str(CRAWL_TOOL_NAME, &arguments, "url")?;
        tracing::info!(url, "crawling");
        self.crawl(url).await
    }
}
