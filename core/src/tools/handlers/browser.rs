use async_trait::async_trait;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use super::check_status;
use crate::config::BrowserConfig;
use crate::error::ManusErr;
use crate::error::Result;
use crate::tools::ToolHandler;
use crate::tools::ToolSpec;
use crate::tools::required_str;

pub const BROWSER_TOOL_NAME: &str = "browser";

/// Forwards natural-language instructions to a browser-automation service.
pub struct BrowserHandler {
    client: reqwest::Client,
    config: BrowserConfig,
}

#[derive(Debug, Serialize)]
struct BrowserTask<'a> {
    instruction: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    chrome_instance_path: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct BrowserResult {
    #[serde(default)]
    final_result: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

impl BrowserHandler {
    pub fn new(config: BrowserConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: BrowserConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ToolHandler for BrowserHandler {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: BROWSER_TOOL_NAME.to_string(),
            description: "Use this tool to interact with web browsers. Input should be a natural \
                language description of what you want to do with the browser, such as 'Go to \
                google.com and search for browser-use', or 'Navigate to Reddit and find the top \
                post about AI'."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "instruction": {
                        "type": "string",
                        "description": "The instruction to use browser",
                    },
                },
                "required": ["instruction"],
            }),
        }
    }

    async fn handle(&self, arguments: Value) -> Result<String> {
        let instruction = required_str(BROWSER_TOOL_NAME, &arguments, "instruction")?;
        let endpoint = self.config.endpoint.as_deref().ok_or_else(|| ManusErr::Tool {
            tool: BROWSER_TOOL_NAME.to_string(),
            message: "no browser automation endpoint configured (set BROWSER_ENDPOINT)"
                .to_string(),
        })?;

        tracing::info!(instruction, "running browser task");
        let response = self
            .client
            .post(endpoint)
            .json(&BrowserTask {
                instruction,
                chrome_instance_path: self.config.chrome_instance_path.as_deref(),
            })
            .send()
            .await?;
        let result: BrowserResult = check_status(response).await?.json().await?;

        match (result.final_result, result.error) {
            (_, Some(error)) => Ok(format!("Error executing browser task: {error}")),
            (Some(text), None) => Ok(text),
            (None, None) => Ok(String::new()),
        }
    }
}
