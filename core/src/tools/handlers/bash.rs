use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use tokio::process::Command;

use crate::error::Result;
use crate::tools::ToolHandler;
use crate::tools::ToolSpec;
use crate::tools::required_str;

pub const BASH_TOOL_NAME: &str = "bash";

pub struct BashHandler;

#[async_trait]
impl ToolHandler for BashHandler {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: BASH_TOOL_NAME.to_string(),
            description: "Use this to execute bash command and do necessary operations."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "cmd": { "type": "string", "description": "The bash command to be executed." },
                },
                "required": ["cmd"],
            }),
        }
    }

    async fn handle(&self, arguments: Value) -> Result<String> {
        let cmd = required_str(BASH_TOOL_NAME, &arguments, "cmd")?;
        tracing::info!(cmd, "executing bash command");

        let output = Command::new("bash")
            .arg("-c")
            .arg(cmd)
            .kill_on_drop(true)
            .output()
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if output.status.success() {
            return Ok(stdout.into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        let code = output
            .status
            .code()
            .map_or_else(|| "signal".to_string(), |c| c.to_string());
        let message =
            format!("Command failed with exit code {code}.\nStdout: {stdout}\nStderr: {stderr}");
        tracing::error!(cmd, %code, "bash command failed");
        Ok(message)
    }
}
