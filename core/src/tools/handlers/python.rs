use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;
use tokio::process::Command;

use crate::error::Result;
use crate::tools::ToolHandler;
use crate::tools::ToolSpec;
use crate::tools::required_str;

pub const PYTHON_TOOL_NAME: &str = "python_repl";

/// Runs Python source in a fresh interpreter process. Nothing persists
/// between calls.
pub struct PythonReplHandler {
    interpreter: String,
}

impl PythonReplHandler {
    pub fn new() -> Self {
        Self::with_interpreter("python3")
    }

    pub fn with_interpreter(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

impl Default for PythonReplHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolHandler for PythonReplHandler {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: PYTHON_TOOL_NAME.to_string(),
            description: "Use this to execute python code and do data analysis or calculation. \
                If you want to see the output of a value, you should print it out with \
                `print(...)`. This is visible to the user."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "code": {
                        "type": "string",
                        "description": "The python code to execute to do further analysis or calculation.",
                    },
                },
                "required": ["code"],
            }),
        }
    }

    async fn handle(&self, arguments: Value) -> Result<String> {
        let code = required_str(PYTHON_TOOL_NAME, &arguments, "code")?;
        tracing::info!(interpreter = %self.interpreter, "executing python code");

        let output = Command::new(&self.interpreter)
            .arg("-c")
            .arg(code)
            .kill_on_drop(true)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(status = %output.status, "python execution failed");
            return Ok(format!("Failed to execute. Error: {}", stderr.trim_end()));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        Ok(format!(
            "Successfully executed:\n```python\n{code}\n```\nStdout: {stdout}"
        ))
    }
}
