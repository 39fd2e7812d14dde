//! Tools exposed to the worker agents.

pub mod handlers;
pub mod truncation;

use std::sync::Arc;

use async_trait::async_trait;
use manus_protocol::models::ToolCall;
use serde::Serialize;
use serde_json::Value;

use crate::error::ManusErr;
use crate::error::Result;

/// Function description advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn spec(&self) -> ToolSpec;

    /// Runs the tool. The agent loop reports an `Err` back to the model as
    /// text, so a failing tool never aborts the agent.
    async fn handle(&self, arguments: Value) -> Result<String>;
}

/// Web search used by the planner before it drafts a plan.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Raw provider answer; usually a list of `{title, content, ...}`
    /// objects but callers must accept any JSON value.
    async fn search(&self, query: &str) -> Result<Value>;
}

/// Fixed set of tools bound to one agent.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    handlers: Vec<Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, handler: Arc<dyn ToolHandler>) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn specs(&self) -> Vec<ToolSpec> {
        self.handlers.iter().map(|h| h.spec()).collect()
    }

    fn find(&self, name: &str) -> Option<&Arc<dyn ToolHandler>> {
        self.handlers.iter().find(|h| h.spec().name == name)
    }

    /// Executes one model-requested call.
    pub async fn dispatch(&self, call: &ToolCall) -> Result<String> {
        let handler = self
            .find(&call.name)
            .ok_or_else(|| ManusErr::UnknownTool(call.name.clone()))?;

        let arguments: Value = if call.arguments.trim().is_empty() {
            Value::Object(Default::default())
        } else {
            serde_json::from_str(&call.arguments).map_err(|e| ManusErr::Tool {
                tool: call.name.clone(),
                message: format!("invalid arguments: {e}"),
            })?
        };

        tracing::debug!(tool = %call.name, %arguments, "tool called");
        let output = handler.handle(arguments).await;
        match &output {
            Ok(text) => tracing::debug!(tool = %call.name, output = %text, "tool returned"),
            Err(err) => tracing::error!(tool = %call.name, error = %err, "tool failed"),
        }
        output
    }
}

/// Reads a required string argument.
pub(crate) fn required_str<'a>(tool: &str, arguments: &'a Value, key: &str) -> Result<&'a str> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| ManusErr::Tool {
            tool: tool.to_string(),
            message: format!("missing string argument `{key}`"),
        })
}
