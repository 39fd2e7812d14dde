//! Language-model capability providers.

mod openai;
mod registry;

pub use openai::OpenAiChatModel;
pub use registry::ModelFactory;
pub use registry::OpenAiModelFactory;
pub use registry::ProviderRegistry;

use async_trait::async_trait;
use futures::stream::BoxStream;
use manus_protocol::Message;
use manus_protocol::models::ToolCall;
use serde_json::Value;

use crate::error::Result;
use crate::tools::ToolSpec;

/// Lazily produced text chunks of a streamed completion.
pub type ChunkStream = BoxStream<'static, Result<String>>;

/// JSON schema the model output must satisfy in structured mode.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSchema {
    pub name: String,
    pub schema: Value,
}

/// Final assistant turn of a tool-enabled call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssistantTurn {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
}

#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn invoke(&self, messages: &[Message]) -> Result<String>;

    /// Returns a value conforming to `schema`, or fails with
    /// [`crate::ManusErr::SchemaViolation`].
    async fn invoke_structured(&self, messages: &[Message], schema: &OutputSchema)
    -> Result<Value>;

    async fn stream(&self, messages: &[Message]) -> Result<ChunkStream>;

    /// Tool-enabled completion. Models without tool support answer in plain
    /// text, which the agent loop treats as the final answer.
    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        _tools: &[ToolSpec],
    ) -> Result<AssistantTurn> {
        let content = self.invoke(messages).await?;
        Ok(AssistantTurn {
            content,
            tool_calls: Vec::new(),
        })
    }
}
