//! Tool-using agent loop: ask the model, run the tools it asks for, feed the
//! results back, repeat until it answers in plain text.

use std::sync::Arc;

use manus_protocol::Message;

use crate::error::ManusErr;
use crate::error::Result;
use crate::llm::ChatModel;
use crate::tools::ToolRegistry;
use crate::tools::truncation::OutputTruncator;

pub struct ReactAgent {
    name: String,
    model: Arc<dyn ChatModel>,
    tools: ToolRegistry,
    max_iterations: usize,
}

impl ReactAgent {
    pub fn new(
        name: impl Into<String>,
        model: Arc<dyn ChatModel>,
        tools: ToolRegistry,
        max_iterations: usize,
    ) -> Self {
        Self {
            name: name.into(),
            model,
            tools,
            max_iterations,
        }
    }

    /// Runs the loop over `messages` (system prompt first) and returns the
    /// model's final answer.
    pub async fn run(&self, mut messages: Vec<Message>) -> Result<String> {
        let specs = self.tools.specs();
        let mut truncator = OutputTruncator::default();

        for iteration in 1..=self.max_iterations {
            let turn = self.model.invoke_with_tools(&messages, &specs).await?;
            if turn.tool_calls.is_empty() {
                tracing::debug!(agent = %self.name, iteration, "agent produced final answer");
                return Ok(turn.content);
            }

            tracing::info!(
                agent = %self.name,
                iteration,
                calls = turn.tool_calls.len(),
                "agent requested tools"
            );
            messages.push(Message::assistant(turn.content).with_tool_calls(turn.tool_calls.clone()));

            for call in &turn.tool_calls {
                let output = match self.tools.dispatch(call).await {
                    Ok(output) => output,
                    Err(err) => format!("Error: {err}"),
                };
                let (output, truncated) = truncator.truncate_if_needed(&output);
                if truncated {
                    tracing::warn!(agent = %self.name, tool = %call.name, "tool output truncated");
                }
                messages.push(Message::tool_result(&call.id, output));
            }
        }

        Err(ManusErr::MaxIterations {
            agent: self.name.clone(),
            limit: self.max_iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::llm::AssistantTurn;
    use crate::llm::ChunkStream;
    use crate::llm::OutputSchema;
    use crate::tools::ToolHandler;
    use crate::tools::ToolSpec;
    use async_trait::async_trait;
    use manus_protocol::Role;
    use manus_protocol::models::ToolCall;
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use serde_json::json;
    use std::sync::Mutex;

    /// Replays scripted turns and records what it was sent.
    struct Scripted {
        turns: Mutex<Vec<AssistantTurn>>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl Scripted {
        fn new(mut turns: Vec<AssistantTurn>) -> Self {
            turns.reverse();
            Self {
                turns: Mutex::new(turns),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ChatModel for Scripted {
        async fn invoke(&self, _messages: &[Message]) -> Result<String> {
            unreachable!("agent only uses tool calls")
        }

        async fn invoke_structured(
            &self,
            _messages: &[Message],
            _schema: &OutputSchema,
        ) -> Result<Value> {
            unreachable!("agent only uses tool calls")
        }

        async fn stream(&self, _messages: &[Message]) -> Result<ChunkStream> {
            unreachable!("agent only uses tool calls")
        }

        async fn invoke_with_tools(
            &self,
            messages: &[Message],
            _tools: &[ToolSpec],
        ) -> Result<AssistantTurn> {
            self.seen.lock().unwrap().push(messages.to_vec());
            Ok(self.turns.lock().unwrap().pop().unwrap_or_default())
        }
    }

    struct Failing;

    #[async_trait]
    impl ToolHandler for Failing {
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: "fail".to_string(),
                description: "Always fails.".to_string(),
                parameters: json!({"type": "object", "properties": {}}),
            }
        }

        async fn handle(&self, _arguments: Value) -> Result<String> {
            Err(ManusErr::Tool {
                tool: "fail".to_string(),
                message: "boom".to_string(),
            })
        }
    }

    fn tool_turn(id: &str, name: &str) -> AssistantTurn {
        AssistantTurn {
            content: String::new(),
            tool_calls: vec![ToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: "{}".to_string(),
            }],
        }
    }

    fn answer(text: &str) -> AssistantTurn {
        AssistantTurn {
            content: text.to_string(),
            tool_calls: Vec::new(),
        }
    }

    #[tokio::test]
    async fn tool_errors_are_fed_back_as_text() {
        let model = Arc::new(Scripted::new(vec![tool_turn("call_1", "fail"), answer("done")]));
        let agent = ReactAgent::new(
            "coder",
            model.clone(),
            ToolRegistry::new().with(Arc::new(Failing)),
            5,
        );

        let result = agent.run(vec![Message::user("go")]).await.unwrap();
        assert_eq!(result, "done");

        let seen = model.seen.lock().unwrap();
        let second = &seen[1];
        assert_eq!(second.len(), 3);
        assert_eq!(second[1].role, Role::Assistant);
        assert_eq!(second[2].role, Role::Tool);
        assert_eq!(second[2].tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(second[2].text(), "Error: tool `fail` failed: boom");
    }

    #[tokio::test]
    async fn unknown_tools_do_not_abort_the_agent() {
        let model = Arc::new(Scripted::new(vec![tool_turn("c", "teleport"), answer("ok")]));
        let agent = ReactAgent::new("researcher", model.clone(), ToolRegistry::new(), 5);

        assert_eq!(agent.run(vec![Message::user("go")]).await.unwrap(), "ok");
        let seen = model.seen.lock().unwrap();
        assert_eq!(
            seen[1][2].text(),
            "Error: model requested unknown tool `teleport`"
        );
    }

    #[tokio::test]
    async fn iteration_limit_is_enforced() {
        let model = Arc::new(Scripted::new(vec![
            tool_turn("a", "fail"),
            tool_turn("b", "fail"),
            tool_turn("c", "fail"),
        ]));
        let agent = ReactAgent::new(
            "browser",
            model,
            ToolRegistry::new().with(Arc::new(Failing)),
            2,
        );

        let err = agent.run(vec![Message::user("go")]).await.unwrap_err();
        assert!(matches!(
            err,
            ManusErr::MaxIterations { ref agent, limit: 2 } if agent == "browser"
        ));
    }
}
