//! Client for OpenAI-compatible `/chat/completions` endpoints.

use std::future;

use async_trait::async_trait;
use eventsource_stream::Eventsource;
use futures::StreamExt;
use manus_protocol::ContentPart;
use manus_protocol::Message;
use manus_protocol::MessageContent;
use manus_protocol::models::ToolCall;
use reqwest::Response;
use serde::Deserialize;
use serde_json::Value;
use serde_json::json;

use super::AssistantTurn;
use super::ChatModel;
use super::ChunkStream;
use super::OutputSchema;
use crate::config_profile::ModelConfig;
use crate::error::ManusErr;
use crate::error::Result;
use crate::tools::ToolSpec;

pub struct OpenAiChatModel {
    client: reqwest::Client,
    config: ModelConfig,
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Debug, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Debug, Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiChatModel {
    pub fn new(config: ModelConfig) -> Self {
        Self::with_client(reqwest::Client::new(), config)
    }

    pub fn with_client(client: reqwest::Client, config: ModelConfig) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn request_body(&self, messages: &[Message], stream: bool) -> Value {
        json!({
            "model": self.config.model,
            "temperature": self.config.temperature,
            "stream": stream,
            "messages": messages.iter().map(wire_message).collect::<Vec<_>>(),
        })
    }

    async fn post(&self, body: &Value) -> Result<Response> {
        let mut request = self.client.post(self.endpoint()).json(body);
        if let Some(api_key) = &self.config.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(model = %self.config.model, %status, "chat completion failed");
            return Err(ManusErr::Provider { status, body });
        }
        Ok(response)
    }

    async fn complete(&self, body: &Value) -> Result<AssistantMessage> {
        let completion: ChatCompletion = self.post(body).await?.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| ManusErr::Stream("completion contained no choices".to_string()))
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn invoke(&self, messages: &[Message]) -> Result<String> {
        let body = self.request_body(messages, false);
        let message = self.complete(&body).await?;
        Ok(message.content.unwrap_or_default())
    }

    async fn invoke_structured(
        &self,
        messages: &[Message],
        schema: &OutputSchema,
    ) -> Result<Value> {
        let mut body = self.request_body(messages, false);
        body["response_format"] = json!({
            "type": "json_schema",
            "json_schema": {
                "name": schema.name,
                "schema": schema.schema,
                "strict": true,
            },
        });

        let message = self.complete(&body).await?;
        let content = message
            .content
            .ok_or_else(|| ManusErr::SchemaViolation("empty structured response".to_string()))?;
        serde_json::from_str(&content)
            .map_err(|e| ManusErr::SchemaViolation(format!("{e}: {content}")))
    }

    async fn stream(&self, messages: &[Message]) -> Result<ChunkStream> {
        let body = self.request_body(messages, true);
        let response = self.post(&body).await?;

        let chunks = response
            .bytes_stream()
            .eventsource()
            .take_while(|event| future::ready(!matches!(event, Ok(ev) if ev.data == "[DONE]")))
            .filter_map(|event| async move {
                let event = match event {
                    Ok(event) => event,
                    Err(e) => return Some(Err(ManusErr::Stream(e.to_string()))),
                };
                match serde_json::from_str::<ChatCompletionChunk>(&event.data) {
                    Ok(chunk) => chunk
                        .choices
                        .into_iter()
                        .next()
                        .and_then(|choice| choice.delta.content)
                        .filter(|content| !content.is_empty())
                        .map(Ok),
                    Err(e) => Some(Err(ManusErr::Stream(format!(
                        "malformed chunk `{}`: {e}",
                        event.data
                    )))),
                }
            });

        Ok(chunks.boxed())
    }

    async fn invoke_with_tools(
        &self,
        messages: &[Message],
        tools: &[ToolSpec],
    ) -> Result<AssistantTurn> {
        let mut body = self.request_body(messages, false);
        if !tools.is_empty() {
            body["tools"] = Value::Array(tools.iter().map(wire_tool).collect());
        }

        let message = self.complete(&body).await?;
        Ok(AssistantTurn {
            content: message.content.unwrap_or_default(),
            tool_calls: message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .map(|call| ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments: call.function.arguments,
                })
                .collect(),
        })
    }
}

fn wire_message(message: &Message) -> Value {
    let content = match &message.content {
        MessageContent::Text(text) => Value::String(text.clone()),
        MessageContent::Parts(parts) => Value::Array(
            parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => json!({"type": "text", "text": text}),
                    ContentPart::Image { image_url } => {
                        json!({"type": "image_url", "image_url": {"url": image_url}})
                    }
                })
                .collect(),
        ),
    };

    let mut wire = json!({
        "role": message.role,
        "content": content,
    });
    if let Some(name) = &message.name {
        wire["name"] = Value::String(name.clone());
    }
    if !message.tool_calls.is_empty() {
        wire["tool_calls"] = message
            .tool_calls
            .iter()
            .map(|call| {
                json!({
                    "id": call.id,
                    "type": "function",
                    "function": {"name": call.name, "arguments": call.arguments},
                })
            })
            .collect();
    }
    if let Some(tool_call_id) = &message.tool_call_id {
        wire["tool_call_id"] = Value::String(tool_call_id.clone());
    }
    wire
}

fn wire_tool(tool: &ToolSpec) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": tool.name,
            "description": tool.description,
            "parameters": tool.parameters,
        },
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use pretty_assertions::assert_eq;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;
    use wiremock::matchers::body_partial_json;
    use wiremock::matchers::header;
    use wiremock::matchers::method;
    use wiremock::matchers::path;

    fn model_for(server: &MockServer) -> OpenAiChatModel {
        OpenAiChatModel::new(ModelConfig {
            model: "gpt-test".to_string(),
            base_url: format!("{}/v1", server.uri()),
            api_key: Some("sk-test".to_string()),
            temperature: 0.0,
        })
    }

    fn completion(content: &str) -> Value {
        json!({"choices": [{"message": {"role": "assistant", "content": content}}]})
    }

    #[tokio::test]
    async fn invoke_returns_first_choice_content() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(json!({"model": "gpt-test", "stream": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("hello")))
            .expect(1)
            .mount(&server)
            .await;

        let text = model_for(&server)
            .invoke(&[Message::user("hi")])
            .await
            .unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn provider_errors_keep_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .mount(&server)
            .await;

        let err = model_for(&server)
            .invoke(&[Message::user("hi")])
            .await
            .unwrap_err();
        match err {
            ManusErr::Provider { status, body } => {
                assert_eq!(status.as_u16(), 429);
                assert_eq!(body, "slow down");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn structured_output_that_is_not_json_is_a_schema_violation() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"response_format": {"type": "json_schema"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion("researcher")))
            .mount(&server)
            .await;

        let schema = OutputSchema {
            name: "router".to_string(),
            schema: json!({"type": "object"}),
        };
        let err = model_for(&server)
            .invoke_structured(&[Message::user("route")], &schema)
            .await
            .unwrap_err();
        assert!(matches!(err, ManusErr::SchemaViolation(_)));
    }

    #[tokio::test]
    async fn stream_yields_delta_content_until_done() {
        let server = MockServer::start().await;
        let body = [
            r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#,
            r#"data: {"choices":[{"delta":{"content":"{\"steps\""}}]}"#,
            r#"data: {"choices":[{"delta":{"content":":[]}"}}]}"#,
            "data: [DONE]",
            "",
        ]
        .join("\n\n");
        Mock::given(method("POST"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(body),
            )
            .mount(&server)
            .await;

        let chunks: Vec<String> = model_for(&server)
            .stream(&[Message::user("plan")])
            .await
            .unwrap()
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;
        assert_eq!(chunks.concat(), "{\"steps\":[]}");
    }

    #[tokio::test]
    async fn tool_calls_are_decoded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call-1",
                        "type": "function",
                        "function": {"name": "bash", "arguments": "{\"cmd\":\"ls\"}"}
                    }]
                }}]
            })))
            .mount(&server)
            .await;

        let tool = ToolSpec {
            name: "bash".to_string(),
            description: "run a command".to_string(),
            parameters: json!({"type": "object"}),
        };
        let turn = model_for(&server)
            .invoke_with_tools(&[Message::user("list files")], &[tool])
            .await
            .unwrap();
        assert_eq!(turn.content, "");
        assert_eq!(
            turn.tool_calls,
            vec![ToolCall {
                id: "call-1".to_string(),
                name: "bash".to_string(),
                arguments: "{\"cmd\":\"ls\"}".to_string(),
            }]
        );
    }

    #[test]
    fn image_parts_use_openai_wire_shape() {
        let message = Message::user(MessageContent::Parts(vec![
            ContentPart::Text {
                text: "what is this".to_string(),
            },
            ContentPart::Image {
                image_url: "https://example.com/a.png".to_string(),
            },
        ]))
        .with_name("user");

        assert_eq!(
            wire_message(&message),
            json!({
                "role": "user",
                "name": "user",
                "content": [
                    {"type": "text", "text": "what is this"},
                    {"type": "image_url", "image_url": {"url": "https://example.com/a.png"}}
                ]
            })
        );
    }
}
