//! Deterministic collaborators for driving whole runs.

#![allow(clippy::unwrap_used, dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use futures::StreamExt;
use manus_core::ChatModel;
use manus_core::LlmTier;
use manus_core::ManusErr;
use manus_core::ProviderRegistry;
use manus_core::Result;
use manus_core::SearchProvider;
use manus_core::llm::ChunkStream;
use manus_core::llm::OutputSchema;
use manus_orchestrator::Agent;
use manus_orchestrator::Orchestrator;
use manus_orchestrator::RunState;
use manus_orchestrator::WorkerAgents;
use manus_orchestrator::WorkflowContext;
use manus_protocol::Message;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallKind {
    Invoke,
    Structured,
    Stream,
}

#[derive(Debug, Clone)]
pub struct Call {
    pub kind: CallKind,
    pub messages: Vec<Message>,
}

/// Answers each call kind from its own queue, in order.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    routes: Mutex<VecDeque<Value>>,
    plans: Mutex<VecDeque<Vec<String>>>,
    calls: Mutex<Vec<Call>>,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next plain `invoke` answer.
    pub fn reply(self, text: &str) -> Self {
        self.replies.lock().unwrap().push_back(text.to_string());
        self
    }

    /// Next structured answer.
    pub fn route(self, value: Value) -> Self {
        self.routes.lock().unwrap().push_back(value);
        self
    }

    /// Next streamed answer, as chunks.
    pub fn plan(self, chunks: &[&str]) -> Self {
        self.plans
            .lock()
            .unwrap()
            .push_back(chunks.iter().map(|c| c.to_string()).collect());
        self
    }

    pub fn count(&self, kind: CallKind) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| call.kind == kind)
            .count()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: CallKind, messages: &[Message]) {
        self.calls.lock().unwrap().push(Call {
            kind,
            messages: messages.to_vec(),
        });
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn invoke(&self, messages: &[Message]) -> Result<String> {
        self.record(CallKind::Invoke, messages);
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ManusErr::Stream("no scripted reply left".to_string()))
    }

    async fn invoke_structured(
        &self,
        messages: &[Message],
        _schema: &OutputSchema,
    ) -> Result<Value> {
        self.record(CallKind::Structured, messages);
        self.routes
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ManusErr::SchemaViolation("no scripted route left".to_string()))
    }

    async fn stream(&self, messages: &[Message]) -> Result<ChunkStream> {
        self.record(CallKind::Stream, messages);
        let chunks = self
            .plans
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ManusErr::Stream("no scripted plan left".to_string()))?;
        Ok(futures::stream::iter(chunks.into_iter().map(Ok)).boxed())
    }
}

/// Worker agent that always gives the same answer.
pub struct StubAgent {
    reply: String,
    calls: AtomicUsize,
}

impl StubAgent {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for StubAgent {
    async fn invoke(&self, _state: &RunState) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

pub struct StubSearch {
    result: Value,
    queries: Mutex<Vec<String>>,
}

impl StubSearch {
    pub fn new(result: Value) -> Self {
        Self {
            result,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for StubSearch {
    async fn search(&self, query: &str) -> Result<Value> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.result.clone())
    }
}

/// Stub collaborators plus the context built from them.
pub struct Harness {
    pub basic: Arc<ScriptedModel>,
    pub reasoning: Arc<ScriptedModel>,
    pub researcher: Arc<StubAgent>,
    pub coder: Arc<StubAgent>,
    pub browser: Arc<StubAgent>,
    pub search: Arc<StubSearch>,
}

impl Harness {
    pub fn new(basic: ScriptedModel) -> Self {
        Self {
            basic: Arc::new(basic),
            reasoning: Arc::new(ScriptedModel::new()),
            researcher: Arc::new(StubAgent::new("found X")),
            coder: Arc::new(StubAgent::new("computed 42")),
            browser: Arc::new(StubAgent::new("clicked")),
            search: Arc::new(StubSearch::new(Value::Array(Vec::new()))),
        }
    }

    pub fn with_reasoning(mut self, reasoning: ScriptedModel) -> Self {
        self.reasoning = Arc::new(reasoning);
        self
    }

    pub fn with_search(mut self, result: Value) -> Self {
        self.search = Arc::new(StubSearch::new(result));
        self
    }

    pub fn with_agents(mut self, researcher: &str, coder: &str, browser: &str) -> Self {
        self.researcher = Arc::new(StubAgent::new(researcher));
        self.coder = Arc::new(StubAgent::new(coder));
        self.browser = Arc::new(StubAgent::new(browser));
        self
    }

    pub fn context(&self) -> WorkflowContext {
        let basic: Arc<dyn ChatModel> = self.basic.clone();
        let reasoning: Arc<dyn ChatModel> = self.reasoning.clone();
        let providers = ProviderRegistry::with_models([
            (LlmTier::Basic, basic),
            (LlmTier::Reasoning, reasoning),
        ]);
        WorkflowContext::new(
            Arc::new(providers),
            self.search.clone(),
            WorkerAgents {
                researcher: self.researcher.clone(),
                coder: self.coder.clone(),
                browser: self.browser.clone(),
            },
        )
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.context())
    }
}

/// The attribution envelope a worker or reporter answer is wrapped in.
pub fn envelope(role: &str, text: &str) -> Message {
    Message::user(format!(
        "Response from {role}:\n\n<response>\n{text}\n</response>\n\n*Please execute the next step.*"
    ))
    .with_name(role)
}
