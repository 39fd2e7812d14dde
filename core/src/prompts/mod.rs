//! Per-node system prompt templates.
//!
//! Templates are Markdown with `<<NAME>>` placeholders. The built-in set is
//! compiled in; a prompts directory may override any of them with a
//! `<node>.md` file.

use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;

use chrono::Local;
use manus_protocol::Message;
use manus_protocol::NodeId;
use manus_protocol::TeamMember;
use regex_lite::Captures;
use regex_lite::Regex;
use strum::IntoEnumIterator;

use crate::error::ManusErr;
use crate::error::Result;

const CURRENT_TIME_FORMAT: &str = "%a %b %d %Y %H:%M:%S %z";

#[allow(clippy::expect_used)]
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<<([^<>]+)>>").expect("placeholder pattern is valid"));

fn builtin_template(node: NodeId) -> &'static str {
    match node {
        NodeId::Coordinator => include_str!("coordinator.md"),
        NodeId::Planner => include_str!("planner.md"),
        NodeId::Supervisor => include_str!("supervisor.md"),
        NodeId::Researcher => include_str!("researcher.md"),
        NodeId::Coder => include_str!("coder.md"),
        NodeId::Browser => include_str!("browser.md"),
        NodeId::Reporter => include_str!("reporter.md"),
    }
}

/// Values substituted into a template.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptVars {
    pub current_time: String,
    pub team_members: Vec<TeamMember>,
    pub next: Option<String>,
    pub full_plan: String,
    pub deep_thinking_mode: bool,
    pub search_before_planning: bool,
}

impl PromptVars {
    /// Vars stamped with the local time at the moment of the call.
    pub fn new(team_members: Vec<TeamMember>) -> Self {
        Self {
            current_time: Local::now().format(CURRENT_TIME_FORMAT).to_string(),
            team_members,
            next: None,
            full_plan: String::new(),
            deep_thinking_mode: false,
            search_before_planning: false,
        }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match name {
            "CURRENT_TIME" => Some(self.current_time.clone()),
            "TEAM_MEMBERS" => Some(
                self.team_members
                    .iter()
                    .map(TeamMember::as_ref)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            "next" => self.next.clone(),
            "full_plan" => Some(self.full_plan.clone()),
            "deep_thinking_mode" => Some(self.deep_thinking_mode.to_string()),
            "search_before_planning" => Some(self.search_before_planning.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PromptLibrary {
    overrides: HashMap<NodeId, String>,
}

impl PromptLibrary {
    pub fn builtin() -> Self {
        Self::default()
    }

    /// Built-in templates, overridden by any `<node>.md` found in `dir`.
    pub fn load(dir: &Path) -> Result<Self> {
        let mut overrides = HashMap::new();
        for node in NodeId::iter() {
            let path = dir.join(format!("{node}.md"));
            if !path.exists() {
                continue;
            }
            let template = std::fs::read_to_string(&path).map_err(|e| {
                ManusErr::Config(format!("failed to read prompt {}: {e}", path.display()))
            })?;
            tracing::debug!(%node, path = %path.display(), "using prompt override");
            overrides.insert(node, template);
        }
        Ok(Self { overrides })
    }

    pub fn template(&self, node: NodeId) -> &str {
        self.overrides
            .get(&node)
            .map_or_else(|| builtin_template(node), String::as_str)
    }

    /// Substitutes every `<<NAME>>`; unknown names render as empty text.
    pub fn render(&self, node: NodeId, vars: &PromptVars) -> String {
        PLACEHOLDER
            .replace_all(self.template(node), |caps: &Captures<'_>| {
                vars.lookup(&caps[1]).unwrap_or_default()
            })
            .into_owned()
    }

    /// The rendered system prompt followed by the transcript.
    pub fn apply(&self, node: NodeId, vars: &PromptVars, transcript: &[Message]) -> Vec<Message> {
        let mut messages = Vec::with_capacity(transcript.len() + 1);
        messages.push(Message::system(self.render(node, vars)));
        messages.extend_from_slice(transcript);
        messages
    }
}
