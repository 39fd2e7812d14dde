//! Per-run shared state and the step delta applied to it.

use manus_core::PromptVars;
use manus_protocol::Goto;
use manus_protocol::Message;
use manus_protocol::Role;
use manus_protocol::TeamMember;
use serde::Deserialize;
use serde::Serialize;

/// Flags fixed for the lifetime of one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub deep_thinking_mode: bool,
    #[serde(default)]
    pub search_before_planning: bool,
}

/// The transcript and routing state of one run.
///
/// Only [`RunState::apply`] mutates it: messages are appended, never edited,
/// and `full_plan` is never cleared once set.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunState {
    messages: Vec<Message>,
    team_members: Vec<TeamMember>,
    next: Option<Goto>,
    full_plan: Option<String>,
    deep_thinking_mode: bool,
    search_before_planning: bool,
}

impl RunState {
    pub fn new(messages: Vec<Message>, team_members: Vec<TeamMember>, config: &RunConfig) -> Self {
        Self {
            messages,
            team_members,
            next: None,
            full_plan: None,
            deep_thinking_mode: config.deep_thinking_mode,
            search_before_planning: config.search_before_planning,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn team_members(&self) -> &[TeamMember] {
        &self.team_members
    }

    /// The supervisor's most recent routing decision.
    pub fn next(&self) -> Option<Goto> {
        self.next
    }

    pub fn full_plan(&self) -> Option<&str> {
        self.full_plan.as_deref()
    }

    pub fn deep_thinking_mode(&self) -> bool {
        self.deep_thinking_mode
    }

    pub fn search_before_planning(&self) -> bool {
        self.search_before_planning
    }

    /// Text of the most recent user-role message, falling back to the last
    /// message of any role.
    pub fn latest_user_text(&self) -> Option<String> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .or_else(|| self.messages.last())
            .map(Message::text)
    }

    pub fn apply(&mut self, command: Command) {
        let Command {
            messages,
            full_plan,
            next,
            goto: _,
        } = command;
        self.messages.extend(messages);
        if let Some(next) = next {
            self.next = Some(next);
        }
        if let Some(plan) = full_plan {
            self.full_plan = Some(plan);
        }
    }

    pub fn prompt_vars(&self) -> PromptVars {
        PromptVars {
            next: self.next.map(|goto| goto.to_string()),
            full_plan: self.full_plan.clone().unwrap_or_default(),
            deep_thinking_mode: self.deep_thinking_mode,
            search_before_planning: self.search_before_planning,
            ..PromptVars::new(self.team_members.clone())
        }
    }
}

/// What a node asks the driver to do after its step.
#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub messages: Vec<Message>,
    pub full_plan: Option<String>,
    pub next: Option<Goto>,
    pub goto: Goto,
}

impl Command {
    pub fn goto(goto: impl Into<Goto>) -> Self {
        Self {
            messages: Vec::new(),
            full_plan: None,
            next: None,
            goto: goto.into(),
        }
    }

    pub fn end() -> Self {
        Self::goto(Goto::End)
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_full_plan(mut self, plan: impl Into<String>) -> Self {
        self.full_plan = Some(plan.into());
        self
    }

    pub fn with_next(mut self, next: Goto) -> Self {
        self.next = Some(next);
        self
    }
}
