//! Capability providers for the manus workflow.
//!
//! This crate owns everything the orchestration core consumes but does not
//! decide: language-model clients and their tier cache, prompt templates,
//! agent tools, and the tool-using agent loop.

pub mod agent;
pub mod config;
pub mod config_profile;
pub mod error;
pub mod llm;
pub mod prompts;
pub mod tools;

pub use agent::ReactAgent;
pub use config::Config;
pub use config::LlmTier;
pub use error::ManusErr;
pub use error::Result;
pub use llm::ChatModel;
pub use llm::ProviderRegistry;
pub use prompts::PromptLibrary;
pub use prompts::PromptVars;
pub use tools::SearchProvider;
pub use tools::ToolRegistry;
