//! Shared data types for the manus workflow: transcript messages, node
//! identifiers, routing targets, and the events a run emits.

pub mod models;
pub mod nodes;
pub mod plan;
pub mod protocol;

pub use models::ContentPart;
pub use models::Message;
pub use models::MessageContent;
pub use models::Role;
pub use nodes::Goto;
pub use nodes::NodeId;
pub use nodes::TeamMember;
pub use protocol::RunId;
pub use protocol::WorkflowEvent;
