//! Core orchestration for the Visor GUI agent: conversation history,
//! the tool registry, and the loop that drives model calls and tool
//! dispatch until the model produces a final reply.

pub mod agent;
pub mod history;
pub mod prompts;
pub mod registry;
pub mod tools;

pub use agent::Agent;
pub use history::Transcript;
pub use registry::{ToolHandler, ToolOutcome, ToolRegistry, ToolSpec};
