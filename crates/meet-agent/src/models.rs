//! These models represent the objects passed around by the agent
//!
//! Three external formats meet here: Composio tool listings and execution
//! payloads, Anthropic messages and tool definitions, and the uniform
//! response handed back to callers. We convert at the edges and keep
//! these internal structs independent of either wire shape.
pub mod response;
pub mod tool;
pub mod transcript;
