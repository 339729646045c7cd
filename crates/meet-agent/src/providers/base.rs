use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::tool::{Tool, ToolCall};
use crate::models::transcript::Transcript;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: Option<i32>,
    pub output_tokens: Option<i32>,
    pub total_tokens: Option<i32>,
}

impl Usage {
    pub fn new(
        input_tokens: Option<i32>,
        output_tokens: Option<i32>,
        total_tokens: Option<i32>,
    ) -> Self {
        Self {
            input_tokens,
            output_tokens,
            total_tokens,
        }
    }
}

/// What the model decided to do with its turn
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// A final answer for the user
    Answer(String),
    /// One or more tools to run before the model continues; `text` is any
    /// commentary the model emitted alongside the calls
    ToolCalls { text: String, calls: Vec<ToolCall> },
}

/// Base trait for LLM providers
pub trait Provider {
    /// Send the transcript so far and the available tools, get the model's next move
    fn complete(
        &self,
        system: &str,
        transcript: &Transcript,
        tools: &[Tool],
    ) -> Result<(Reply, Usage)>;
}
