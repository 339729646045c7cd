use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::collections::HashSet;

use super::base::{Reply, Usage};
use crate::models::tool::{Tool, ToolCall};
use crate::models::transcript::{Transcript, Turn};

/// Convert a transcript to Anthropic's message specification.
///
/// Each model reply opens a round: its text and every tool call of the round
/// become one assistant message, and the matching results become the user
/// message that follows it.
pub fn transcript_to_anthropic_spec(transcript: &Transcript) -> Vec<Value> {
    let mut messages = Vec::new();
    let mut assistant_blocks: Vec<Value> = Vec::new();
    let mut result_blocks: Vec<Value> = Vec::new();

    fn flush(messages: &mut Vec<Value>, assistant: &mut Vec<Value>, results: &mut Vec<Value>) {
        if !assistant.is_empty() {
            messages.push(json!({ "role": "assistant", "content": std::mem::take(assistant) }));
        }
        if !results.is_empty() {
            messages.push(json!({ "role": "user", "content": std::mem::take(results) }));
        }
    }

    for turn in transcript.turns() {
        match turn {
            Turn::User { text } => {
                flush(&mut messages, &mut assistant_blocks, &mut result_blocks);
                messages.push(json!({ "role": "user", "content": text }));
            }
            Turn::Assistant { text } => {
                flush(&mut messages, &mut assistant_blocks, &mut result_blocks);
                if !text.is_empty() {
                    assistant_blocks.push(json!({ "type": "text", "text": text }));
                }
            }
            Turn::ToolCall(call) => {
                assistant_blocks.push(json!({
                    "type": "tool_use",
                    "id": call.id,
                    "name": call.name,
                    "input": tool_input(&call.arguments),
                }));
            }
            Turn::ToolResult(result) => {
                result_blocks.push(json!({
                    "type": "tool_result",
                    "tool_use_id": result.call_id,
                    "content": result.content_text(),
                    "is_error": result.is_error(),
                }));
            }
        }
    }
    flush(&mut messages, &mut assistant_blocks, &mut result_blocks);

    messages
}

// Anthropic rejects tool_use blocks whose input is not an object
fn tool_input(arguments: &Value) -> Value {
    if arguments.is_object() {
        arguments.clone()
    } else {
        json!({})
    }
}

/// Convert internal Tool format to Anthropic's tool specification
pub fn tools_to_anthropic_spec(tools: &[Tool]) -> Result<Vec<Value>> {
    let mut tool_names = HashSet::new();
    let mut result = Vec::new();

    for tool in tools {
        if !tool_names.insert(&tool.name) {
            return Err(anyhow!("Duplicate tool name: {}", tool.name));
        }

        result.push(json!({
            "name": tool.name,
            "description": tool.description,
            "input_schema": tool.input_schema,
        }));
    }

    Ok(result)
}

/// Convert an Anthropic Messages API response into a Reply
pub fn anthropic_response_to_reply(response: &Value) -> Result<Reply> {
    let blocks = response
        .get("content")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow!("Invalid response format from Anthropic API: no content"))?;

    let mut texts = Vec::new();
    let mut calls = Vec::new();

    for block in blocks {
        match block.get("type").and_then(Value::as_str) {
            Some("text") => {
                if let Some(text) = block.get("text").and_then(Value::as_str) {
                    texts.push(text.to_string());
                }
            }
            Some("tool_use") => {
                let id = block
                    .get("id")
                    .and_then(Value::as_str)
                    .ok_or_else(|| anyhow!("tool_use block without id"))?;
                let name = block
                    .get("name")
                    .and_then(Value::as_str)
                    .ok_or_else(|| anyhow!("tool_use block without name"))?;
                let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
                calls.push(ToolCall::new(id, name, input));
            }
            _ => {}
        }
    }

    let text = texts.join("\n");
    if calls.is_empty() {
        Ok(Reply::Answer(text))
    } else {
        Ok(Reply::ToolCalls { text, calls })
    }
}

pub fn get_usage(response: &Value) -> Usage {
    let usage = response.get("usage");
    let read = |key: &str| {
        usage
            .and_then(|u| u.get(key))
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok())
    };

    let input_tokens = read("input_tokens");
    let output_tokens = read("output_tokens");
    let total_tokens = match (input_tokens, output_tokens) {
        (Some(input), Some(output)) => Some(input + output),
        _ => None,
    };

    Usage::new(input_tokens, output_tokens, total_tokens)
}
