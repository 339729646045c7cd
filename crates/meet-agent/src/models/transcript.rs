use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::tool::ToolCall;
use crate::errors::AgentResult;

/// The outcome of one tool call, matched to its request by id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub call_id: String,
    pub outcome: AgentResult<Value>,
}

impl ToolResult {
    pub fn new<S: Into<String>>(call_id: S, outcome: AgentResult<Value>) -> Self {
        Self {
            call_id: call_id.into(),
            outcome,
        }
    }

    pub fn is_error(&self) -> bool {
        self.outcome.is_err()
    }

    /// Text handed back to the model. Failures carry the error class and detail
    /// so the model can adapt, e.g. by trying another tool.
    pub fn content_text(&self) -> String {
        let body = match &self.outcome {
            Ok(data) => json!({ "success": true, "data": data }),
            Err(e) => json!({ "error": e.kind(), "message": e.to_string() }),
        };
        serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string())
    }
}

/// One entry of a query transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Turn {
    User { text: String },
    /// A model reply; the text may be empty when the reply only requested tools
    Assistant { text: String },
    ToolCall(ToolCall),
    ToolResult(ToolResult),
}

impl Turn {
    pub fn user<S: Into<String>>(text: S) -> Self {
        Turn::User { text: text.into() }
    }

    pub fn assistant<S: Into<String>>(text: S) -> Self {
        Turn::Assistant { text: text.into() }
    }

    pub fn as_tool_call(&self) -> Option<&ToolCall> {
        if let Turn::ToolCall(call) = self {
            Some(call)
        } else {
            None
        }
    }

    pub fn as_tool_result(&self) -> Option<&ToolResult> {
        if let Turn::ToolResult(result) = self {
            Some(result)
        } else {
            None
        }
    }
}

/// The ordered turns of a single query. Lives in memory for one `query` only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    /// Start a transcript with the user's question
    pub fn new<S: Into<String>>(query: S) -> Self {
        Self {
            turns: vec![Turn::user(query)],
        }
    }

    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn tool_calls(&self) -> impl Iterator<Item = &ToolCall> {
        self.turns.iter().filter_map(Turn::as_tool_call)
    }

    pub fn tool_results(&self) -> impl Iterator<Item = &ToolResult> {
        self.turns.iter().filter_map(Turn::as_tool_result)
    }

    /// Tool calls that are not directly followed by their own result
    pub fn unanswered_calls(&self) -> Vec<&ToolCall> {
        self.turns
            .iter()
            .enumerate()
            .filter_map(|(i, turn)| {
                let call = turn.as_tool_call()?;
                let answered = self
                    .turns
                    .get(i + 1)
                    .and_then(Turn::as_tool_result)
                    .is_some_and(|result| result.call_id == call.id);
                (!answered).then_some(call)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AgentError;

    fn call(id: &str) -> Turn {
        Turn::ToolCall(ToolCall::new(id, "GOOGLEMEET_LIST_CONFERENCE_RECORDS", json!({})))
    }

    fn result(id: &str) -> Turn {
        Turn::ToolResult(ToolResult::new(id, Ok(json!({"conferenceRecords": []}))))
    }

    #[test]
    fn test_new_transcript_starts_with_query() {
        let transcript = Transcript::new("Show me my recent meetings");
        assert_eq!(transcript.turns(), &[Turn::user("Show me my recent meetings")]);
        assert!(transcript.unanswered_calls().is_empty());
    }

    #[test]
    fn test_unanswered_calls() {
        let mut transcript = Transcript::new("q");
        transcript.push(Turn::assistant(""));
        transcript.push(call("a"));
        transcript.push(result("a"));
        transcript.push(call("b"));
        assert_eq!(transcript.unanswered_calls().len(), 1);
        assert_eq!(transcript.unanswered_calls()[0].id, "b");

        transcript.push(result("b"));
        assert!(transcript.unanswered_calls().is_empty());
        assert_eq!(transcript.tool_calls().count(), 2);
        assert_eq!(transcript.tool_results().count(), 2);
    }

    #[test]
    fn test_result_for_wrong_call_does_not_count() {
        let mut transcript = Transcript::new("q");
        transcript.push(call("a"));
        transcript.push(result("other"));
        assert_eq!(transcript.unanswered_calls().len(), 1);
    }

    #[test]
    fn test_result_content_text() {
        let ok = ToolResult::new("a", Ok(json!({"items": 2})));
        assert!(!ok.is_error());
        let parsed: Value = serde_json::from_str(&ok.content_text()).unwrap();
        assert_eq!(parsed, json!({"success": true, "data": {"items": 2}}));

        let failed = ToolResult::new(
            "b",
            Err(AgentError::ToolExecution {
                tool: "GOOGLEMEET_X".to_string(),
                status: Some(401),
                message: "token revoked".to_string(),
            }),
        );
        assert!(failed.is_error());
        let parsed: Value = serde_json::from_str(&failed.content_text()).unwrap();
        assert_eq!(parsed["error"], "ToolExecutionError");
        assert_eq!(parsed["message"], "token revoked");
    }
}
