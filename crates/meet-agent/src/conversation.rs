use tracing::{debug, info, warn};

use crate::errors::AgentError;
use crate::models::response::Response;
use crate::models::transcript::{ToolResult, Transcript, Turn};
use crate::providers::base::{Provider, Reply, Usage};
use crate::tools::ToolExecutor;

/// How a single query ended
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The model produced a final answer
    Answer(String),
    /// The model kept asking for tools until the turn ceiling was hit
    MaxTurnsExceeded(usize),
    /// The model could not be reached or returned something unusable
    Failed(String),
}

impl From<Outcome> for Response {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Answer(text) => Response::success(text),
            Outcome::MaxTurnsExceeded(max_turns) => Response::failure(format!(
                "Max turns ({}) reached without completing the task.",
                max_turns
            )),
            Outcome::Failed(error) => Response::failure(error),
        }
    }
}

/// Drives the tool-use loop between the model and the broker for one query.
///
/// A turn is one call to the model. Tool calls of a turn run in the order the
/// model listed them; each result is recorded right after its call, and a
/// failing tool is reported back to the model instead of ending the query.
pub struct Orchestrator<'a> {
    provider: &'a dyn Provider,
    executor: &'a ToolExecutor<'a>,
    max_turns: usize,
}

impl<'a> Orchestrator<'a> {
    pub fn new(provider: &'a dyn Provider, executor: &'a ToolExecutor<'a>, max_turns: usize) -> Self {
        Self {
            provider,
            executor,
            max_turns,
        }
    }

    pub fn run(&self, system: &str, query: &str) -> (Outcome, Transcript) {
        let mut transcript = Transcript::new(query);
        let mut total = Usage::default();

        for turn in 1..=self.max_turns {
            debug!(turn, max_turns = self.max_turns, "Requesting model reply");
            let (reply, usage) = match self
                .provider
                .complete(system, &transcript, self.executor.tools())
            {
                Ok(completion) => completion,
                Err(e) => {
                    warn!(error = %e, "Model request failed");
                    let error = AgentError::Llm(format!("{:#}", e));
                    return (Outcome::Failed(error.to_string()), transcript);
                }
            };
            accumulate(&mut total, &usage);

            match reply {
                Reply::ToolCalls { text, calls } if !calls.is_empty() => {
                    transcript.push(Turn::assistant(text));
                    for call in calls {
                        info!(tool = %call.name, "Model requested tool");
                        let outcome = self.executor.execute(&call.name, &call.arguments);
                        if let Err(e) = &outcome {
                            warn!(tool = %call.name, error = %e, "Tool call failed, reporting to model");
                        }
                        let call_id = call.id.clone();
                        transcript.push(Turn::ToolCall(call));
                        transcript.push(Turn::ToolResult(ToolResult::new(call_id, outcome)));
                    }
                }
                Reply::ToolCalls { text, .. } | Reply::Answer(text) => {
                    transcript.push(Turn::assistant(text.clone()));
                    info!(
                        turns = turn,
                        input_tokens = total.input_tokens.unwrap_or_default(),
                        output_tokens = total.output_tokens.unwrap_or_default(),
                        "Query answered"
                    );
                    return (Outcome::Answer(text), transcript);
                }
            }
        }

        warn!(max_turns = self.max_turns, "Turn ceiling reached");
        (Outcome::MaxTurnsExceeded(self.max_turns), transcript)
    }
}

fn accumulate(total: &mut Usage, usage: &Usage) {
    let add = |a: Option<i32>, b: Option<i32>| match (a, b) {
        (None, None) => None,
        (a, b) => Some(a.unwrap_or_default() + b.unwrap_or_default()),
    };
    total.input_tokens = add(total.input_tokens, usage.input_tokens);
    total.output_tokens = add(total.output_tokens, usage.output_tokens);
    total.total_tokens = add(total.total_tokens, usage.total_tokens);
}
