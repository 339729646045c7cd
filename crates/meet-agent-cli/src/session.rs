use anyhow::Result;
use meet_agent::agent::Agent;

use crate::prompt::{InputType, Prompt};

const HELP: &str = "
Commands:
  help           - Show this help message
  tools          - List available Google Meet tools
  list           - List recent conferences (meetings)
  quit/exit/q    - Exit the CLI

Example queries:
  \"Show me my recent meetings\"
  \"Who attended my last meeting?\"
  \"Get the transcript from the meeting on Monday\"
  \"What meetings did I have this week?\"
  \"Get the Gemini notes from my last meeting\"
";

pub struct Session<'a> {
    agent: Agent,
    prompt: Box<dyn Prompt + 'a>,
}

impl<'a> Session<'a> {
    pub fn new(agent: Agent, prompt: Box<dyn Prompt + 'a>) -> Self {
        Session { agent, prompt }
    }

    pub fn start(&mut self) -> Result<()> {
        self.prompt.agent_ready();

        loop {
            let input = self.prompt.get_input()?;
            match input.input_type {
                InputType::Exit => break,
                InputType::AskAgain => continue,
                InputType::Help => self.prompt.render_info(HELP),
                InputType::Tools => match self.agent.list_available_tools() {
                    Ok(tools) => self.prompt.render_tools(&tools),
                    Err(e) => self.prompt.render_error(&e.to_string()),
                },
                InputType::Message => {
                    if let Some(query) = input.content {
                        self.ask(&query);
                    }
                }
            }
        }

        self.prompt.close();
        Ok(())
    }

    fn ask(&mut self, query: &str) {
        self.prompt.show_busy();
        let response = self.agent.query(query);
        self.prompt.hide_busy();

        if response.is_success() {
            self.prompt.render_answer(response.data().unwrap_or_default());
        } else {
            self.prompt
                .render_error(response.error().unwrap_or("Unknown error"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::{parse_input, Input};
    use meet_agent::broker::{AuthorizationRequest, Broker, BrokerError, ConnectionStatus};
    use meet_agent::config::Config;
    use meet_agent::models::tool::{Tool, ToolSummary, Toolkit};
    use meet_agent::models::transcript::{Transcript, Turn};
    use meet_agent::providers::base::{Provider, Reply, Usage};
    use serde_json::{json, Value};
    use std::cell::RefCell;
    use std::collections::VecDeque;
    use std::rc::Rc;

    #[derive(Debug, PartialEq)]
    enum Rendered {
        Answer(String),
        Error(String),
        Info(String),
        Tools(Vec<String>),
        Busy,
        Idle,
        Closed,
    }

    struct ScriptedPrompt {
        lines: VecDeque<&'static str>,
        rendered: Rc<RefCell<Vec<Rendered>>>,
    }

    impl Prompt for ScriptedPrompt {
        fn render_answer(&mut self, text: &str) {
            self.rendered.borrow_mut().push(Rendered::Answer(text.to_string()));
        }

        fn render_error(&mut self, text: &str) {
            self.rendered.borrow_mut().push(Rendered::Error(text.to_string()));
        }

        fn render_info(&mut self, text: &str) {
            self.rendered.borrow_mut().push(Rendered::Info(text.to_string()));
        }

        fn render_tools(&mut self, tools: &[ToolSummary]) {
            self.rendered
                .borrow_mut()
                .push(Rendered::Tools(tools.iter().map(|t| t.name.clone()).collect()));
        }

        fn get_input(&mut self) -> Result<Input> {
            Ok(parse_input(self.lines.pop_front().unwrap_or("quit")))
        }

        fn show_busy(&mut self) {
            self.rendered.borrow_mut().push(Rendered::Busy);
        }

        fn hide_busy(&mut self) {
            self.rendered.borrow_mut().push(Rendered::Idle);
        }

        fn close(&self) {
            self.rendered.borrow_mut().push(Rendered::Closed);
        }

        fn agent_ready(&self) {}
    }

    struct MeetOnlyBroker;

    impl Broker for MeetOnlyBroker {
        fn connection_status(&self, _: &str, _: &str) -> Result<ConnectionStatus, BrokerError> {
            Ok(ConnectionStatus::Active)
        }

        fn authorize(&self, _: &str, _: &str) -> Result<AuthorizationRequest, BrokerError> {
            Err(BrokerError::Api("not used".to_string()))
        }

        fn list_tools(&self, _: &str, toolkit: Toolkit) -> Result<Vec<Tool>, BrokerError> {
            match toolkit {
                Toolkit::GoogleMeet => Ok(vec![Tool::new(
                    "GOOGLEMEET_LIST_CONFERENCE_RECORDS",
                    "List conference records",
                    json!({"type": "object"}),
                    toolkit,
                )]),
                Toolkit::GoogleDrive => Err(BrokerError::Http {
                    status: 404,
                    body: "no drive toolkit".to_string(),
                }),
            }
        }

        fn execute_tool(&self, _: &str, _: &str, _: &Value) -> Result<Value, BrokerError> {
            Ok(json!({}))
        }
    }

    /// Answers with the question it was asked; fails on "boom"
    struct EchoProvider;

    impl Provider for EchoProvider {
        fn complete(&self, _: &str, transcript: &Transcript, _: &[Tool]) -> anyhow::Result<(Reply, Usage)> {
            match &transcript.turns()[0] {
                Turn::User { text } if text == "boom" => Err(anyhow::anyhow!("Request failed: 500")),
                Turn::User { text } => Ok((Reply::Answer(format!("echo: {}", text)), Usage::default())),
                _ => Ok((Reply::Answer(String::new()), Usage::default())),
            }
        }
    }

    fn run(lines: Vec<&'static str>) -> Vec<Rendered> {
        let rendered = Rc::new(RefCell::new(Vec::new()));
        let prompt = ScriptedPrompt {
            lines: lines.into(),
            rendered: Rc::clone(&rendered),
        };
        let agent = Agent::new(
            Config::new("c", "a", "ac_meet"),
            Box::new(MeetOnlyBroker),
            Box::new(EchoProvider),
        );

        Session::new(agent, Box::new(prompt)).start().unwrap();
        let output: Vec<Rendered> = rendered.borrow_mut().drain(..).collect();
        output
    }

    #[test]
    fn test_query_then_quit() {
        assert_eq!(
            run(vec!["", "Show me my recent meetings", "q", "never read"]),
            vec![
                Rendered::Busy,
                Rendered::Idle,
                Rendered::Answer("echo: Show me my recent meetings".to_string()),
                Rendered::Closed,
            ]
        );
    }

    #[test]
    fn test_commands() {
        let rendered = run(vec!["help", "tools", "list", "exit"]);
        assert!(matches!(&rendered[0], Rendered::Info(text) if text.contains("quit/exit/q")));
        assert_eq!(
            rendered[1],
            Rendered::Tools(vec!["GOOGLEMEET_LIST_CONFERENCE_RECORDS".to_string()])
        );
        assert_eq!(
            rendered[4],
            Rendered::Answer("echo: List my recent Google Meet conferences".to_string())
        );
    }

    #[test]
    fn test_failed_query_is_rendered_and_loop_continues() {
        let rendered = run(vec!["boom", "still there?"]);
        assert_eq!(
            rendered[2],
            Rendered::Error("Claude API error: Request failed: 500".to_string())
        );
        assert_eq!(rendered[5], Rendered::Answer("echo: still there?".to_string()));
        assert_eq!(rendered.last(), Some(&Rendered::Closed));
    }
}
