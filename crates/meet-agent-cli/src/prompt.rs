use anyhow::Result;
use meet_agent::models::tool::ToolSummary;

pub mod cliclack;

pub trait Prompt {
    fn render_answer(&mut self, text: &str);
    fn render_error(&mut self, text: &str);
    fn render_info(&mut self, text: &str);
    fn render_tools(&mut self, tools: &[ToolSummary]);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&mut self);
    fn close(&self);
    fn agent_ready(&self) {
        println!("\nAgent ready! You can now query your meetings.\n");
    }
}

#[derive(Debug, PartialEq)]
pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Only messages carry content
}

#[derive(Debug, PartialEq)]
pub enum InputType {
    AskAgain, // Nothing to do, prompt again
    Message,  // A question for the agent
    Help,
    Tools,
    Exit,
}

/// Shortcut the `list` command expands to
pub const LIST_QUERY: &str = "List my recent Google Meet conferences";

impl Input {
    fn command(input_type: InputType) -> Self {
        Input {
            input_type,
            content: None,
        }
    }

    fn message<S: Into<String>>(content: S) -> Self {
        Input {
            input_type: InputType::Message,
            content: Some(content.into()),
        }
    }
}

/// Turn a raw line into a command or a message; commands are case-insensitive
pub fn parse_input(line: &str) -> Input {
    let text = line.trim();
    if text.is_empty() {
        return Input::command(InputType::AskAgain);
    }

    match text.to_lowercase().as_str() {
        "quit" | "exit" | "q" => Input::command(InputType::Exit),
        "help" => Input::command(InputType::Help),
        "tools" => Input::command(InputType::Tools),
        "list" => Input::message(LIST_QUERY),
        _ => Input::message(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands() {
        for exit in ["quit", "exit", "q", "QUIT", "  Exit "] {
            assert_eq!(parse_input(exit).input_type, InputType::Exit);
        }
        assert_eq!(parse_input("help").input_type, InputType::Help);
        assert_eq!(parse_input("Tools").input_type, InputType::Tools);
    }

    #[test]
    fn test_empty_input_asks_again() {
        assert_eq!(parse_input("").input_type, InputType::AskAgain);
        assert_eq!(parse_input("   \t").input_type, InputType::AskAgain);
    }

    #[test]
    fn test_list_expands_to_query() {
        assert_eq!(parse_input("list"), Input::message(LIST_QUERY));
    }

    #[test]
    fn test_message_is_trimmed() {
        let input = parse_input("  Who attended my last meeting?  ");
        assert_eq!(input.input_type, InputType::Message);
        assert_eq!(input.content.as_deref(), Some("Who attended my last meeting?"));
    }

    #[test]
    fn test_command_words_inside_messages() {
        let input = parse_input("help me find the notes from monday");
        assert_eq!(input.input_type, InputType::Message);
    }
}
