use std::io::{self, Write};

use anyhow::Result;
use bat::WrappingMode;
use cliclack::{input, spinner, ProgressBar};
use console::style;
use meet_agent::models::tool::ToolSummary;

use super::{parse_input, Input, InputType, Prompt};

const THEME: &str = "zenburn";

pub struct CliclackPrompt {
    spinner: Option<ProgressBar>,
}

impl CliclackPrompt {
    pub fn new() -> Self {
        CliclackPrompt { spinner: None }
    }
}

impl Default for CliclackPrompt {
    fn default() -> Self {
        Self::new()
    }
}

fn print_markdown(content: &str) {
    let printed = bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(THEME)
        .language("Markdown")
        .wrapping_mode(WrappingMode::Character)
        .print();

    // bat refuses some terminals; plain text is still readable
    if printed.is_err() {
        println!("{}", content);
    }
}

impl Prompt for CliclackPrompt {
    fn render_answer(&mut self, text: &str) {
        println!("{}", style("Assistant:").green().bold());
        if text.is_empty() {
            println!("{}", style("No data returned.").yellow());
        } else {
            print_markdown(text);
        }
        println!();
        let _ = io::stdout().flush();
    }

    fn render_error(&mut self, text: &str) {
        println!("{}\n", style(format!("Error: {}", text)).red());
    }

    fn render_info(&mut self, text: &str) {
        println!("{}", style(text).cyan());
    }

    fn render_tools(&mut self, tools: &[ToolSummary]) {
        if tools.is_empty() {
            println!("{}\n", style("No tools available.").yellow());
            return;
        }
        println!("{}", style(format!("\nAvailable Tools ({}):", tools.len())).cyan());
        for tool in tools {
            println!("  - {}: {}", style(&tool.name).bold(), tool.description);
        }
        println!();
    }

    fn get_input(&mut self) -> Result<Input> {
        let line: String = match input("You:").placeholder("Ask about your meetings").interact() {
            Ok(line) => line,
            // Ctrl+C / Ctrl+D end the session like `quit`
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                return Ok(Input {
                    input_type: InputType::Exit,
                    content: None,
                })
            }
            Err(e) => return Err(e.into()),
        };
        Ok(parse_input(&line))
    }

    fn show_busy(&mut self) {
        let spinner = spinner();
        spinner.start("Thinking...");
        self.spinner = Some(spinner);
    }

    fn hide_busy(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop("");
        }
    }

    fn close(&self) {
        println!("{}", style("Goodbye!").cyan());
    }
}
