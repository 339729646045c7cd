use std::process::ExitCode;

use clap::Parser;
use console::style;
use meet_agent::agent::Agent;
use meet_agent::config::Config;
use tracing_subscriber::EnvFilter;

mod consent;
mod prompt;
mod session;

use consent::TerminalConsent;
use prompt::cliclack::CliclackPrompt;
use session::Session;

/// Query your past Google Meet meetings using natural language
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_welcome() {
    println!(
        "{}",
        style("\nGoogle Meet Assistant\n=====================").cyan().bold()
    );
    println!("Query your past Google Meet meetings using natural language.\n");
    println!("Type 'help' for commands, 'quit' to exit.\n");
}

fn error(text: impl std::fmt::Display) {
    eprintln!("{}", style(text).red());
}

fn main() -> ExitCode {
    let _cli = Cli::parse();
    dotenv::dotenv().ok();
    init_tracing();

    print_welcome();
    println!("{}", style("Initializing agent...").cyan());

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error(&e);
            eprintln!("\nPlease check your .env file has:");
            eprintln!("  COMPOSIO_API_KEY=...");
            eprintln!("  ANTHROPIC_API_KEY=...");
            eprintln!("  COMPOSIO_AUTH_CONFIG_ID=...");
            return ExitCode::FAILURE;
        }
    };

    let mut agent = match Agent::from_config(config) {
        Ok(agent) => agent.with_consent(Box::new(TerminalConsent)),
        Err(e) => {
            error(&e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = agent.setup() {
        error(format!("Setup Error: {}", e));
        return ExitCode::FAILURE;
    }

    let mut session = Session::new(agent, Box::new(CliclackPrompt::new()));
    match session.start() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error(format!("Error: {:#}", e));
            ExitCode::FAILURE
        }
    }
}
