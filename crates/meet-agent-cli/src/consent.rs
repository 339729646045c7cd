use console::style;
use meet_agent::broker::AuthorizationRequest;
use meet_agent::connection::ConsentPrompt;
use meet_agent::models::tool::Toolkit;
use tracing::debug;

/// Prints the consent URL and tries to open it in the default browser
pub struct TerminalConsent;

impl ConsentPrompt for TerminalConsent {
    fn present(&self, toolkit: Toolkit, request: &AuthorizationRequest) {
        let rule = "=".repeat(60);
        println!("\n{}", rule);
        println!("{}", style(format!("{} Authentication Required", toolkit)).bold());
        println!("{}", rule);
        println!("\nA browser window will open for you to authorize access.");
        match toolkit {
            Toolkit::GoogleMeet => println!("Please sign in with your Google Workspace account.\n"),
            Toolkit::GoogleDrive => println!("This is needed to fetch Gemini meeting notes.\n"),
        }

        if let Err(e) = webbrowser::open(&request.redirect_url) {
            debug!(error = %e, "Could not open browser");
        }

        println!("If the browser didn't open, visit this URL:");
        println!("\n  {}\n", style(&request.redirect_url).underlined());
        println!("Waiting for authentication...");
        println!("{}\n", rule);
    }
}
