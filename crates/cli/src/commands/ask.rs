//! `parley ask` — Single-question mode.

use parley_client::{Orchestrator, SubmitOutcome};
use parley_config::AppConfig;

use super::format_message;

pub async fn run(question: String, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let widget = Orchestrator::from_config(&config)?;

    if !json {
        eprint!("  Thinking...");
    }
    let outcome = widget.submit(question).await;
    if !json {
        eprint!("\r              \r");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&widget.snapshot())?);
    } else {
        for message in widget.messages() {
            println!("{}", format_message(&message));
        }
    }

    match outcome {
        SubmitOutcome::Answered(_) => Ok(()),
        SubmitOutcome::Failed(_) => Err("Both endpoints failed".into()),
        SubmitOutcome::Ignored => Err("Nothing to ask: the question is empty".into()),
    }
}
