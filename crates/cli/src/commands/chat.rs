//! `parley chat` — Interactive widget session.
//!
//! Input is read on the main task and turned into widget calls; everything
//! printed in response comes from a render task subscribed to the widget's
//! events, the same way a browser surface would redraw.

use std::io::Write;
use std::sync::Arc;

use parley_client::{Orchestrator, SubmitOutcome};
use parley_config::AppConfig;
use parley_core::event::WidgetEvent;
use parley_core::message::Role;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;

use super::format_message;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let widget = Arc::new(Orchestrator::from_config(&config)?);
    if !widget.is_open() {
        widget.toggle_open();
    }

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║        Parley — Ask the Assistant            ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Primary:       {}", config.primary.url);
    println!("  Fallback:      {}", config.fallback.url);
    println!("  Conversation:  {}", widget.conversation_id());
    println!();
    println!("  Type your question and press Enter.");
    println!("  /clear clears the transcript, /toggle hides or shows it, /exit quits.");
    println!();

    let events = widget.events().subscribe();
    let renderer = tokio::spawn(render_loop(widget.clone(), events));

    prompt()?;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/exit" | "/quit" => break,
            "/clear" => {
                let was_empty = widget.messages().is_empty();
                widget.clear_transcript();
                if was_empty {
                    prompt()?;
                }
            }
            "/toggle" => widget.toggle_open(),
            _ => {
                widget.set_draft_input(line);
                if widget.submit_draft().await == SubmitOutcome::Ignored {
                    prompt()?;
                }
            }
        }
    }

    renderer.abort();
    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

/// Redraw in response to widget events until the widget goes away.
async fn render_loop(widget: Arc<Orchestrator>, mut rx: Receiver<Arc<WidgetEvent>>) {
    loop {
        let event = match rx.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Renderer fell behind");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        match event.as_ref() {
            WidgetEvent::BusyChanged { busy: true, .. } => eprint!("  ..."),
            WidgetEvent::BusyChanged { busy: false, .. } => {
                let _ = prompt();
            }
            WidgetEvent::MessageAppended {
                index,
                role: Role::Assistant,
                ..
            } => {
                eprint!("\r     \r");
                if widget.is_open() {
                    if let Some(message) = widget.messages().get(*index) {
                        println!("{}", format_message(message));
                    }
                } else {
                    println!("  (new answer waiting, /toggle to show)");
                }
            }
            WidgetEvent::MessageAppended { .. } => {}
            WidgetEvent::TranscriptCleared { .. } => {
                println!("  (transcript cleared)");
                let _ = prompt();
            }
            WidgetEvent::VisibilityChanged { open: true, .. } => {
                println!("  (transcript shown)");
                for message in widget.messages() {
                    println!("{}", format_message(&message));
                }
                let _ = prompt();
            }
            WidgetEvent::VisibilityChanged { open: false, .. } => {
                println!("  (transcript hidden)");
                let _ = prompt();
            }
        }
    }
}
