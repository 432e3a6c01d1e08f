pub mod ask;
pub mod chat;
pub mod config_cmd;
pub mod status;

use chrono::Local;
use parley_core::message::{Message, Role};

/// Render one transcript entry the way the widget panel shows it:
/// speaker, content, then the local `HH:MM` it was created.
pub fn format_message(message: &Message) -> String {
    let speaker = match (message.role, message.is_error) {
        (Role::User, _) => "You",
        (Role::Assistant, false) => "Assistant",
        (Role::Assistant, true) => "Assistant [error]",
    };
    let time = message.timestamp.with_timezone(&Local).format("%H:%M");

    let mut out = String::new();
    for (i, line) in message.content.lines().enumerate() {
        if i == 0 {
            out.push_str(&format!("  {speaker} > {line}\n"));
        } else {
            out.push_str(&format!("  {:width$}   {line}\n", "", width = speaker.len()));
        }
    }
    if message.content.is_empty() {
        out.push_str(&format!("  {speaker} >\n"));
    }
    for source in &message.sources {
        match source.page {
            Some(page) => out.push_str(&format!("      [source: {}, p. {page}]\n", source.source)),
            None => out.push_str(&format!("      [source: {}]\n", source.source)),
        }
    }
    out.push_str(&format!("      {time}"));
    out
}
