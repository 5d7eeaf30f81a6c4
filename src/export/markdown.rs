//! Readable markdown document for a transcript.
//!
//! Layout only: roles and reasoning are taken from the record as-is.

use crate::transcript::{TranscriptRecord, TurnRecord};

/// Render the whole transcript as one markdown document.
pub fn to_markdown(record: &TranscriptRecord) -> String {
    let metadata = record.metadata();
    let mut out = String::from("# DeepSeek Chat Export\n\n");

    if !metadata.title.is_empty() {
        out.push_str(&format!("- **Title:** {}\n", metadata.title));
    }
    if !metadata.url.is_empty() {
        out.push_str(&format!("- **URL:** {}\n", metadata.url));
    }
    out.push_str(&format!("- **Chat ID:** {}\n", metadata.chat_id));
    out.push_str(&format!("- **Exported:** {}\n", metadata.export_date));
    out.push_str(&format!("- **Total Messages:** {}\n", record.len()));

    for turn in record.turns() {
        out.push_str("\n---\n\n");
        push_turn(&mut out, turn);
    }
    out
}

fn push_turn(out: &mut String, turn: &TurnRecord) {
    out.push_str(&format!("### {} ({})\n\n", turn.role().label(), turn.timestamp()));

    if let Some(reasoning) = turn.reasoning() {
        out.push_str("> **Thinking Process:**\n>\n");
        for line in reasoning.lines() {
            if line.is_empty() {
                out.push_str(">\n");
            } else {
                out.push_str(&format!("> {}\n", line));
            }
        }
        out.push('\n');
    }

    out.push_str(turn.content());
    out.push('\n');
}
