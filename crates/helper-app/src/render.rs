//! Plain-text rendering of turns, metrics, and help for the terminal.

use helper_core::types::{MetricsView, Role, Turn};

pub const HELP_TEXT: &str = "\
Policy & Product Helper
  An assistant that answers policy and product questions with citations.

Getting started
  1. Switch to the admin tab (/admin) and run /ingest to load the sample documents.
  2. Switch back to chat (/chat).
  3. Ask something, for example:
       Can a customer return a damaged blender after 20 days?
       What's the shipping SLA to East Malaysia for bulky items?

Commands
  /chat      chat tab: every other line is a question
  /admin     admin tab: shows index and latency metrics
  /ingest    ingest the sample documents, then refresh metrics
  /refresh   refresh metrics
  /help      show this help
  /quit      exit

Answers list their sources and the supporting chunks they were built from.";

/// Render one turn for the chat transcript.
pub fn render_turn(turn: &Turn) -> String {
    match turn.role {
        Role::User => format!("you> {}", turn.content),
        Role::Assistant => {
            let mut out = format!("assistant> {}", turn.content);
            let citations = turn.citations();
            if !citations.is_empty() {
                out.push_str("\n  Sources:");
                for c in citations {
                    out.push_str(&format!(" [{}]", c.label()));
                }
            }
            let chunks = turn.chunks();
            if !chunks.is_empty() {
                out.push_str("\n  Supporting chunks:");
                for (i, chunk) in chunks.iter().enumerate() {
                    out.push_str(&format!("\n    {}. {}", i + 1, chunk.label()));
                    for line in chunk.text.lines() {
                        out.push_str(&format!("\n       {}", line));
                    }
                }
            }
            out
        }
    }
}

/// Render the six metric cards as aligned rows.
pub fn render_metrics(view: &MetricsView) -> String {
    let rows = view.rows();
    let width = rows.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    rows.iter()
        .map(|(label, value)| format!("  {:<width$}  {}", label, value, width = width))
        .collect::<Vec<_>>()
        .join("\n")
}
