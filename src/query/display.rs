//! Rendering a [`QueryResponse`] for the terminal.

use std::fmt::Write as _;

use crate::query::QueryResponse;

/// Which optional parts of a response to show. The answer is always shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayOptions {
    /// Print the model's reasoning trace, if it produced one.
    pub show_reasoning: bool,
    /// Print the id and score of each retrieved chunk.
    pub show_sources: bool,
    /// Print the full prompt sent to the model.
    pub show_prompt: bool,
}

impl DisplayOptions {
    /// Defaults for a single query passed on the command line.
    pub fn one_shot() -> Self {
        Self {
            show_sources: true,
            ..Self::default()
        }
    }
}

/// Render `response` under `options`.
pub fn render_response(response: &QueryResponse, options: &DisplayOptions) -> String {
    let mut out = String::new();

    if options.show_prompt {
        let _ = writeln!(out, "Prompt:\n{}", response.prompt.trim_end());
        out.push('\n');
    }

    if options.show_reasoning {
        match &response.reasoning {
            Some(reasoning) => {
                let _ = writeln!(out, "Reasoning:\n{reasoning}");
            }
            None => out.push_str("Reasoning: (none)\n"),
        }
        out.push('\n');
    }

    let _ = writeln!(out, "Response: {}", response.answer);

    if options.show_sources {
        if response.sources.is_empty() {
            out.push_str("Sources: (none)\n");
        } else {
            out.push_str("Sources:\n");
            for (i, source) in response.sources.iter().enumerate() {
                let _ = writeln!(out, "  {}. {} (similarity: {:.4})", i + 1, source.id, source.score);
            }
        }
    }

    out
}
