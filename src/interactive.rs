//! Interactive question loop over a line-oriented reader and writer.
//!
//! The session first asks three yes/no questions that become
//! [`DisplayOptions`], then loops: read a line, answer it, show the result.
//! Typing `exit` (any case) or closing input ends the loop.

use std::io::{BufRead, Write};

use crate::error::{RagError, RagResult};
use crate::query::DisplayOptions;

/// Literal input that ends the loop, compared case-insensitively.
pub const EXIT_KEYWORD: &str = "exit";

const QUERY_PROMPT: &str = "\nEnter your query (or type 'exit' to quit): ";

/// Where the loop is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    AwaitingInput,
    Querying,
    DisplayingResult,
    Finished,
}

/// A question/answer loop bound to an input and an output.
pub struct InteractiveSession<R, W> {
    input: R,
    output: W,
    state: SessionState,
}

impl<R: BufRead, W: Write> InteractiveSession<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            state: SessionState::AwaitingInput,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Ask the three display questions. Anything but `y`/`yes` means no.
    pub fn ask_display_options(&mut self) -> RagResult<DisplayOptions> {
        Ok(DisplayOptions {
            show_reasoning: self.ask_yes_no("Show the model's reasoning trace? [y/N]: ")?,
            show_sources: self.ask_yes_no("Show the sources of retrieved context? [y/N]: ")?,
            show_prompt: self.ask_yes_no("Show the full prompt sent to the model? [y/N]: ")?,
        })
    }

    /// Run the loop until `exit` or end of input.
    ///
    /// `answer` turns a query into display text. Its errors end the session
    /// and propagate. Returns the number of queries answered.
    pub fn run<F>(&mut self, mut answer: F) -> RagResult<usize>
    where
        F: FnMut(&str) -> RagResult<String>,
    {
        let mut answered = 0usize;

        loop {
            self.transition(SessionState::AwaitingInput);
            let Some(line) = self.prompt_line(QUERY_PROMPT)? else {
                break;
            };
            if is_exit(&line) {
                break;
            }

            self.transition(SessionState::Querying);
            let rendered = answer(&line)?;
            answered += 1;

            self.transition(SessionState::DisplayingResult);
            self.write(&rendered)?;
        }

        self.transition(SessionState::Finished);
        Ok(answered)
    }

    fn ask_yes_no(&mut self, question: &str) -> RagResult<bool> {
        Ok(self.prompt_line(question)?.is_some_and(|l| is_yes(&l)))
    }

    /// Print `prompt` and read one line without its line ending.
    /// `None` at end of input.
    fn prompt_line(&mut self, prompt: &str) -> RagResult<Option<String>> {
        self.write(prompt)?;
        let mut line = String::new();
        let read = self.input.read_line(&mut line).map_err(io_err)?;
        if read == 0 {
            return Ok(None);
        }
        let trimmed_len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);
        Ok(Some(line))
    }

    fn write(&mut self, text: &str) -> RagResult<()> {
        self.output.write_all(text.as_bytes()).map_err(io_err)?;
        self.output.flush().map_err(io_err)
    }

    fn transition(&mut self, next: SessionState) {
        tracing::trace!(from = ?self.state, to = ?next, "session state");
        self.state = next;
    }
}

fn io_err(source: std::io::Error) -> RagError {
    RagError::Io { source }
}

/// Whether `input` is the exit keyword. Surrounding whitespace makes it a query.
pub fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case(EXIT_KEYWORD)
}

fn is_yes(input: &str) -> bool {
    matches!(input.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn session(input: &str) -> InteractiveSession<Cursor<Vec<u8>>, Vec<u8>> {
        InteractiveSession::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
    }

    #[test]
    fn exit_any_case_stops_without_query() {
        for word in ["exit", "EXIT", "Exit", "eXiT"] {
            let mut s = session(&format!("{word}\nnever asked\n"));
            let mut asked = Vec::new();
            let n = s
                .run(|q| {
                    asked.push(q.to_string());
                    Ok(String::new())
                })
                .unwrap();
            assert_eq!(n, 0, "{word:?}");
            assert!(asked.is_empty());
            assert_eq!(s.state(), SessionState::Finished);
        }
    }

    #[test]
    fn other_input_is_forwarded() {
        let mut s = session("How many houses?\nexited\nexit\n");
        let mut asked = Vec::new();
        let n = s
            .run(|q| {
                asked.push(q.to_string());
                Ok(format!("answer to {q}\n"))
            })
            .unwrap();
        assert_eq!(n, 2);
        assert_eq!(asked, vec!["How many houses?", "exited"]);

        let out = String::from_utf8(s.output.clone()).unwrap();
        assert!(out.contains("answer to How many houses?"));
        assert_eq!(out.matches("Enter your query").count(), 3);
    }

    #[test]
    fn padded_exit_is_a_query() {
        let mut s = session("  exit  \nexit\n");
        let mut asked = Vec::new();
        let n = s
            .run(|q| {
                asked.push(q.to_string());
                Ok(String::new())
            })
            .unwrap();
        assert_eq!(n, 1);
        assert_eq!(asked, vec!["  exit  "]);
    }

    #[test]
    fn end_of_input_finishes() {
        let mut s = session("one question");
        let n = s.run(|_| Ok("done\n".into())).unwrap();
        assert_eq!(n, 1);
        assert_eq!(s.state(), SessionState::Finished);
    }

    #[test]
    fn crlf_line_endings_stripped() {
        let mut s = session("hello\r\nEXIT\r\n");
        let mut asked = Vec::new();
        s.run(|q| {
            asked.push(q.to_string());
            Ok(String::new())
        })
        .unwrap();
        assert_eq!(asked, vec!["hello"]);
    }

    #[test]
    fn query_error_ends_session() {
        let mut s = session("boom\nsecond\n");
        let result = s.run(|_| {
            Err(RagError::Io {
                source: std::io::Error::other("model went away"),
            })
        });
        assert!(result.is_err());
        assert_eq!(s.state(), SessionState::Querying);
    }

    #[test]
    fn display_toggles_parsed() {
        let mut s = session("y\nNo\nYES\n");
        let options = s.ask_display_options().unwrap();
        assert_eq!(
            options,
            DisplayOptions {
                show_reasoning: true,
                show_sources: false,
                show_prompt: true,
            }
        );
    }

    #[test]
    fn display_toggles_default_to_no_at_eof() {
        let mut s = session("");
        assert_eq!(s.ask_display_options().unwrap(), DisplayOptions::default());
    }
}
