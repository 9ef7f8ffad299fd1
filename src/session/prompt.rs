//! Interactive window front end for the session loop.
//!
//! Implements [`WindowSource`] over any `BufRead`/`Write` pair so the
//! prompt/response cycle is testable without a terminal. A malformed window
//! aborts only the current attempt: the operator is asked again.

use std::io::{BufRead, Stdout, Write};

use crate::core::{TimeWindow, WINDOW_PATTERN};

use super::WindowSource;

pub struct PromptWindows<R, W> {
    input: R,
    output: W,
    initial: Option<TimeWindow>,
    default_start: String,
    default_end: String,
}

impl PromptWindows<std::io::StdinLock<'static>, Stdout> {
    /// Prompt on the process's stdin/stdout.
    pub fn from_stdio(
        initial: Option<TimeWindow>,
        default_start: String,
        default_end: String,
    ) -> Self {
        PromptWindows::new(
            std::io::stdin().lock(),
            std::io::stdout(),
            initial,
            default_start,
            default_end,
        )
    }
}

impl<R: BufRead, W: Write> PromptWindows<R, W> {
    pub fn new(
        input: R,
        output: W,
        initial: Option<TimeWindow>,
        default_start: String,
        default_end: String,
    ) -> Self {
        PromptWindows { input, output, initial, default_start, default_end }
    }

    /// Prompt and read one trimmed line. `None` on EOF or I/O failure, which
    /// the caller treats as a stop signal.
    fn ask(&mut self, prompt: &str) -> Option<String> {
        write!(self.output, "{prompt}").ok()?;
        self.output.flush().ok()?;
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim().to_string()),
        }
    }
}

impl<R: BufRead, W: Write> WindowSource for PromptWindows<R, W> {
    fn next_window(&mut self) -> Option<TimeWindow> {
        if let Some(window) = self.initial.take() {
            return Some(window);
        }
        loop {
            let again =
                self.ask("\nGenerate another timeline with a different timeframe? (y/n): ")?;
            if !again.eq_ignore_ascii_case("y") {
                return None;
            }

            let start_prompt =
                format!("Enter start time ({WINDOW_PATTERN}) [default: {}]: ", self.default_start);
            let start = match self.ask(&start_prompt)? {
                line if line.is_empty() => self.default_start.clone(),
                line => line,
            };
            let end_prompt =
                format!("Enter end time ({WINDOW_PATTERN}) [default: {}]: ", self.default_end);
            let end = match self.ask(&end_prompt)? {
                line if line.is_empty() => self.default_end.clone(),
                line => line,
            };

            match TimeWindow::parse(&start, &end) {
                Ok(window) => return Some(window),
                Err(e) => {
                    let _ = writeln!(self.output, "{e}. Please try again.");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt(input: &str, initial: Option<TimeWindow>) -> PromptWindows<Cursor<Vec<u8>>, Vec<u8>> {
        PromptWindows::new(
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
            initial,
            "2024-07-13 18:00:00".to_string(),
            "2024-07-16 18:00:00".to_string(),
        )
    }

    fn window() -> TimeWindow {
        TimeWindow::parse("2024-07-14 00:00:00", "2024-07-14 12:00:00").unwrap()
    }

    #[test]
    fn initial_window_is_served_before_any_prompt() {
        let mut source = prompt("n\n", Some(window()));
        assert_eq!(source.next_window(), Some(window()));
        assert_eq!(source.next_window(), None);
    }

    #[test]
    fn declining_stops_the_session() {
        let mut source = prompt("n\n", None);
        assert_eq!(source.next_window(), None);
    }

    #[test]
    fn eof_stops_the_session() {
        let mut source = prompt("", None);
        assert_eq!(source.next_window(), None);
    }

    #[test]
    fn malformed_window_reprompts_instead_of_aborting() {
        let input = "y\nnot-a-date\nalso-bad\ny\n2024-07-14 00:00:00\n2024-07-14 12:00:00\n";
        let mut source = prompt(input, None);

        assert_eq!(source.next_window(), Some(window()));
        let transcript = String::from_utf8(source.output.clone()).unwrap();
        assert!(transcript.contains("Please try again"));
    }

    #[test]
    fn empty_lines_fall_back_to_defaults() {
        let mut source = prompt("y\n\n\n", None);
        let expected = TimeWindow::parse("2024-07-13 18:00:00", "2024-07-16 18:00:00").unwrap();
        assert_eq!(source.next_window(), Some(expected));
    }
}
