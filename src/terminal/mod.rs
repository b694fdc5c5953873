//! Console seam between the interpreter and the outside world
//!
//! The interpreter never touches stdin/stdout directly. `printf`, `puts`,
//! `gets` and `scanf` go through a [`Terminal`] handed to it at construction:
//! - [`MockTerminal`]: captures output and replays scripted input lines (tests)
//! - [`StdTerminal`]: process stdio (CLI)

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Output sink and line-oriented input source
pub trait Terminal {
    /// Write text exactly as given, no newline added
    fn write(&mut self, text: &str);

    /// Read one line without its terminator; `None` at end of input
    fn read_line(&mut self) -> Option<String>;
}

/// Mock terminal for capturing program output
#[derive(Debug, Clone, Default)]
pub struct MockTerminal {
    output: String,
    input: VecDeque<String>,
}

impl MockTerminal {
    pub fn new() -> Self {
        MockTerminal::default()
    }

    /// Terminal whose `read_line` replays `lines` in order
    pub fn with_input<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MockTerminal {
            output: String::new(),
            input: lines.into_iter().map(Into::into).collect(),
        }
    }

    /// Queue another input line
    pub fn push_input(&mut self, line: impl Into<String>) {
        self.input.push_back(line.into());
    }

    /// Everything written so far
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Get all output as lines; a trailing newline does not add an empty line
    pub fn get_output(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.output.split('\n').map(str::to_string).collect();
        if lines.last().is_some_and(|s| s.is_empty()) {
            lines.pop();
        }
        lines
    }
}

impl Terminal for MockTerminal {
    fn write(&mut self, text: &str) {
        self.output.push_str(text);
    }

    fn read_line(&mut self) -> Option<String> {
        self.input.pop_front()
    }
}

/// Terminal backed by the process's stdin and stdout
#[derive(Debug, Default)]
pub struct StdTerminal;

impl StdTerminal {
    pub fn new() -> Self {
        StdTerminal
    }
}

impl Terminal for StdTerminal {
    fn write(&mut self, text: &str) {
        let mut stdout = io::stdout().lock();
        // Program output has no error channel, a closed stdout just drops it
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }

    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                let trimmed = line.trim_end_matches(['\n', '\r']).len();
                line.truncate(trimmed);
                Some(line)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_lines() {
        let mut term = MockTerminal::new();
        term.write("Hello, ");
        term.write("World\n");
        term.write("second\n");
        assert_eq!(term.get_output(), vec!["Hello, World", "second"]);
        assert_eq!(term.output(), "Hello, World\nsecond\n");
    }

    #[test]
    fn test_scripted_input() {
        let mut term = MockTerminal::with_input(["12 7", "Alice"]);
        term.push_input("last");
        assert_eq!(term.read_line().as_deref(), Some("12 7"));
        assert_eq!(term.read_line().as_deref(), Some("Alice"));
        assert_eq!(term.read_line().as_deref(), Some("last"));
        assert_eq!(term.read_line(), None);
    }
}
