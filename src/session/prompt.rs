//! Operator Prompts
//!
//! Yes/no questions asked during a session: whether to resume
//! checkpointed work and whether to continue after a template that
//! cannot be filled.

use std::fs::{File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};

use log::info;

/// Asks the operator a yes/no question.
pub trait Prompt {
    /// Returns the operator's answer, or `default` for an empty reply.
    fn confirm(&mut self, question: &str, default: bool) -> io::Result<bool>;
}

/// Interprets a typed reply.
///
/// An empty reply takes the default; anything containing `y` is yes;
/// everything else is no.
pub fn parse_answer(reply: &str, default: bool) -> bool {
    let reply = reply.trim();
    if reply.is_empty() {
        default
    } else {
        reply.to_lowercase().contains('y')
    }
}

/// Prompt that reads replies from a line source and writes questions to a sink.
pub struct StreamPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> StreamPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> Prompt for StreamPrompt<R, W> {
    fn confirm(&mut self, question: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        write!(self.output, "{} {} ", question, hint)?;
        self.output.flush()?;

        let mut reply = String::new();
        if self.input.read_line(&mut reply)? == 0 {
            // End of input
            writeln!(self.output)?;
            return Ok(default);
        }

        Ok(parse_answer(&reply, default))
    }
}

/// Prompt bound to the controlling terminal.
pub type TerminalPrompt = StreamPrompt<BufReader<File>, File>;

#[cfg(unix)]
const TERMINAL_PATHS: (&str, &str) = ("/dev/tty", "/dev/tty");

#[cfg(windows)]
const TERMINAL_PATHS: (&str, &str) = ("CONIN$", "CONOUT$");

/// Opens the controlling terminal for prompting.
///
/// Questions never go through stdin/stdout, which may carry payloads or
/// be redirected.
pub fn open_terminal() -> io::Result<TerminalPrompt> {
    let (input_path, output_path) = TERMINAL_PATHS;
    let input = File::open(input_path)?;
    let output = OpenOptions::new().write(true).open(output_path)?;
    Ok(StreamPrompt::new(BufReader::new(input), output))
}

/// Prompt that never waits for the operator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoPrompt {
    answer: Option<bool>,
}

impl AutoPrompt {
    /// Answers every question with its default.
    pub fn defaults() -> Self {
        Self { answer: None }
    }

    /// Answers every question with `answer`.
    pub fn always(answer: bool) -> Self {
        Self {
            answer: Some(answer),
        }
    }
}

impl Prompt for AutoPrompt {
    fn confirm(&mut self, question: &str, default: bool) -> io::Result<bool> {
        let answer = self.answer.unwrap_or(default);
        info!("{} -> {}", question, if answer { "yes" } else { "no" });
        Ok(answer)
    }
}
