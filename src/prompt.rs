//! Interactive prompts that keep asking until the operator types something valid.

use std::io::{self, BufRead, Write};

/// Source of answers to interactive questions.
pub trait Prompter {
    /// Show `question` and return the raw line typed in reply (without the newline).
    fn ask(&mut self, question: &str) -> io::Result<String>;

    /// Show a message that is not a question (e.g. a validation hint).
    fn say(&mut self, message: &str) -> io::Result<()>;
}

/// A prompter reading lines from `input` and echoing questions to `output`.
pub struct TerminalPrompter<R: BufRead, W: Write> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        TerminalPrompter { input, output }
    }

    #[cfg(test)]
    pub(crate) fn into_output(self) -> W {
        self.output
    }
}

impl TerminalPrompter<io::StdinLock<'static>, io::Stdout> {
    /// A prompter bound to the process stdin and stdout.
    pub fn stdio() -> Self {
        TerminalPrompter::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for TerminalPrompter<R, W> {
    fn ask(&mut self, question: &str) -> io::Result<String> {
        write!(self.output, "{} ", question.trim())?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "input closed while waiting for an answer",
            ));
        }
        let len = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(len);
        Ok(line)
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{}", message)?;
        self.output.flush()
    }
}

/// Ask for a string; an empty (or all-whitespace) reply yields `None`.
pub fn string_or_none<P: Prompter + ?Sized>(
    prompter: &mut P,
    question: &str,
) -> io::Result<Option<String>> {
    let reply = prompter.ask(question)?;
    let reply = reply.trim();
    if reply.is_empty() {
        Ok(None)
    } else {
        Ok(Some(reply.to_string()))
    }
}

/// Ask for a string, falling back to `default` on an empty reply.
pub fn string_or_default<P: Prompter + ?Sized>(
    prompter: &mut P,
    question: &str,
    default: &str,
) -> io::Result<String> {
    Ok(string_or_none(prompter, question)?.unwrap_or_else(|| default.to_string()))
}

/// Ask for a float in `[min, max]` until one is given.
///
/// With `allow_null` an empty reply yields `None`; otherwise empty input is
/// rejected like any other unparsable value.
pub fn float_between<P: Prompter + ?Sized>(
    prompter: &mut P,
    question: &str,
    min: f64,
    max: f64,
    allow_null: bool,
) -> io::Result<Option<f64>> {
    loop {
        let reply = prompter.ask(question)?;
        let reply = reply.trim();
        if reply.is_empty() && allow_null {
            return Ok(None);
        }
        match reply.parse::<f64>() {
            Ok(value) if (min..=max).contains(&value) => return Ok(Some(value)),
            _ => prompter.say(&format!("please enter a float between {:?} and {:?}", min, max))?,
        }
    }
}

/// Ask for an integer until one is given. No range is enforced.
pub fn int<P: Prompter + ?Sized>(
    prompter: &mut P,
    question: &str,
    allow_null: bool,
) -> io::Result<Option<i64>> {
    loop {
        let reply = prompter.ask(question)?;
        let reply = reply.trim();
        if reply.is_empty() && allow_null {
            return Ok(None);
        }
        match reply.parse::<i64>() {
            Ok(value) => return Ok(Some(value)),
            Err(_) => prompter.say("please enter an integer (whole number)")?,
        }
    }
}
