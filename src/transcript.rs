//! Reading a question file and writing it back with freshly generated answers.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::errors::TesterError;
use crate::openai::{ChatClient, ChatMessage};
use crate::options::RequestOptions;

/// Marks a question line. The question text follows the prefix.
pub const QUESTION_PREFIX: &str = "- Q: ";
/// Marks a previously generated answer line.
pub const ANSWER_PREFIX: &str = "- A:";
/// Written in front of each generated answer.
pub const ANSWER_LINE_PREFIX: &str = "- A: ";

/// What a single transcript line is.
#[derive(Debug, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// A question, with the surrounding whitespace of its text stripped.
    Question(&'a str),
    /// A stale answer, to be regenerated.
    Answer,
    /// Anything else, copied through unchanged.
    Other,
}

impl<'a> LineKind<'a> {
    pub fn classify(line: &'a str) -> Self {
        if let Some(question) = line.strip_prefix(QUESTION_PREFIX) {
            LineKind::Question(question.trim())
        } else if line.starts_with(ANSWER_PREFIX) {
            LineKind::Answer
        } else {
            LineKind::Other
        }
    }
}

/// Ordered conversation sent with every request. Messages are only ever appended.
#[derive(Debug, Default)]
pub struct History {
    messages: Vec<ChatMessage>,
}

impl History {
    pub fn new(system_message: Option<&str>) -> Self {
        let mut history = History::default();
        if let Some(system) = system_message {
            history.push(ChatMessage::system(system));
        }
        history
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    fn len(&self) -> usize {
        self.messages.len()
    }
}

/// Copy `reader` to `writer`, replacing every answer with one generated by
/// `client`. Returns the number of questions answered.
///
/// Each question sees all previous questions and answers of the same run.
pub fn rewrite<C, R, W>(
    client: &C,
    options: &RequestOptions,
    system_message: Option<&str>,
    mut reader: R,
    mut writer: W,
) -> Result<usize, TesterError>
where
    C: ChatClient + ?Sized,
    R: BufRead,
    W: Write,
{
    let mut history = History::new(system_message);
    let mut answered = 0;
    let mut line = String::new();

    while reader.read_line(&mut line)? != 0 {
        match LineKind::classify(&line) {
            LineKind::Question(question) => {
                // the answer ends the same way as its question
                let ending = if line.ends_with("\r\n") { "\r\n" } else { "\n" };
                writer.write_all(line.as_bytes())?;
                if !line.ends_with('\n') {
                    writer.write_all(ending.as_bytes())?;
                }
                println!("generating answer for: {}", question);

                history.push(ChatMessage::user(question));
                let answer = client.complete(options, history.messages())?;
                write!(
                    writer,
                    "{}{}{}",
                    ANSWER_LINE_PREFIX,
                    answer.content.trim(),
                    ending
                )?;
                history.push(answer);
                // keep what we have if a later request fails
                writer.flush()?;
                answered += 1;
            }
            LineKind::Answer => {}
            LineKind::Other => writer.write_all(line.as_bytes())?,
        }
        line.clear();
    }
    writer.flush()?;
    log::debug!(
        "answered {} questions, {} messages in history",
        answered,
        history.len()
    );
    Ok(answered)
}

/// Answer every question in `input` and write the result to `output`,
/// creating the output's parent directories if needed.
pub fn fill_output_file<C: ChatClient + ?Sized>(
    client: &C,
    options: &RequestOptions,
    system_message: Option<&str>,
    input: &Path,
    output: &Path,
) -> Result<usize, TesterError> {
    let reader = BufReader::new(File::open(input)?);
    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }
    let writer = BufWriter::new(File::create(output)?);
    rewrite(client, options, system_message, reader, writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::Role;
    use std::cell::RefCell;
    use std::io::Cursor;

    /// Replies with canned answers in order and records every history it was sent.
    struct StubClient {
        answers: RefCell<Vec<&'static str>>,
        seen: RefCell<Vec<Vec<ChatMessage>>>,
    }

    impl StubClient {
        fn new(answers: &[&'static str]) -> Self {
            StubClient {
                answers: RefCell::new(answers.iter().rev().copied().collect()),
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChatClient for StubClient {
        fn complete(
            &self,
            _options: &RequestOptions,
            messages: &[ChatMessage],
        ) -> Result<ChatMessage, TesterError> {
            self.seen.borrow_mut().push(messages.to_vec());
            let answer = self
                .answers
                .borrow_mut()
                .pop()
                .ok_or(TesterError::EmptyResponse)?;
            Ok(ChatMessage::assistant(answer))
        }
    }

    fn run(client: &StubClient, system: Option<&str>, input: &str) -> String {
        let mut output = Vec::new();
        rewrite(
            client,
            &RequestOptions::default(),
            system,
            Cursor::new(input),
            &mut output,
        )
        .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            LineKind::classify("- Q:  What is 2+2? \n"),
            LineKind::Question("What is 2+2?")
        );
        assert_eq!(LineKind::classify("- A: stale\n"), LineKind::Answer);
        assert_eq!(LineKind::classify("- A:\n"), LineKind::Answer);
        assert_eq!(LineKind::classify("- Q:no space\n"), LineKind::Other);
        assert_eq!(LineKind::classify("  - Q: indented\n"), LineKind::Other);
        assert_eq!(LineKind::classify("# Heading\n"), LineKind::Other);
        assert_eq!(LineKind::classify("\n"), LineKind::Other);
    }

    #[test]
    fn test_stale_answer_is_replaced() {
        let client = StubClient::new(&["4"]);
        let output = run(
            &client,
            None,
            "# Test\n- Q: What is 2+2?\n- A: stale answer\n",
        );
        assert_eq!(output, "# Test\n- Q: What is 2+2?\n- A: 4\n");
        assert_eq!(
            client.seen.borrow()[0],
            vec![ChatMessage::user("What is 2+2?")]
        );
    }

    #[test]
    fn test_history_accumulates() {
        let client = StubClient::new(&["A1", "A2", "A3"]);
        let output = run(&client, None, "- Q: Q1\n- Q: Q2\n- Q: Q3\n");
        assert_eq!(
            output,
            "- Q: Q1\n- A: A1\n- Q: Q2\n- A: A2\n- Q: Q3\n- A: A3\n"
        );

        let seen = client.seen.borrow();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[1].len(), 3);
        assert_eq!(
            seen[2],
            vec![
                ChatMessage::user("Q1"),
                ChatMessage::assistant("A1"),
                ChatMessage::user("Q2"),
                ChatMessage::assistant("A2"),
                ChatMessage::user("Q3"),
            ]
        );
    }

    #[test]
    fn test_system_message_seeds_history() {
        let client = StubClient::new(&["ok"]);
        run(&client, Some("Answer tersely."), "- Q: Ready?\n");
        let seen = client.seen.borrow();
        assert_eq!(seen[0][0].role, Role::System);
        assert_eq!(seen[0][0].content, "Answer tersely.");
        assert_eq!(seen[0][1], ChatMessage::user("Ready?"));
    }

    #[test]
    fn test_other_lines_pass_through_in_order() {
        let input = "# Suite\n\nSome notes.\r\n- A: orphan\n## Part 2\n- Q: Why?\n\n> quote\n";
        let client = StubClient::new(&["Because."]);
        let output = run(&client, None, input);
        assert_eq!(
            output,
            "# Suite\n\nSome notes.\r\n## Part 2\n- Q: Why?\n- A: Because.\n\n> quote\n"
        );
    }

    #[test]
    fn test_answer_is_stripped() {
        let client = StubClient::new(&["\n  Paris.  \n"]);
        let output = run(&client, None, "- Q: Capital of France?\n");
        assert_eq!(output, "- Q: Capital of France?\n- A: Paris.\n");
    }

    #[test]
    fn test_last_question_without_newline() {
        let client = StubClient::new(&["yes"]);
        let output = run(&client, None, "intro\n- Q: Last?");
        assert_eq!(output, "intro\n- Q: Last?\n- A: yes\n");
    }

    #[test]
    fn test_crlf_answer_matches_question() {
        let client = StubClient::new(&["4"]);
        let output = run(&client, None, "# T\r\n- Q: x\r\n- A: old\r\nnote\n");
        assert_eq!(output, "# T\r\n- Q: x\r\n- A: 4\r\nnote\n");
    }

    #[test]
    fn test_rerun_on_output_is_stable() {
        let input = "# T\n- Q: one\n- A: old\nnote\n- Q: two\n";
        let first = run(&StubClient::new(&["1", "2"]), None, input);
        let second = run(&StubClient::new(&["1", "2"]), None, &first);
        assert_eq!(first, "# T\n- Q: one\n- A: 1\nnote\n- Q: two\n- A: 2\n");
        assert_eq!(second, first);
    }

    #[test]
    fn test_failure_keeps_earlier_output() {
        let client = StubClient::new(&["first"]);
        let mut output = Vec::new();
        let result = rewrite(
            &client,
            &RequestOptions::default(),
            None,
            Cursor::new("- Q: a\n- Q: b\nafter\n"),
            &mut output,
        );
        assert!(matches!(result, Err(TesterError::EmptyResponse)));
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "- Q: a\n- A: first\n- Q: b\n"
        );
    }
}
