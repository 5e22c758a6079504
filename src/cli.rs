use std::path::PathBuf;

use clap::{command, Parser};

/// Model id used when none is given.
pub const DEFAULT_MODEL: &str = "local-model";
/// Transcript read when no test file is given.
pub const DEFAULT_INPUT: &str = "LLM Test.md";
/// Transcript written when no result file is given.
pub const DEFAULT_OUTPUT: &str = "LLM TestResult.md";
/// Endpoint used when neither a base URL nor `OPENAI_BASE_URL` is given.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Bounds shared by `frequency_penalty` and `presence_penalty`.
pub const PENALTY_RANGE: (f64, f64) = (-2.0, 2.0);
/// Bounds for `temperature`.
pub const TEMPERATURE_RANGE: (f64, f64) = (0.0, 2.0);

/// CLI for `llm-tester`
///
/// Any value not passed as a flag is asked for interactively, unless
/// `--batch` is set, in which case defaults are used.
#[derive(Debug, Default, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Never prompt; unset values fall back to their defaults.
    #[arg(long)]
    pub batch: bool,
    /// API key (falls back to `OPENAI_API_KEY`).
    #[arg(long)]
    pub api_key: Option<String>,
    /// Base URL of the chat completion API (falls back to `OPENAI_BASE_URL`).
    #[arg(long)]
    pub base_url: Option<String>,
    /// Result file to write.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
    /// Test file to read.
    #[arg(short, long)]
    pub input: Option<PathBuf>,
    /// System message seeding the conversation.
    #[arg(short, long)]
    pub system: Option<String>,
    /// ID of the model to use.
    #[arg(short, long)]
    pub model: Option<String>,
    /// Number between -2.0 and 2.0.
    #[arg(long, value_parser = parse_penalty, allow_negative_numbers = true)]
    pub frequency_penalty: Option<f64>,
    /// The maximum number of tokens that can be generated per answer.
    #[arg(long, allow_negative_numbers = true)]
    pub max_tokens: Option<i64>,
    /// Number between -2.0 and 2.0. Positive values favour new topics.
    #[arg(long, value_parser = parse_penalty, allow_negative_numbers = true)]
    pub presence_penalty: Option<f64>,
    /// Sampling temperature between 0 and 2.0.
    #[arg(long, value_parser = parse_temperature)]
    pub temperature: Option<f64>,
}

fn parse_bounded(s: &str, (min, max): (f64, f64)) -> Result<f64, String> {
    let value: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("{} is not a number", s))?;
    if (min..=max).contains(&value) {
        Ok(value)
    } else {
        Err(format!("{} is not between {} and {}", value, min, max))
    }
}

fn parse_penalty(s: &str) -> Result<f64, String> {
    parse_bounded(s, PENALTY_RANGE)
}

fn parse_temperature(s: &str) -> Result<f64, String> {
    parse_bounded(s, TEMPERATURE_RANGE)
}
