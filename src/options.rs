//! Settings gathered once per run, from flags or by asking the operator.

use std::env;
use std::path::PathBuf;

use serde::Serialize;

use crate::cli::{
    Args, DEFAULT_BASE_URL, DEFAULT_INPUT, DEFAULT_MODEL, DEFAULT_OUTPUT, PENALTY_RANGE,
    TEMPERATURE_RANGE,
};
use crate::errors::TesterError;
use crate::prompt::{self, Prompter};

/// Generation options sent along with every request. Unset values are left
/// out of the request body entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequestOptions {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        RequestOptions {
            model: DEFAULT_MODEL.to_string(),
            frequency_penalty: None,
            max_tokens: None,
            presence_penalty: None,
            temperature: None,
        }
    }
}

/// Where and how to reach the chat completion API.
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub api_key: String,
    pub base_url: String,
}

/// Files and system message for a single run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPaths {
    pub input: PathBuf,
    pub output: PathBuf,
    pub system_message: Option<String>,
}

/// Everything the tester needs, asked for in the order the operator expects.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub connection: Connection,
    pub paths: RunPaths,
    pub options: RequestOptions,
}

impl Settings {
    /// Fill in every value missing from `args`, prompting unless `args.batch` is set.
    pub fn collect<P: Prompter + ?Sized>(
        args: &Args,
        prompter: &mut P,
    ) -> Result<Settings, TesterError> {
        let ask = !args.batch;

        let api_key = match &args.api_key {
            Some(key) => Some(key.clone()),
            None if ask => prompt::string_or_none(
                prompter,
                "please enter the API key (leave empty to load from environment variables):",
            )?,
            None => None,
        };
        let base_url = match &args.base_url {
            Some(url) => Some(url.clone()),
            None if ask => prompt::string_or_none(
                prompter,
                "please enter the baseUrl (leave empty to load from environment variables or to use OpenAI):",
            )?,
            None => None,
        };
        let output = match &args.output {
            Some(path) => path.clone(),
            None if ask => PathBuf::from(prompt::string_or_default(
                prompter,
                "what should the name (and path) of the result file be?",
                DEFAULT_OUTPUT,
            )?),
            None => PathBuf::from(DEFAULT_OUTPUT),
        };
        let input = match &args.input {
            Some(path) => path.clone(),
            None if ask => PathBuf::from(prompt::string_or_default(
                prompter,
                "what is the name (and path) of the test file?",
                DEFAULT_INPUT,
            )?),
            None => PathBuf::from(DEFAULT_INPUT),
        };
        let system_message = match &args.system {
            Some(system) if system.trim().is_empty() => None,
            Some(system) => Some(system.clone()),
            None if ask => prompt::string_or_none(
                prompter,
                "what should the System message be (empty for none)?",
            )?,
            None => None,
        };
        let options = RequestOptions::collect(args, prompter)?;

        Ok(Settings {
            connection: Connection::resolve(api_key, base_url)?,
            paths: RunPaths {
                input,
                output,
                system_message,
            },
            options,
        })
    }
}

impl Connection {
    /// Apply the environment fallbacks for values the operator left empty.
    pub fn resolve(
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Result<Connection, TesterError> {
        Connection::resolve_with(api_key, base_url, |name| env::var(name).ok())
    }

    /// Like [`Connection::resolve`], reading variables through `var`.
    /// Blank values count as unset.
    pub fn resolve_with(
        api_key: Option<String>,
        base_url: Option<String>,
        var: impl Fn(&str) -> Option<String>,
    ) -> Result<Connection, TesterError> {
        let non_empty_var = |name: &str| var(name).filter(|value| !value.trim().is_empty());
        let api_key = api_key
            .or_else(|| non_empty_var("OPENAI_API_KEY"))
            .ok_or(TesterError::MissingApiKey)?;
        let base_url = base_url
            .or_else(|| non_empty_var("OPENAI_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Ok(Connection { api_key, base_url })
    }
}

impl RequestOptions {
    /// Ask for each generation option not already given in `args`.
    pub fn collect<P: Prompter + ?Sized>(
        args: &Args,
        prompter: &mut P,
    ) -> Result<RequestOptions, TesterError> {
        let mut options = RequestOptions {
            model: args
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            frequency_penalty: args.frequency_penalty,
            max_tokens: args.max_tokens,
            presence_penalty: args.presence_penalty,
            temperature: args.temperature,
        };
        if args.batch {
            return Ok(options);
        }

        prompter.say(
            "please enter options that we will pass on with each request to the LLM (all are optional)",
        )?;
        if args.model.is_none() {
            options.model =
                prompt::string_or_default(prompter, "ID of the model to use:", DEFAULT_MODEL)?;
        }
        if options.frequency_penalty.is_none() {
            options.frequency_penalty = prompt::float_between(
                prompter,
                "frequency_penalty: Number between -2.0 and 2.0",
                PENALTY_RANGE.0,
                PENALTY_RANGE.1,
                true,
            )?;
        }
        if options.max_tokens.is_none() {
            options.max_tokens = prompt::int(
                prompter,
                "max_tokens: The maximum number of tokens that can be generated in the chat completion",
                true,
            )?;
        }
        if options.presence_penalty.is_none() {
            options.presence_penalty = prompt::float_between(
                prompter,
                "presence_penalty: Number between -2.0 and 2.0. Positive values penalize new tokens based on whether they appear in the text so far, increasing the model's likelihood to talk about new topics.",
                PENALTY_RANGE.0,
                PENALTY_RANGE.1,
                true,
            )?;
        }
        if options.temperature.is_none() {
            options.temperature = prompt::float_between(
                prompter,
                "temperature: What sampling temperature to use, between 0 and 2.0. Higher values like 0.8 will make the output more random, while lower values like 0.2 will make it more focused and deterministic.",
                TEMPERATURE_RANGE.0,
                TEMPERATURE_RANGE.1,
                true,
            )?;
        }
        Ok(options)
    }
}
