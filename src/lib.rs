//! # LLM tester (`llm-tester`)
//! Regression-test prompts and models against a chat completion API.
//!
//! Reads a Markdown question file, asks every question in order (each one sees the
//! questions and answers before it), and writes the file back out with a freshly
//! generated answer under each question.
//!
//! ## File format
//! - `- Q: <question>`: a question. Copied to the output and followed by `- A: <answer>`.
//! - `- A: <answer>`: an answer from an earlier run. Dropped and regenerated.
//! - Anything else (headings, notes, blank lines) is copied unchanged.
//!
//! Running the tool on its own output therefore regenerates the answers without
//! disturbing the rest of the file.
//!
//! ## Usage
//! ```shell
//! $ llm-tester --help
//! ```
//! Values not passed as flags are asked for interactively; `--batch` uses the
//! defaults instead.
//!
//! ## Environment Variables:
//! - `OPENAI_API_KEY`: Used when no API key is given.
//! - `OPENAI_BASE_URL`: Used when no base URL is given (default: `https://api.openai.com/v1`).
//! - `RUST_LOG`: Log filter, e.g. `RUST_LOG=debug` to see each request.
//!
pub mod cli;
pub mod errors;
pub mod openai;
pub mod options;
pub mod prompt;
pub mod transcript;
