//! Prompt file tooling for Scour.
//!
//! Prompt files carry their run parameters in a delimited header — a block
//! opened and closed by a line containing exactly `---`, with `key: value`
//! lines inside, followed by the free-text prompt body:
//!
//! ```text
//! ---
//! model: gpt-4o-mini
//! temperature: 0.7
//! ---
//! Translate the following text to English:
//! {source_text}
//! ```
//!
//! Output records mirror the same format so a run's parameters travel with
//! its result. Templates substitute `{variable}` placeholders in the body.

pub mod file;
pub mod template;

pub use file::{OutputRecord, PromptFile, PromptMetadata};
pub use template::PromptTemplate;
