//! Interactive prompt chains for lambda-phage.
//!
//! This crate fills a [`phage_model::FunctionConfig`] one question at a time:
//! - [`PromptSpec`] describes a question and the field it writes
//! - [`PromptChain`] runs specs in order against a [`LineReader`]
//! - [`TerminalReader`] offers tab completion; [`ScriptedReader`] replays answers

pub mod builder;
pub mod reader;
pub mod types;

// Re-export main types
pub use builder::{PromptChain, QuestionBuilder};
pub use reader::{LineReader, ScriptedReader, TerminalReader};
pub use types::{CompletionFn, HandlerFn, IntField, PromptSpec, SetField, Target, TextField};
