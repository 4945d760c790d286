//! Line readers used by the prompt chain.

use crate::types::CompletionFn;
use phage_core::{AppError, AppResult};
use rustyline::completion::Completer;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use std::collections::VecDeque;

/// Source of operator answers.
pub trait LineReader {
    /// Show informational text (descriptions, validation messages).
    fn show(&mut self, text: &str);

    /// Read one line after displaying `prompt`.
    ///
    /// `completer` drives suggestions while the operator types; it never
    /// validates. Returns `Ok(None)` when the operator cancels.
    fn read_line(
        &mut self,
        prompt: &str,
        completer: Option<CompletionFn>,
    ) -> AppResult<Option<String>>;
}

/// Tab completion backed by the current question's completer.
struct CompletionHelper {
    completer: Option<CompletionFn>,
}

impl Completer for CompletionHelper {
    type Candidate = String;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<String>)> {
        let Some(completer) = &self.completer else {
            return Ok((0, Vec::new()));
        };

        let partial = line.get(..pos).unwrap_or(line);
        let candidates = completer(partial)
            .into_iter()
            .filter(|c| !c.is_empty())
            .collect();

        // Candidates replace the whole line
        Ok((0, candidates))
    }
}

impl Hinter for CompletionHelper {
    type Hint = String;
}

impl Highlighter for CompletionHelper {}

impl Validator for CompletionHelper {}

impl Helper for CompletionHelper {}

/// Interactive terminal reader with line editing and tab completion.
///
/// Ctrl-C and Ctrl-D cancel the chain.
pub struct TerminalReader {
    editor: Editor<CompletionHelper, DefaultHistory>,
}

impl TerminalReader {
    pub fn new() -> AppResult<Self> {
        let editor = Editor::new()
            .map_err(|e| AppError::Prompt(format!("Failed to open terminal: {}", e)))?;
        Ok(Self { editor })
    }
}

impl LineReader for TerminalReader {
    fn show(&mut self, text: &str) {
        println!("{}", text);
    }

    fn read_line(
        &mut self,
        prompt: &str,
        completer: Option<CompletionFn>,
    ) -> AppResult<Option<String>> {
        self.editor.set_helper(Some(CompletionHelper { completer }));

        match self.editor.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(AppError::Prompt(format!("Failed to read input: {}", e))),
        }
    }
}

/// Replays queued answers; running out of answers counts as cancelling.
///
/// Everything shown is recorded so callers can inspect the exchange.
#[derive(Debug, Default)]
pub struct ScriptedReader {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedReader {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Text and prompts shown so far, in order.
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl LineReader for ScriptedReader {
    fn show(&mut self, text: &str) {
        self.transcript.push(text.to_string());
    }

    fn read_line(
        &mut self,
        prompt: &str,
        _completer: Option<CompletionFn>,
    ) -> AppResult<Option<String>> {
        self.transcript.push(prompt.to_string());
        Ok(self.answers.pop_front())
    }
}
