//! Prompt chain assembly and execution.

use crate::reader::LineReader;
use crate::types::{CompletionFn, HandlerFn, IntField, PromptSpec, SetField, Target, TextField};
use phage_core::{AppError, AppResult};
use phage_model::FunctionConfig;
use std::sync::Arc;

/// An ordered list of questions, asked one at a time.
///
/// # Example
/// ```no_run
/// use phage_model::FunctionConfig;
/// use phage_prompt::{PromptChain, TerminalReader, TextField};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut chain = PromptChain::new();
/// chain
///     .add()
///     .string(TextField::Name)
///     .text("Enter a function name")
///     .required()
///     .done();
///
/// let mut config = FunctionConfig::default();
/// chain.run(&mut config, &mut TerminalReader::new()?)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromptChain {
    specs: Vec<PromptSpec>,
}

/// Builds one [`PromptSpec`] and appends it to the chain on [`done`].
///
/// [`done`]: QuestionBuilder::done
pub struct QuestionBuilder<'a> {
    chain: &'a mut PromptChain,
    target: Option<Target>,
    text: String,
    description: Option<String>,
    default: Option<String>,
    required: bool,
    completer: Option<CompletionFn>,
}

impl<'a> QuestionBuilder<'a> {
    /// Store the answer in a string field.
    pub fn string(mut self, field: TextField) -> Self {
        self.target = Some(Target::Text(field));
        self
    }

    /// Store the answer in an integer field.
    pub fn int(mut self, field: IntField) -> Self {
        self.target = Some(Target::Integer(field));
        self
    }

    /// Merge the answer into a string-set field.
    pub fn string_set(mut self, field: SetField) -> Self {
        self.target = Some(Target::Set(field));
        self
    }

    /// Hand the raw answer to `handler` instead of a field setter.
    pub fn custom<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut FunctionConfig, &str) -> AppResult<()> + Send + Sync + 'static,
    {
        let handler: HandlerFn = Arc::new(handler);
        self.target = Some(Target::Custom(handler));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn completer<F>(mut self, completer: F) -> Self
    where
        F: Fn(&str) -> Vec<String> + Send + Sync + 'static,
    {
        let completer: CompletionFn = Arc::new(completer);
        self.completer = Some(completer);
        self
    }

    /// Finish the question and return to the chain.
    ///
    /// A question without a target has nowhere to store its answer and is
    /// dropped.
    pub fn done(self) -> &'a mut PromptChain {
        let Some(target) = self.target else {
            tracing::warn!("Dropping question '{}': no target field", self.text);
            return self.chain;
        };

        self.chain.specs.push(PromptSpec {
            target,
            text: self.text,
            description: self.description,
            default: self.default,
            required: self.required,
            completer: self.completer,
        });

        self.chain
    }
}

impl PromptChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new question.
    pub fn add(&mut self) -> QuestionBuilder<'_> {
        QuestionBuilder {
            chain: self,
            target: None,
            text: String::new(),
            description: None,
            default: None,
            required: false,
            completer: None,
        }
    }

    pub fn specs(&self) -> &[PromptSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Ask every question in order, writing answers into `config`.
    ///
    /// Returns `AppError::Cancelled` if the operator aborts; `config` may
    /// then hold the answers given so far and should be discarded.
    pub fn run(&self, config: &mut FunctionConfig, reader: &mut dyn LineReader) -> AppResult<()> {
        for spec in self.specs.iter().filter(|s| s.may_block()) {
            tracing::warn!(
                "Question '{}' is required but has no default or completion",
                spec.text
            );
        }

        for spec in &self.specs {
            ask(spec, config, reader)?;
        }

        tracing::debug!("Prompt chain finished after {} questions", self.specs.len());
        Ok(())
    }
}

fn ask(spec: &PromptSpec, config: &mut FunctionConfig, reader: &mut dyn LineReader) -> AppResult<()> {
    if let Some(description) = &spec.description {
        reader.show(description);
    }

    let prompt = spec.prompt_line();

    loop {
        let Some(input) = reader.read_line(&prompt, spec.completer.clone())? else {
            tracing::info!("Prompt chain cancelled at '{}'", spec.text);
            return Err(AppError::Cancelled);
        };

        let value = match spec.resolve(&input) {
            Some(value) => value,
            None if spec.required => {
                reader.show("A value is required here (Ctrl-C to cancel).");
                continue;
            }
            None => return Ok(()),
        };

        match spec.target.apply(config, &value) {
            Ok(()) => return Ok(()),
            Err(AppError::Prompt(message)) => {
                tracing::debug!("Rejected answer for '{}': {}", spec.text, message);
                reader.show(&message);
            }
            Err(e) => return Err(e),
        }
    }
}
