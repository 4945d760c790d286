//! Prompt types.
//!
//! A question writes into a [`FunctionConfig`] through a [`Target`], a tagged
//! variant naming the field (or a custom handler), so specs do not hold
//! references into any particular config.

use phage_core::{AppError, AppResult};
use phage_model::FunctionConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Suggests completions for partial input.
pub type CompletionFn = Arc<dyn Fn(&str) -> Vec<String> + Send + Sync>;

/// Free-form handler that parses the raw answer itself.
pub type HandlerFn = Arc<dyn Fn(&mut FunctionConfig, &str) -> AppResult<()> + Send + Sync>;

/// String fields of a function config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TextField {
    Name,
    Description,
    Archive,
    Runtime,
    EntryPoint,
    S3Bucket,
    S3Key,
    S3Region,
}

/// Integer fields of a function config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntField {
    MemorySize,
    Timeout,
}

/// String-set fields of a function config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SetField {
    Regions,
}

impl TextField {
    fn slot<'a>(&self, config: &'a mut FunctionConfig) -> &'a mut Option<String> {
        match self {
            TextField::Name => &mut config.name,
            TextField::Description => &mut config.description,
            TextField::Archive => &mut config.archive,
            TextField::Runtime => &mut config.runtime,
            TextField::EntryPoint => &mut config.entry_point,
            TextField::S3Bucket => &mut config.location.s3_bucket,
            TextField::S3Key => &mut config.location.s3_key,
            TextField::S3Region => &mut config.location.s3_region,
        }
    }
}

impl IntField {
    fn slot<'a>(&self, config: &'a mut FunctionConfig) -> &'a mut Option<u32> {
        match self {
            IntField::MemorySize => &mut config.memory_size,
            IntField::Timeout => &mut config.timeout,
        }
    }
}

/// Where an answer is stored.
#[derive(Clone)]
pub enum Target {
    Text(TextField),
    Integer(IntField),
    Set(SetField),
    Custom(HandlerFn),
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Text(field) => f.debug_tuple("Text").field(field).finish(),
            Target::Integer(field) => f.debug_tuple("Integer").field(field).finish(),
            Target::Set(field) => f.debug_tuple("Set").field(field).finish(),
            Target::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Target {
    /// Store `value` in `config`.
    ///
    /// Returns `AppError::Prompt` for answers that do not coerce; the chain
    /// treats those as recoverable and asks again.
    pub fn apply(&self, config: &mut FunctionConfig, value: &str) -> AppResult<()> {
        match self {
            Target::Text(field) => {
                *field.slot(config) = Some(value.to_string());
            }
            Target::Integer(field) => {
                let parsed = value.trim().parse::<u32>().map_err(|_| {
                    AppError::Prompt(format!("'{}' is not a whole number, try again", value))
                })?;
                *field.slot(config) = Some(parsed);
            }
            Target::Set(SetField::Regions) => config.add_regions(value),
            Target::Custom(handler) => handler(config, value)?,
        }
        Ok(())
    }
}

/// One interactive question.
#[derive(Clone)]
pub struct PromptSpec {
    pub target: Target,

    /// Short prompt shown on the input line
    pub text: String,

    /// Longer explanation shown before the prompt
    pub description: Option<String>,

    /// Used when the operator enters nothing
    pub default: Option<String>,

    /// Re-ask until a value (or default) is given
    pub required: bool,

    pub completer: Option<CompletionFn>,
}

impl fmt::Debug for PromptSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptSpec")
            .field("target", &self.target)
            .field("text", &self.text)
            .field("description", &self.description)
            .field("default", &self.default)
            .field("required", &self.required)
            .field("completer", &self.completer.is_some())
            .finish()
    }
}

impl PromptSpec {
    pub fn new(target: Target, text: impl Into<String>) -> Self {
        Self {
            target,
            text: text.into(),
            description: None,
            default: None,
            required: false,
            completer: None,
        }
    }

    /// Input line shown to the operator, including the default.
    pub fn prompt_line(&self) -> String {
        match self.default.as_deref().filter(|d| !d.is_empty()) {
            Some(default) => format!("{} [{}]: ", self.text, default),
            None => format!("{}: ", self.text),
        }
    }

    /// Value for raw input: the trimmed input, else the default, else none.
    pub fn resolve(&self, input: &str) -> Option<String> {
        let input = input.trim();
        if !input.is_empty() {
            return Some(input.to_string());
        }

        self.default
            .as_deref()
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }

    /// Completion suggestions for partial input, empties removed.
    pub fn complete(&self, partial: &str) -> Vec<String> {
        match &self.completer {
            Some(completer) => completer(partial)
                .into_iter()
                .filter(|s| !s.is_empty())
                .collect(),
            None => Vec::new(),
        }
    }

    /// A required spec with no default and no completer may never be
    /// satisfied; only cancelling gets the operator out.
    pub fn may_block(&self) -> bool {
        self.required && self.resolve("").is_none() && self.completer.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_target() {
        let mut config = FunctionConfig::default();
        Target::Text(TextField::S3Bucket)
            .apply(&mut config, "code-bucket")
            .unwrap();
        assert_eq!(config.location.s3_bucket.as_deref(), Some("code-bucket"));
    }

    #[test]
    fn test_integer_target() {
        let mut config = FunctionConfig::default();
        Target::Integer(IntField::Timeout)
            .apply(&mut config, " 30 ")
            .unwrap();
        assert_eq!(config.timeout, Some(30));

        let err = Target::Integer(IntField::MemorySize)
            .apply(&mut config, "lots")
            .unwrap_err();
        assert!(matches!(err, AppError::Prompt(_)));
        assert_eq!(config.memory_size, None);
    }

    #[test]
    fn test_set_target_merges() {
        let mut config = FunctionConfig::default();
        let target = Target::Set(SetField::Regions);
        target.apply(&mut config, "us-east-1,eu-west-1").unwrap();
        target.apply(&mut config, "us-east-1").unwrap();
        assert_eq!(config.regions.len(), 2);
    }

    #[test]
    fn test_custom_target() {
        let handler: HandlerFn = Arc::new(|config: &mut FunctionConfig, value: &str| {
            config.description = Some(value.to_uppercase());
            Ok(())
        });
        let mut config = FunctionConfig::default();
        Target::Custom(handler).apply(&mut config, "loud").unwrap();
        assert_eq!(config.description.as_deref(), Some("LOUD"));
    }

    #[test]
    fn test_resolve_and_prompt_line() {
        let mut spec = PromptSpec::new(Target::Integer(IntField::Timeout), "Enter timeout");
        assert_eq!(spec.prompt_line(), "Enter timeout: ");
        assert_eq!(spec.resolve("  "), None);

        spec.default = Some("5".to_string());
        assert_eq!(spec.prompt_line(), "Enter timeout [5]: ");
        assert_eq!(spec.resolve(""), Some("5".to_string()));
        assert_eq!(spec.resolve(" 9 "), Some("9".to_string()));
    }

    #[test]
    fn test_complete_drops_empty() {
        let mut spec = PromptSpec::new(Target::Text(TextField::Runtime), "Runtime");
        assert!(spec.complete("n").is_empty());

        spec.completer = Some(Arc::new(|partial: &str| {
            vec![if partial.starts_with('n') { "nodejs" } else { "" }.to_string()]
        }));
        assert_eq!(spec.complete("n"), vec!["nodejs".to_string()]);
        assert!(spec.complete("").is_empty());
    }

    #[test]
    fn test_may_block() {
        let mut spec = PromptSpec::new(Target::Text(TextField::Name), "Name");
        assert!(!spec.may_block());
        spec.required = true;
        assert!(spec.may_block());
        spec.default = Some("fn".to_string());
        assert!(!spec.may_block());
    }

    #[test]
    fn test_field_serialization() {
        let json = serde_json::to_string(&TextField::EntryPoint).unwrap();
        assert_eq!(json, "\"entryPoint\"");
    }
}
