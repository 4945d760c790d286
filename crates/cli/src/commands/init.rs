//! Init command handler.
//!
//! Walks the operator through a function config and writes it to the
//! config file, keeping any values an existing file already has.

use clap::Args;
use phage_core::{AppError, AppResult, AppSettings};
use phage_deploy::{create_role_lister, role_map, IamRoleEntry};
use phage_model::FunctionConfig;
use phage_prompt::{IntField, PromptChain, SetField, TerminalReader, TextField};
use std::collections::HashMap;
use std::time::Duration;

use super::{config_path, load_current_config};

const WELCOME: &str = r#"
  HELLO AND WELCOME

  This command will help you set up your code for deployment!

  But we need some information from you, like what you want to name
  your function and a few other things!

  Please answer the prompts as they appear below (Ctrl-C cancels):
"#;

const ROLE_DESCRIPTION: &str = "
Every function runs with an IAM role, which gives it access to other
resources. What role do you want to assign this function?
Type a name and press tab to auto-complete it.
";

/// Initialize a function config for the current directory
#[derive(Args, Debug)]
pub struct InitCommand {
    /// Do not look up IAM roles for completion
    #[arg(long)]
    pub no_roles: bool,
}

impl InitCommand {
    pub async fn execute(&self, settings: &AppSettings) -> AppResult<()> {
        tracing::info!("Executing init command");

        let path = config_path(settings)?;
        let existing = match load_current_config(settings) {
            Ok(existing) => existing,
            Err(e) => {
                println!("Error reading existing config {}:\n{}", path.display(), e);
                return Ok(());
            }
        };

        let roles = if self.no_roles {
            Vec::new()
        } else {
            create_role_lister(
                &settings.provider,
                &settings.endpoint,
                Duration::from_secs(settings.timeout_secs),
            )
            .list_roles()
            .await
        };

        println!("{}", WELCOME);

        let chain = init_prompts(&current_dir_name(), &roles);
        let mut answers = FunctionConfig::default();
        let mut reader = TerminalReader::new()?;

        match chain.run(&mut answers, &mut reader) {
            Ok(()) => {}
            Err(AppError::Cancelled) => {
                println!("Setup cancelled; nothing was saved");
                return Ok(());
            }
            Err(e) => {
                println!("Setup failed:\n{}", e);
                return Ok(());
            }
        }

        let mut config = match existing {
            Some(mut existing) => {
                existing.merge(&answers);
                existing
            }
            None => answers,
        };

        if let Err(e) = config.save_to(&path) {
            println!("Error saving config to {}:\n{}", path.display(), e);
            return Ok(());
        }

        println!("Setup complete; saved config to {}", path.display());
        Ok(())
    }
}

fn current_dir_name() -> String {
    std::env::current_dir()
        .ok()
        .and_then(|dir| dir.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "function".to_string())
}

/// Runtime suggestion keyed on the first character typed.
pub fn runtime_completions(partial: &str) -> Vec<String> {
    let runtime = match partial.chars().next() {
        Some('n') => "nodejs",
        Some('j') => "java8",
        Some('p') => "python2.7",
        _ => return Vec::new(),
    };
    vec![runtime.to_string()]
}

/// Store a role answer: ARNs as given, known names as their ARN, anything
/// else as a literal role name.
pub fn resolve_role(config: &mut FunctionConfig, value: &str, roles: &HashMap<String, String>) {
    if value.starts_with("arn:aws:iam::") {
        config.iam_role.set_arn(value);
    } else if let Some(arn) = roles.get(value) {
        config.iam_role.set_arn(arn.clone());
    } else {
        config.iam_role.set_name(value);
    }
}

/// Questions asked by `init`.
pub fn init_prompts(dir_name: &str, roles: &[IamRoleEntry]) -> PromptChain {
    let role_names: Vec<String> = roles.iter().map(|r| r.name.clone()).collect();
    let roles_by_name = role_map(roles);

    let mut chain = PromptChain::new();
    chain
        .add()
        .string(TextField::Name)
        .required()
        .text("Enter a function name")
        .default(dir_name)
        .done()
        .add()
        .string(TextField::Description)
        .text("Enter a function description if you'd like")
        .done()
        .add()
        .string(TextField::Archive)
        .text("Enter an archive name if you'd like")
        .default(format!("{}.zip", dir_name))
        .done()
        .add()
        .string(TextField::Runtime)
        .required()
        .text("What runtime are you using: nodejs, java8, or python2.7?")
        .default("nodejs")
        .completer(runtime_completions)
        .done()
        .add()
        .string(TextField::EntryPoint)
        .required()
        .text("Enter an entry point or handler name")
        .default("index.handler")
        .done()
        .add()
        .int(IntField::MemorySize)
        .text("Enter memory size")
        .default("128")
        .done()
        .add()
        .int(IntField::Timeout)
        .text("Enter timeout")
        .default("5")
        .done()
        .add()
        .string_set(SetField::Regions)
        .text("Enter regions where this function will run")
        .default("us-east-1")
        .done()
        .add()
        .custom(move |config, value| {
            resolve_role(config, value, &roles_by_name);
            Ok(())
        })
        .required()
        .text("IAM Role")
        .description(ROLE_DESCRIPTION)
        .completer(move |partial| {
            role_names
                .iter()
                .filter(|name| name.starts_with(partial))
                .cloned()
                .collect()
        })
        .done()
        .add()
        .string(TextField::S3Bucket)
        .text("S3 bucket you want to upload your code to (if any)")
        .done()
        .add()
        .string(TextField::S3Key)
        .text("S3 folder your code should be stored inside (if any)")
        .done()
        .add()
        .string(TextField::S3Region)
        .text("S3 region where your bucket is (if any)")
        .done();

    chain
}
