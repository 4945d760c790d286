//! Project command handler.
//!
//! Groups function configs into named projects and deploys them.

use clap::{Args, Subcommand};
use phage_core::{AppError, AppResult, AppSettings};
use phage_deploy::{create_deployer, deploy_projects, DeployOptions, DeployReport};
use phage_model::{FunctionConfig, Project, ProjectStore};
use std::time::Duration;

use super::load_current_config;

/// Manage and deploy projects
#[derive(Args, Debug)]
pub struct ProjectCommand {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand, Debug)]
pub enum ProjectAction {
    /// Create a project, adding the current function if there is one
    Create(ProjectCreateCommand),
    /// Add the current function to a project
    Add(ProjectAddCommand),
    /// Deploy every function in one or more projects
    Deploy(ProjectDeployCommand),
    /// List known projects
    List(ProjectListCommand),
}

impl ProjectCommand {
    pub async fn execute(&self, settings: &AppSettings) -> AppResult<()> {
        match &self.action {
            ProjectAction::Create(cmd) => cmd.execute(settings).await,
            ProjectAction::Add(cmd) => cmd.execute(settings).await,
            ProjectAction::Deploy(cmd) => cmd.execute(settings).await,
            ProjectAction::List(cmd) => cmd.execute(settings).await,
        }
    }
}

/// Load-or-create `name` and attach `current` to it, saving both.
///
/// The config records the project name before the manifest copies it, so
/// the stored entry and the file agree.
pub fn attach_function(
    store: &ProjectStore,
    name: &str,
    current: Option<&mut FunctionConfig>,
) -> AppResult<Project> {
    let mut project = store
        .get_project(name)
        .map_err(|e| AppError::Project(format!("Error creating or opening project:\n{}", e)))?;

    if let Some(config) = current.filter(|c| c.name().is_some()) {
        config.add_project(name);
        config
            .save()
            .map_err(|e| AppError::Project(format!("Error updating config with project:\n{}", e)))?;
        project.add_function(config);
    }

    store
        .save(&mut project)
        .map_err(|e| AppError::Project(format!("Error saving project:\n{}", e)))?;

    Ok(project)
}

/// Create a project
#[derive(Args, Debug)]
pub struct ProjectCreateCommand {
    /// Project name
    pub name: String,
}

impl ProjectCreateCommand {
    pub async fn execute(&self, settings: &AppSettings) -> AppResult<()> {
        tracing::info!("Executing project create command for '{}'", self.name);

        let mut current = match load_current_config(settings) {
            Ok(current) => current,
            Err(e) => {
                println!("Error reading function config:\n{}", e);
                return Ok(());
            }
        };

        let store = ProjectStore::new(&settings.home);
        match attach_function(&store, &self.name, current.as_mut()) {
            Ok(_) => println!("created project {}", self.name),
            Err(e) => println!("{}", e),
        }

        Ok(())
    }
}

/// Add the current function to a project
#[derive(Args, Debug)]
pub struct ProjectAddCommand {
    /// Project name
    pub project: String,
}

impl ProjectAddCommand {
    pub async fn execute(&self, settings: &AppSettings) -> AppResult<()> {
        tracing::info!("Executing project add command for '{}'", self.project);

        let current = match load_current_config(settings) {
            Ok(current) => current,
            Err(e) => {
                println!("Error reading function config:\n{}", e);
                return Ok(());
            }
        };

        let Some(mut config) = current.filter(|c| c.name().is_some()) else {
            println!("No function configuration found! Please run `lambda-phage init` first!");
            return Ok(());
        };

        let function = config.name().unwrap_or_default().to_string();
        let store = ProjectStore::new(&settings.home);
        match attach_function(&store, &self.project, Some(&mut config)) {
            Ok(_) => println!("added {} to project {}", function, self.project),
            Err(e) => println!("{}", e),
        }

        Ok(())
    }
}

/// Deploy projects
#[derive(Args, Debug)]
pub struct ProjectDeployCommand {
    /// Projects to deploy
    #[arg(required = true)]
    pub names: Vec<String>,

    /// Only deploy functions whose name matches this regex
    #[arg(short, long, default_value = "")]
    pub filter: String,

    /// Show what would deploy without deploying
    #[arg(long)]
    pub dry_run: bool,
}

impl ProjectDeployCommand {
    pub async fn execute(&self, settings: &AppSettings) -> AppResult<()> {
        tracing::info!("Executing project deploy command for {:?}", self.names);

        let deployer = match create_deployer(
            &settings.provider,
            &settings.endpoint,
            Duration::from_secs(settings.timeout_secs),
        ) {
            Ok(deployer) => deployer,
            Err(e) => {
                println!("Error setting up deployment:\n{}", e);
                return Ok(());
            }
        };

        let options = DeployOptions {
            filter: self.filter.clone(),
            dry_run: self.dry_run,
        };

        let store = ProjectStore::new(&settings.home);
        let report = deploy_projects(&store, deployer.as_ref(), &self.names, &options).await?;

        print_report(&report, self.dry_run);
        Ok(())
    }
}

fn print_report(report: &DeployReport, dry_run: bool) {
    for project in &report.projects {
        println!("{}", project);
    }

    for function in &report.functions {
        println!("{}", function);
    }

    println!("\n{}", report_summary(report, dry_run));
}

/// Closing lines of a deploy run: counts, then overall status.
fn report_summary(report: &DeployReport, dry_run: bool) -> String {
    let mut summary = if dry_run {
        format!(
            "{} function(s) would deploy, {} failed",
            report.would_deploy(),
            report.failed()
        )
    } else {
        format!(
            "{} function(s) deployed, {} failed",
            report.deployed(),
            report.failed()
        )
    };

    if report.project_errors() > 0 {
        summary.push_str(&format!(
            "\n{} project(s) could not be loaded",
            report.project_errors()
        ));
    }

    if report.is_success() {
        summary.push_str("\nAll done");
    } else {
        summary.push_str("\nFinished with errors; see above");
    }

    summary
}

/// List projects
#[derive(Args, Debug)]
pub struct ProjectListCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProjectListCommand {
    pub async fn execute(&self, settings: &AppSettings) -> AppResult<()> {
        tracing::info!("Executing project list command");

        let names = ProjectStore::new(&settings.home).list_projects()?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&names)?);
        } else if names.is_empty() {
            println!("No projects yet; create one with `lambda-phage project create <name>`");
        } else {
            for name in names {
                println!("{}", name);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn saved_config(dir: &TempDir, name: &str) -> FunctionConfig {
        let mut config = FunctionConfig::default();
        config.name = Some(name.to_string());
        config.runtime = Some("nodejs".to_string());
        config.save_to(dir.path().join(name).join("l-p.yml")).unwrap();
        config
    }

    #[test]
    fn test_create_without_config() {
        let home = TempDir::new().unwrap();
        let store = ProjectStore::new(home.path());

        let project = attach_function(&store, "empty", None).unwrap();

        assert!(project.is_empty());
        assert!(project.from_file());
        assert!(store.project_path("empty").exists());
    }

    #[test]
    fn test_attach_records_both_sides() {
        let home = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let store = ProjectStore::new(home.path());
        let mut config = saved_config(&work, "thumbs");

        attach_function(&store, "web", Some(&mut config)).unwrap();

        let reloaded = FunctionConfig::load(config.path()).unwrap();
        assert_eq!(reloaded.projects, vec!["web".to_string()]);

        let project = store.get_project("web").unwrap();
        let entry = &project.functions["thumbs"];
        assert_eq!(entry.path, config.path());
        assert_eq!(entry.config.projects, vec!["web".to_string()]);
    }

    #[test]
    fn test_attach_twice_keeps_one_entry() {
        let home = TempDir::new().unwrap();
        let work = TempDir::new().unwrap();
        let store = ProjectStore::new(home.path());
        let mut first = saved_config(&work, "thumbs");
        let mut second = saved_config(&work, "resize");

        attach_function(&store, "web", Some(&mut first)).unwrap();
        attach_function(&store, "web", Some(&mut second)).unwrap();
        attach_function(&store, "web", Some(&mut first)).unwrap();

        let project = store.get_project("web").unwrap();
        assert_eq!(project.functions.len(), 2);
        assert_eq!(first.projects, vec!["web".to_string()]);
    }

    #[test]
    fn test_unnamed_config_is_not_attached() {
        let home = TempDir::new().unwrap();
        let store = ProjectStore::new(home.path());
        let mut config = FunctionConfig::new(home.path().join("l-p.yml"));

        let project = attach_function(&store, "web", Some(&mut config)).unwrap();

        assert!(project.is_empty());
        assert!(config.projects.is_empty());
    }

    #[test]
    fn test_report_summary_status() {
        use phage_deploy::{FunctionOutcome, FunctionStatus, ProjectOutcome, ProjectStatus};

        let mut report = DeployReport::default();
        report.functions.push(FunctionOutcome {
            project: "web".to_string(),
            function: "thumbs".to_string(),
            status: FunctionStatus::WouldDeploy,
        });

        let summary = report_summary(&report, true);
        assert!(summary.starts_with("1 function(s) would deploy, 0 failed"));
        assert!(summary.ends_with("All done"));

        report.projects.push(ProjectOutcome {
            project: "broken".to_string(),
            status: ProjectStatus::Failed("bad yaml".to_string()),
        });
        report.functions.push(FunctionOutcome {
            project: "web".to_string(),
            function: "resize".to_string(),
            status: FunctionStatus::DeployFailed("500".to_string()),
        });

        let summary = report_summary(&report, false);
        assert!(summary.starts_with("0 function(s) deployed, 1 failed"));
        assert!(summary.contains("1 project(s) could not be loaded"));
        assert!(summary.ends_with("Finished with errors; see above"));
    }

    #[test]
    fn test_bad_project_name() {
        let home = TempDir::new().unwrap();
        let store = ProjectStore::new(home.path());

        let err = attach_function(&store, "../escape", None).unwrap_err();
        assert!(err.to_string().contains("Error creating or opening project"));
    }
}
