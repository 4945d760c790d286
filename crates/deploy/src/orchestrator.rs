//! Project deployment.
//!
//! Each requested project is handled independently, and each function in a
//! project on its own: a broken function or an unreadable project is
//! recorded in the [`DeployReport`] while the rest of the batch continues.
//! Only an invalid filter stops the command, before anything is deployed.

use crate::client::{DeployContext, DeployReceipt, Deployer};
use phage_core::AppResult;
use phage_model::{FunctionConfig, Project, ProjectStore};
use regex::Regex;
use std::fmt;

/// Options for [`deploy_projects`].
#[derive(Debug, Clone, Default)]
pub struct DeployOptions {
    /// Regex over function names; empty matches everything
    pub filter: String,

    /// Report what would deploy without calling the deployer
    pub dry_run: bool,
}

/// What happened to a requested project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectStatus {
    /// Manifest loaded and its functions processed
    Processed,
    /// No manifest exists; nothing was deployed
    NotFound,
    /// Manifest could not be read or parsed
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectOutcome {
    pub project: String,
    pub status: ProjectStatus,
}

/// What happened to one function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionStatus {
    Deployed(DeployReceipt),
    WouldDeploy,
    /// The config behind the manifest entry could not be reloaded
    LoadFailed(String),
    DeployFailed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionOutcome {
    pub project: String,
    pub function: String,
    pub status: FunctionStatus,
}

/// Itemized result of a deploy run.
///
/// Functions skipped by the filter do not appear.
#[derive(Debug, Clone, Default)]
pub struct DeployReport {
    pub projects: Vec<ProjectOutcome>,
    pub functions: Vec<FunctionOutcome>,
}

impl DeployReport {
    fn count(&self, pred: impl Fn(&FunctionStatus) -> bool) -> usize {
        self.functions.iter().filter(|f| pred(&f.status)).count()
    }

    pub fn deployed(&self) -> usize {
        self.count(|s| matches!(s, FunctionStatus::Deployed(_)))
    }

    pub fn would_deploy(&self) -> usize {
        self.count(|s| matches!(s, FunctionStatus::WouldDeploy))
    }

    /// Functions that failed to load or deploy.
    pub fn failed(&self) -> usize {
        self.count(|s| {
            matches!(
                s,
                FunctionStatus::LoadFailed(_) | FunctionStatus::DeployFailed(_)
            )
        })
    }

    /// Projects whose manifest could not be loaded.
    pub fn project_errors(&self) -> usize {
        self.projects
            .iter()
            .filter(|p| matches!(p.status, ProjectStatus::Failed(_)))
            .count()
    }

    /// True when no project or function failed.
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.project_errors() == 0
    }
}

impl fmt::Display for ProjectOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            ProjectStatus::Processed => write!(f, "Processed project {}", self.project),
            ProjectStatus::NotFound => {
                write!(f, "Skipped project {}: no such project", self.project)
            }
            ProjectStatus::Failed(e) => {
                write!(f, "Error loading project {}:\n{}", self.project, e)
            }
        }
    }
}

impl fmt::Display for FunctionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.status {
            FunctionStatus::Deployed(receipt) if receipt.regions.is_empty() => write!(
                f,
                "Deployed function {} in project {}",
                self.function, self.project
            ),
            FunctionStatus::Deployed(receipt) => write!(
                f,
                "Deployed function {} in project {} to {}",
                self.function,
                self.project,
                receipt.regions.join(", ")
            ),
            FunctionStatus::WouldDeploy => write!(
                f,
                "Would deploy function {} in project {}",
                self.function, self.project
            ),
            FunctionStatus::LoadFailed(e) => write!(
                f,
                "Error loading config for function {} in project {}:\n{}",
                self.function, self.project, e
            ),
            FunctionStatus::DeployFailed(e) => write!(
                f,
                "Deploy failed for function {} in project {}:\n{}",
                self.function, self.project, e
            ),
        }
    }
}

/// Deploy every function of the named projects that matches the filter.
///
/// Returns an error only when the filter does not compile; every other
/// failure is itemized in the report.
pub async fn deploy_projects(
    store: &ProjectStore,
    deployer: &dyn Deployer,
    names: &[String],
    options: &DeployOptions,
) -> AppResult<DeployReport> {
    let filter = Regex::new(&options.filter)?;
    let mut report = DeployReport::default();

    tracing::info!(
        "Deploying {} project(s) via {} (filter {:?}, dry run {})",
        names.len(),
        deployer.provider_name(),
        options.filter,
        options.dry_run
    );

    for name in names {
        let project = match store.get_project(name) {
            Ok(project) => project,
            Err(e) => {
                tracing::warn!("Failed to load project {}: {}", name, e);
                report.projects.push(ProjectOutcome {
                    project: name.clone(),
                    status: ProjectStatus::Failed(e.to_string()),
                });
                continue;
            }
        };

        if !project.from_file() {
            tracing::info!("Skipped project {} because it wasn't found", name);
            report.projects.push(ProjectOutcome {
                project: name.clone(),
                status: ProjectStatus::NotFound,
            });
            continue;
        }

        deploy_project(&project, deployer, &filter, options.dry_run, &mut report).await;
        report.projects.push(ProjectOutcome {
            project: name.clone(),
            status: ProjectStatus::Processed,
        });
    }

    Ok(report)
}

async fn deploy_project(
    project: &Project,
    deployer: &dyn Deployer,
    filter: &Regex,
    dry_run: bool,
    report: &mut DeployReport,
) {
    let outcome = |function: &str, status| FunctionOutcome {
        project: project.name().to_string(),
        function: function.to_string(),
        status,
    };

    for (key, function) in &project.functions {
        // The manifest's copy may be stale; deploy what is on disk now.
        let config = match FunctionConfig::load(&function.path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Failed to reload config for {} from {:?}: {}", key, function.path, e);
                report
                    .functions
                    .push(outcome(key, FunctionStatus::LoadFailed(e.to_string())));
                continue;
            }
        };

        let Some(name) = config.name() else {
            report.functions.push(outcome(
                key,
                FunctionStatus::LoadFailed(format!(
                    "config at {} has no function name",
                    function.path.display()
                )),
            ));
            continue;
        };

        if !filter.is_match(name) {
            tracing::debug!("Function {} does not match filter, skipping", name);
            continue;
        }

        if dry_run {
            report.functions.push(outcome(name, FunctionStatus::WouldDeploy));
            continue;
        }

        let context = DeployContext {
            project: project.name().to_string(),
            config_path: function.path.clone(),
        };

        let status = match deployer.deploy(&config, &context).await {
            Ok(receipt) => FunctionStatus::Deployed(receipt),
            Err(e) => {
                tracing::warn!("Deploy of {} in project {} failed: {}", name, project.name(), e);
                FunctionStatus::DeployFailed(e.to_string())
            }
        };
        report.functions.push(outcome(name, status));
    }
}
