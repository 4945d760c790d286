//! Deployment for lambda-phage.
//!
//! The function-execution service sits behind the [`Deployer`] trait and IAM
//! role lookup behind [`RoleLister`]; [`deploy_projects`] drives deployment of
//! whole projects, isolating failures per function.
//!
//! # Example
//! ```no_run
//! use phage_deploy::{create_deployer, deploy_projects, DeployOptions};
//! use phage_model::ProjectStore;
//! use std::path::Path;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = ProjectStore::new(Path::new("/home/me"));
//! let deployer = create_deployer("http", "http://127.0.0.1:3000", Duration::from_secs(60))?;
//! let options = DeployOptions { filter: "^api-".to_string(), dry_run: true };
//! let report = deploy_projects(&store, deployer.as_ref(), &["web".to_string()], &options).await?;
//! println!("{} would deploy", report.would_deploy());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod orchestrator;
pub mod providers;

// Re-export main types
pub use client::{
    role_map, DeployContext, DeployReceipt, Deployer, IamRoleEntry, RoleLister, StaticRoleLister,
};
pub use factory::{create_deployer, create_role_lister};
pub use orchestrator::{
    deploy_projects, DeployOptions, DeployReport, FunctionOutcome, FunctionStatus, ProjectOutcome,
    ProjectStatus,
};
pub use providers::{HttpDeployer, HttpRoleLister};
