//! Collaborator abstractions for deployment and role lookup.

use phage_core::AppResult;
use phage_model::FunctionConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// What a deployer knows about the surrounding batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployContext {
    /// Project the function is deployed as part of
    pub project: String,

    /// Backing file of the config; archives resolve relative to it
    pub config_path: PathBuf,
}

/// Result of one successful deploy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployReceipt {
    pub function: String,

    /// Regions the function was deployed to; empty for the service default
    #[serde(default)]
    pub regions: Vec<String>,
}

/// Trait for function-execution services.
///
/// Called at most once per function per invocation, with no ordering
/// relative to other functions.
#[async_trait::async_trait]
pub trait Deployer: Send + Sync {
    /// Get the provider name (e.g., "http").
    fn provider_name(&self) -> &str;

    /// Deploy one function.
    ///
    /// An error describes why this single function failed to deploy.
    async fn deploy(&self, config: &FunctionConfig, context: &DeployContext)
        -> AppResult<DeployReceipt>;
}

/// A known IAM role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamRoleEntry {
    pub name: String,
    pub arn: String,
}

/// Trait for IAM role lookup.
#[async_trait::async_trait]
pub trait RoleLister: Send + Sync {
    /// List roles available to the operator.
    ///
    /// Never fails: permission or transport problems yield an empty list,
    /// which only means no completion is offered.
    async fn list_roles(&self) -> Vec<IamRoleEntry>;
}

/// Map role names to ARNs.
pub fn role_map(roles: &[IamRoleEntry]) -> HashMap<String, String> {
    roles
        .iter()
        .map(|r| (r.name.clone(), r.arn.clone()))
        .collect()
}

/// Role lister over a fixed list.
#[derive(Debug, Clone, Default)]
pub struct StaticRoleLister {
    roles: Vec<IamRoleEntry>,
}

impl StaticRoleLister {
    pub fn new(roles: Vec<IamRoleEntry>) -> Self {
        Self { roles }
    }
}

#[async_trait::async_trait]
impl RoleLister for StaticRoleLister {
    async fn list_roles(&self) -> Vec<IamRoleEntry> {
        self.roles.clone()
    }
}
