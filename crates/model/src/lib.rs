//! Data model for lambda-phage.
//!
//! - [`FunctionConfig`]: one function's deployment configuration, with merge
//! - [`Project`] / [`ProjectFunction`]: named bundles of function references
//! - [`ProjectStore`]: per-user manifest storage with load-or-create

pub mod function;
pub mod project;

pub use function::{FunctionConfig, IamRole, Location};
pub use project::{function_id, Project, ProjectFunction, ProjectStore};
