//! Collaborator implementations.

pub mod http;

pub use http::{HttpDeployer, HttpRoleLister};
