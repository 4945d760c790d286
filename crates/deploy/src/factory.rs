//! Collaborator factory.
//!
//! Resolves the configured provider name into concrete deployer and role
//! lister implementations.

use crate::client::{Deployer, RoleLister, StaticRoleLister};
use crate::providers::{HttpDeployer, HttpRoleLister};
use phage_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create a deployer for `provider`.
///
/// # Errors
/// Returns an error if the provider is unknown or the client cannot be built.
pub fn create_deployer(
    provider: &str,
    endpoint: &str,
    timeout: Duration,
) -> AppResult<Arc<dyn Deployer>> {
    match provider.to_lowercase().as_str() {
        "http" => Ok(Arc::new(HttpDeployer::new(endpoint, timeout)?)),
        _ => Err(AppError::Config(format!("Unknown deploy provider: {}", provider))),
    }
}

/// Create a role lister for `provider`.
///
/// Never fails: unknown providers or client errors fall back to an empty
/// lister, which only disables role completion.
pub fn create_role_lister(provider: &str, endpoint: &str, timeout: Duration) -> Arc<dyn RoleLister> {
    match provider.to_lowercase().as_str() {
        "http" => match HttpRoleLister::new(endpoint, timeout) {
            Ok(lister) => Arc::new(lister),
            Err(e) => {
                tracing::debug!("Role listing unavailable: {}", e);
                Arc::new(StaticRoleLister::default())
            }
        },
        other => {
            tracing::debug!("No role listing for provider {}", other);
            Arc::new(StaticRoleLister::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_http_deployer() {
        let deployer = create_deployer("HTTP", "http://localhost:3000", Duration::from_secs(5));
        assert_eq!(deployer.unwrap().provider_name(), "http");
    }

    #[test]
    fn test_unknown_provider() {
        match create_deployer("carrier-pigeon", "http://localhost", Duration::from_secs(5)) {
            Err(err) => assert!(err.to_string().contains("Unknown deploy provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }

    #[tokio::test]
    async fn test_unknown_provider_lists_no_roles() {
        let lister = create_role_lister("carrier-pigeon", "http://localhost", Duration::from_secs(1));
        assert!(lister.list_roles().await.is_empty());
    }
}
