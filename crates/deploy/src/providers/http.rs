//! HTTP function-execution service.
//!
//! Deploys are multipart uploads to `<base>/functions/<name>`, one per
//! region; roles come from `GET <base>/roles`.

use crate::client::{DeployContext, DeployReceipt, Deployer, IamRoleEntry, RoleLister};
use phage_core::{AppError, AppResult};
use phage_model::FunctionConfig;
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;

/// JSON part of a deploy upload.
#[derive(Debug, Serialize)]
struct DeployRequest<'a> {
    name: &'a str,
    project: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    region: Option<&'a str>,
    config: &'a FunctionConfig,
}

/// Deployer for the HTTP function service.
pub struct HttpDeployer {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDeployer {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Deploy(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// `<base>/functions/<name>`, with the name as one encoded path segment.
    fn function_url(&self, name: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            AppError::Deploy(format!("Invalid endpoint {}: {}", self.base_url, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| AppError::Deploy(format!("Endpoint cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .push("functions")
            .push(name);

        Ok(url)
    }

    /// Failure for one region, naming the regions that already went out.
    fn region_error(message: String, deployed: &[String]) -> AppError {
        if deployed.is_empty() {
            AppError::Deploy(message)
        } else {
            AppError::Deploy(format!(
                "{} (already deployed to {})",
                message,
                deployed.join(", ")
            ))
        }
    }

    /// Archive path, relative to the directory holding the config file.
    fn archive_path(config: &FunctionConfig, context: &DeployContext) -> Option<PathBuf> {
        let archive = config.archive.as_deref().filter(|a| !a.is_empty())?;
        let base = context
            .config_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_default();
        Some(base.join(archive))
    }

    async fn read_archive(
        config: &FunctionConfig,
        context: &DeployContext,
    ) -> AppResult<Option<(String, Vec<u8>)>> {
        let Some(path) = Self::archive_path(config, context) else {
            return Ok(None);
        };

        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "archive.zip".to_string());
                tracing::debug!("Read archive {:?} ({} bytes)", path, bytes.len());
                Ok(Some((file_name, bytes)))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No archive at {:?}, deploying config only", path);
                Ok(None)
            }
            Err(e) => Err(AppError::Deploy(format!(
                "Failed to read archive {:?}: {}",
                path, e
            ))),
        }
    }

    fn build_form(
        request: &DeployRequest<'_>,
        archive: Option<&(String, Vec<u8>)>,
    ) -> AppResult<Form> {
        let mut form = Form::new().text("config", serde_json::to_string(request)?);

        if let Some((file_name, bytes)) = archive {
            let part = Part::bytes(bytes.clone())
                .file_name(file_name.clone())
                .mime_str("application/zip")
                .map_err(|e| AppError::Deploy(format!("Invalid archive part: {}", e)))?;
            form = form.part("file", part);
        }

        Ok(form)
    }
}

#[async_trait::async_trait]
impl Deployer for HttpDeployer {
    fn provider_name(&self) -> &str {
        "http"
    }

    async fn deploy(
        &self,
        config: &FunctionConfig,
        context: &DeployContext,
    ) -> AppResult<DeployReceipt> {
        let name = config
            .name()
            .ok_or_else(|| AppError::Deploy("Function config has no name".to_string()))?;

        let url = self.function_url(name)?;
        let archive = Self::read_archive(config, context).await?;

        let regions: Vec<Option<&str>> = if config.regions.is_empty() {
            vec![None]
        } else {
            config.regions.iter().map(|r| Some(r.as_str())).collect()
        };

        let mut deployed = Vec::new();

        for region in regions {
            let request = DeployRequest {
                name,
                project: &context.project,
                region,
                config,
            };
            let form = Self::build_form(&request, archive.as_ref())?;

            tracing::info!("Deploying {} to {} (region {:?})", name, url, region);

            let response = match self.client.post(url.clone()).multipart(form).send().await {
                Ok(response) => response,
                Err(e) => {
                    return Err(Self::region_error(
                        format!("Failed to send request to {}: {}", url, e),
                        &deployed,
                    ))
                }
            };

            if !response.status().is_success() {
                let status = response.status();
                let error_text = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Unknown error".to_string());
                return Err(Self::region_error(
                    format!("Service returned {} for {}: {}", status, name, error_text),
                    &deployed,
                ));
            }

            if let Some(region) = region {
                deployed.push(region.to_string());
            }
        }

        Ok(DeployReceipt {
            function: name.to_string(),
            regions: deployed,
        })
    }
}

/// Role lister backed by the HTTP service.
pub struct HttpRoleLister {
    base_url: String,
    client: reqwest::Client,
}

impl HttpRoleLister {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Deploy(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    async fn fetch(&self) -> AppResult<Vec<IamRoleEntry>> {
        let url = format!("{}/roles", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::Deploy(format!("Failed to send request to {}: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(AppError::Deploy(format!(
                "Service returned {} for {}",
                response.status(),
                url
            )));
        }

        response
            .json::<Vec<IamRoleEntry>>()
            .await
            .map_err(|e| AppError::Serialization(format!("Invalid role list: {}", e)))
    }
}

#[async_trait::async_trait]
impl RoleLister for HttpRoleLister {
    async fn list_roles(&self) -> Vec<IamRoleEntry> {
        match self.fetch().await {
            Ok(roles) => {
                tracing::debug!("Listed {} IAM roles", roles.len());
                roles
            }
            Err(e) => {
                tracing::debug!("Listing IAM roles failed, maybe no permission? {}", e);
                Vec::new()
            }
        }
    }
}
