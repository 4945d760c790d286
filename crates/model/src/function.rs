//! Function configuration model.
//!
//! A [`FunctionConfig`] is persisted as one YAML file per function. The file
//! path is the config's identity and is not part of the serialized form.

use phage_core::storage::{read_yaml_optional, write_yaml};
use phage_core::AppResult;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Deployment configuration for one function.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FunctionConfig {
    /// Backing file; set by `load`/`save_to`, never serialized
    #[serde(skip)]
    path: PathBuf,

    /// Function name, the key for project membership
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Archive file name, relative to the config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive: Option<String>,

    /// Runtime identifier (e.g., "nodejs", "python2.7")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,

    /// Handler the runtime invokes
    #[serde(rename = "entrypoint", default, skip_serializing_if = "Option::is_none")]
    pub entry_point: Option<String>,

    /// Memory size in MB
    #[serde(rename = "memorysize", default, skip_serializing_if = "Option::is_none")]
    pub memory_size: Option<u32>,

    /// Timeout in seconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub regions: BTreeSet<String>,

    #[serde(rename = "iamrole", default)]
    pub iam_role: IamRole,

    #[serde(default)]
    pub location: Location,

    /// Projects this config has been attached to
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub projects: Vec<String>,
}

/// IAM role the function runs as. At most one of `arn` and `name` is set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IamRole {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Upload target for the function archive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    #[serde(rename = "s3bucket", default, skip_serializing_if = "Option::is_none")]
    pub s3_bucket: Option<String>,

    #[serde(rename = "s3key", default, skip_serializing_if = "Option::is_none")]
    pub s3_key: Option<String>,

    #[serde(rename = "s3region", default, skip_serializing_if = "Option::is_none")]
    pub s3_region: Option<String>,
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map_or(true, str::is_empty)
}

fn merge_text(dst: &mut Option<String>, src: &Option<String>) {
    if is_blank(dst) && !is_blank(src) {
        *dst = src.clone();
    }
}

fn merge_number(dst: &mut Option<u32>, src: Option<u32>) {
    if dst.unwrap_or(0) == 0 && src.unwrap_or(0) != 0 {
        *dst = src;
    }
}

impl IamRole {
    /// Point the role at an ARN, clearing any name.
    pub fn set_arn(&mut self, arn: impl Into<String>) {
        self.arn = Some(arn.into());
        self.name = None;
    }

    /// Point the role at a name, clearing any ARN.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = Some(name.into());
        self.arn = None;
    }

    pub fn is_empty(&self) -> bool {
        is_blank(&self.arn) && is_blank(&self.name)
    }

    fn merge(&mut self, other: &IamRole) {
        // A receiver that already names a role keeps it whole, so the
        // merge cannot end with both fields populated.
        if self.is_empty() {
            merge_text(&mut self.arn, &other.arn);
            merge_text(&mut self.name, &other.name);
        }
    }
}

impl Location {
    pub fn is_empty(&self) -> bool {
        is_blank(&self.s3_bucket) && is_blank(&self.s3_key) && is_blank(&self.s3_region)
    }

    fn merge(&mut self, other: &Location) {
        merge_text(&mut self.s3_bucket, &other.s3_bucket);
        merge_text(&mut self.s3_key, &other.s3_key);
        merge_text(&mut self.s3_region, &other.s3_region);
    }
}

impl FunctionConfig {
    /// Create an empty config backed by `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Load a config file, returning `Ok(None)` if it does not exist.
    pub fn load_optional(path: &Path) -> AppResult<Option<Self>> {
        let config: Option<Self> = read_yaml_optional(path)?;
        Ok(config.map(|mut c| {
            c.path = path.to_path_buf();
            c
        }))
    }

    /// Load a config file that must exist.
    pub fn load(path: &Path) -> AppResult<Self> {
        Self::load_optional(path)?.ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("function config not found: {}", path.display()),
            )
            .into()
        })
    }

    /// Write to the backing file.
    pub fn save(&self) -> AppResult<()> {
        write_yaml(&self.path, self)
    }

    /// Write to `path` and make it the backing file.
    pub fn save_to(&mut self, path: impl Into<PathBuf>) -> AppResult<()> {
        self.path = path.into();
        self.save()
    }

    /// Backing file of this config.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    /// The function name, if set to something non-empty.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|n| !n.is_empty())
    }

    /// Merge `other` into this config.
    ///
    /// Fields already set here win; blank fields take `other`'s value.
    /// Role and location merge field by field; project membership is the
    /// union of both lists.
    pub fn merge(&mut self, other: &FunctionConfig) -> &mut Self {
        merge_text(&mut self.name, &other.name);
        merge_text(&mut self.description, &other.description);
        merge_text(&mut self.archive, &other.archive);
        merge_text(&mut self.runtime, &other.runtime);
        merge_text(&mut self.entry_point, &other.entry_point);
        merge_number(&mut self.memory_size, other.memory_size);
        merge_number(&mut self.timeout, other.timeout);

        if self.regions.is_empty() {
            self.regions = other.regions.clone();
        }

        self.iam_role.merge(&other.iam_role);
        self.location.merge(&other.location);

        for project in &other.projects {
            self.add_project(project);
        }

        self
    }

    /// Add regions from operator input, split on commas and whitespace.
    pub fn add_regions(&mut self, input: &str) {
        self.regions.extend(
            input
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        );
    }

    /// Record membership in `project`, ignoring repeats.
    pub fn add_project(&mut self, project: &str) {
        if !self.projects.iter().any(|p| p == project) {
            self.projects.push(project.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> FunctionConfig {
        let mut config = FunctionConfig::new("fn/l-p.yml");
        config.name = Some("resize-images".to_string());
        config.runtime = Some("nodejs".to_string());
        config.memory_size = Some(256);
        config.add_regions("us-east-1");
        config
    }

    #[test]
    fn test_merge_fills_blank_fields() {
        let mut base = FunctionConfig::default();
        base.merge(&sample());

        assert_eq!(base.name(), Some("resize-images"));
        assert_eq!(base.memory_size, Some(256));
        assert!(base.regions.contains("us-east-1"));
    }

    #[test]
    fn test_merge_keeps_existing_values() {
        let mut base = sample();
        let mut incoming = FunctionConfig::default();
        incoming.name = Some("other".to_string());
        incoming.runtime = Some("java8".to_string());
        incoming.memory_size = Some(1024);
        incoming.description = Some("now described".to_string());

        base.merge(&incoming);

        assert_eq!(base.name(), Some("resize-images"));
        assert_eq!(base.runtime.as_deref(), Some("nodejs"));
        assert_eq!(base.memory_size, Some(256));
        assert_eq!(base.description.as_deref(), Some("now described"));
    }

    #[test]
    fn test_merge_never_blanks_name() {
        let mut base = sample();
        let mut incoming = FunctionConfig::default();
        incoming.name = Some(String::new());

        base.merge(&incoming);
        assert_eq!(base.name(), Some("resize-images"));
    }

    #[test]
    fn test_merge_empty_string_counts_as_blank() {
        let mut base = FunctionConfig::default();
        base.description = Some(String::new());
        let mut incoming = FunctionConfig::default();
        incoming.description = Some("filled".to_string());

        base.merge(&incoming);
        assert_eq!(base.description.as_deref(), Some("filled"));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut a = FunctionConfig::default();
        a.description = Some("kept".to_string());
        a.location.s3_bucket = Some("bucket".to_string());
        a.add_project("alpha");

        let mut b = sample();
        b.description = Some("ignored".to_string());
        b.location.s3_key = Some("code/".to_string());
        b.iam_role.set_name("lambda-exec");
        b.add_project("beta");

        let mut once = a.clone();
        once.merge(&b);
        let mut twice = once.clone();
        twice.merge(&b);

        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_location_field_by_field() {
        let mut base = FunctionConfig::default();
        base.location.s3_bucket = Some("mine".to_string());
        let mut incoming = FunctionConfig::default();
        incoming.location.s3_bucket = Some("theirs".to_string());
        incoming.location.s3_region = Some("eu-west-1".to_string());

        base.merge(&incoming);
        assert_eq!(base.location.s3_bucket.as_deref(), Some("mine"));
        assert_eq!(base.location.s3_region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_merge_role_keeps_single_identifier() {
        let mut base = FunctionConfig::default();
        base.iam_role.set_arn("arn:aws:iam::123:role/exec");
        let mut incoming = FunctionConfig::default();
        incoming.iam_role.set_name("other-role");

        base.merge(&incoming);
        assert_eq!(base.iam_role.arn.as_deref(), Some("arn:aws:iam::123:role/exec"));
        assert!(base.iam_role.name.is_none());
    }

    #[test]
    fn test_merge_unions_projects() {
        let mut base = FunctionConfig::default();
        base.add_project("alpha");
        let mut incoming = FunctionConfig::default();
        incoming.add_project("alpha");
        incoming.add_project("beta");

        base.merge(&incoming);
        assert_eq!(base.projects, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn test_add_regions_dedups() {
        let mut config = FunctionConfig::default();
        config.add_regions("us-east-1, eu-west-1 us-east-1");
        config.add_regions("eu-west-1");

        let regions: Vec<_> = config.regions.iter().cloned().collect();
        assert_eq!(regions, vec!["eu-west-1".to_string(), "us-east-1".to_string()]);
    }

    #[test]
    fn test_role_setters_are_exclusive() {
        let mut role = IamRole::default();
        role.set_name("exec");
        role.set_arn("arn:aws:iam::1:role/exec");
        assert!(role.name.is_none());
        role.set_name("exec");
        assert!(role.arn.is_none());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("l-p.yml");

        let mut config = sample();
        config.save_to(&path).unwrap();

        let loaded = FunctionConfig::load(&path).unwrap();
        assert_eq!(loaded.path(), path.as_path());
        assert_eq!(loaded.name(), Some("resize-images"));
        assert_eq!(loaded.regions, config.regions);
    }

    #[test]
    fn test_reads_lowercase_keys() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("l-p.yml");
        std::fs::write(
            &path,
            "name: thumbs\nentrypoint: index.handler\nmemorysize: 128\ntimeout: 5\n\
             regions: [us-east-1]\niamrole:\n  name: exec\nlocation:\n  s3bucket: code\n",
        )
        .unwrap();

        let loaded = FunctionConfig::load(&path).unwrap();
        assert_eq!(loaded.entry_point.as_deref(), Some("index.handler"));
        assert_eq!(loaded.memory_size, Some(128));
        assert_eq!(loaded.iam_role.name.as_deref(), Some("exec"));
        assert_eq!(loaded.location.s3_bucket.as_deref(), Some("code"));
    }

    #[test]
    fn test_load_missing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.yml");

        assert!(FunctionConfig::load_optional(&path).unwrap().is_none());
        assert!(FunctionConfig::load(&path).is_err());
    }
}
