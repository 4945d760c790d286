//! Projects: named bundles of functions deployed together.
//!
//! Manifests live in `<home>/.lambda_phage/projects/projects/<name>.yml`.
//! Concurrent writers to the same manifest are last-writer-wins.

use crate::function::FunctionConfig;
use phage_core::config::STATE_DIR;
use phage_core::storage::{read_yaml_optional, write_yaml};
use phage_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A project's reference to one function config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFunction {
    /// `function_id(name, path)`
    pub id: String,

    /// Copy of the config as it was when added
    pub config: FunctionConfig,

    /// Backing file of the config
    pub path: PathBuf,
}

/// A named collection of functions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    #[serde(skip)]
    name: String,

    #[serde(skip)]
    path: PathBuf,

    #[serde(skip)]
    from_file: bool,

    /// Function name -> reference
    #[serde(default)]
    pub functions: BTreeMap<String, ProjectFunction>,
}

/// Deterministic identifier for a function within a project.
///
/// Changing either the name or the config path changes the id.
pub fn function_id(name: &str, config_path: &Path) -> String {
    let mut hasher = Sha1::new();
    hasher.update(name.as_bytes());
    hasher.update(config_path.to_string_lossy().as_bytes());
    hex::encode(hasher.finalize())
}

impl Project {
    /// Create an empty project that has not been read from storage.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            from_file: false,
            functions: BTreeMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Manifest file of this project.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the manifest existed when the project was loaded.
    ///
    /// A fresh project is returned for unknown names, so callers that need
    /// an existing project must check this.
    pub fn from_file(&self) -> bool {
        self.from_file
    }

    /// Add or replace a function, keyed by its name.
    ///
    /// A config without a name is skipped: the project is returned unchanged
    /// so callers can chain without branching.
    pub fn add_function(&mut self, config: &FunctionConfig) -> &mut Self {
        let Some(name) = config.name() else {
            tracing::debug!(
                "Skipping function from {:?} in project {}: config has no name",
                config.path(),
                self.name
            );
            return self;
        };

        let id = function_id(name, config.path());
        tracing::debug!("Adding function {} ({}) to project {}", name, id, self.name);

        self.functions.insert(
            name.to_string(),
            ProjectFunction {
                id,
                config: config.clone(),
                path: config.path().to_path_buf(),
            },
        );

        self
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

/// Per-user project manifest storage.
#[derive(Debug, Clone)]
pub struct ProjectStore {
    dir: PathBuf,
}

impl ProjectStore {
    /// Store rooted at `home`; manifests go two levels below the state dir.
    pub fn new(home: &Path) -> Self {
        Self {
            dir: home.join(STATE_DIR).join("projects").join("projects"),
        }
    }

    /// Directory holding the manifests.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Manifest path for `name`.
    pub fn project_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.yml", name))
    }

    fn ensure_dir(&self) -> AppResult<()> {
        if !self.dir.is_dir() {
            tracing::debug!("Creating project directory {:?}", self.dir);
            std::fs::create_dir_all(&self.dir).map_err(|e| {
                AppError::Project(format!(
                    "Failed to create project directory {:?}: {}",
                    self.dir, e
                ))
            })?;
        }
        Ok(())
    }

    /// Load a project, or create an empty one if no manifest exists.
    ///
    /// A manifest that exists but does not parse is an error. Check
    /// [`Project::from_file`] to tell loaded projects from fresh ones.
    pub fn get_project(&self, name: &str) -> AppResult<Project> {
        validate_name(name)?;
        self.ensure_dir()?;

        let path = self.project_path(name);
        let loaded: Option<Project> = read_yaml_optional(&path).map_err(|e| {
            AppError::Project(format!("Error reading project file {:?}: {}", path, e))
        })?;

        let project = match loaded {
            Some(mut project) => {
                tracing::debug!("Loaded project {} from {:?}", name, path);
                project.name = name.to_string();
                project.path = path;
                project.from_file = true;
                for function in project.functions.values_mut() {
                    function.config.set_path(function.path.clone());
                }
                project
            }
            None => {
                tracing::debug!("No project file at {:?}, starting empty", path);
                Project::new(name, path)
            }
        };

        Ok(project)
    }

    /// Write a project's manifest. The project counts as stored afterwards.
    pub fn save(&self, project: &mut Project) -> AppResult<()> {
        self.ensure_dir()?;
        write_yaml(&project.path, project)?;
        project.from_file = true;
        tracing::info!("Saved project {} to {:?}", project.name, project.path);
        Ok(())
    }

    /// Names of all stored projects, sorted.
    pub fn list_projects(&self) -> AppResult<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();

        for entry in walkdir::WalkDir::new(&self.dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    names.push(stem.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

fn validate_name(name: &str) -> AppResult<()> {
    if name.trim().is_empty() {
        return Err(AppError::Project("Project name cannot be empty".to_string()));
    }

    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(AppError::Project(format!(
            "Project name cannot be a path: {}",
            name
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn named(name: &str, path: &str) -> FunctionConfig {
        let mut config = FunctionConfig::new(path);
        config.name = Some(name.to_string());
        config
    }

    #[test]
    fn test_add_function_without_name_is_noop() {
        let mut project = Project::new("demo", "demo.yml");
        project.add_function(&named("a", "a/l-p.yml"));
        let before = project.functions.clone();

        project.add_function(&FunctionConfig::new("b/l-p.yml"));
        let mut blank = FunctionConfig::new("c/l-p.yml");
        blank.name = Some(String::new());
        project.add_function(&blank);

        assert_eq!(project.functions, before);
    }

    #[test]
    fn test_add_function_twice_replaces() {
        let mut project = Project::new("demo", "demo.yml");
        let mut first = named("a", "a/l-p.yml");
        first.description = Some("first".to_string());
        let mut second = named("a", "a/l-p.yml");
        second.description = Some("second".to_string());

        project.add_function(&first).add_function(&second);

        assert_eq!(project.functions.len(), 1);
        assert_eq!(
            project.functions["a"].config.description.as_deref(),
            Some("second")
        );
    }

    #[test]
    fn test_function_id_depends_on_name_and_path() {
        let base = function_id("a", Path::new("a/l-p.yml"));
        assert_eq!(base, function_id("a", Path::new("a/l-p.yml")));
        assert_ne!(base, function_id("b", Path::new("a/l-p.yml")));
        assert_ne!(base, function_id("a", Path::new("b/l-p.yml")));
        assert_eq!(base.len(), 40);
    }

    #[test]
    fn test_readd_keeps_id() {
        let mut project = Project::new("demo", "demo.yml");
        project.add_function(&named("a", "a/l-p.yml"));
        let id = project.functions["a"].id.clone();

        project.add_function(&named("a", "a/l-p.yml"));
        assert_eq!(project.functions["a"].id, id);

        project.add_function(&named("a", "moved/l-p.yml"));
        assert_ne!(project.functions["a"].id, id);
    }

    #[test]
    fn test_get_missing_project() {
        let home = TempDir::new().unwrap();
        let store = ProjectStore::new(home.path());

        let project = store.get_project("nope").unwrap();
        assert!(!project.from_file());
        assert!(project.is_empty());
        assert!(store.dir().is_dir());
        assert!(store.dir().ends_with(".lambda_phage/projects/projects"));
    }

    #[test]
    fn test_save_and_reload() {
        let home = TempDir::new().unwrap();
        let store = ProjectStore::new(home.path());

        let mut project = store.get_project("demo").unwrap();
        project.add_function(&named("a", "/srv/a/l-p.yml"));
        store.save(&mut project).unwrap();
        assert!(project.from_file());

        let loaded = store.get_project("demo").unwrap();
        assert!(loaded.from_file());
        assert_eq!(loaded.name(), "demo");
        assert_eq!(loaded.functions, project.functions);
        assert_eq!(loaded.functions["a"].path, PathBuf::from("/srv/a/l-p.yml"));
    }

    #[test]
    fn test_corrupt_project_is_error() {
        let home = TempDir::new().unwrap();
        let store = ProjectStore::new(home.path());
        std::fs::create_dir_all(store.dir()).unwrap();
        std::fs::write(store.project_path("broken"), "functions: [oops").unwrap();

        let err = store.get_project("broken").unwrap_err();
        assert!(matches!(err, AppError::Project(_)));
    }

    #[test]
    fn test_rejects_path_names() {
        let home = TempDir::new().unwrap();
        let store = ProjectStore::new(home.path());

        assert!(store.get_project("").is_err());
        assert!(store.get_project("../escape").is_err());
        assert!(store.get_project("a\\b").is_err());
        assert!(store.get_project(".").is_err());
        assert!(store.get_project("..").is_err());
    }

    #[test]
    fn test_dotted_names_are_allowed() {
        let home = TempDir::new().unwrap();
        let store = ProjectStore::new(home.path());

        let project = store.get_project("api.v1.2").unwrap();
        assert!(!project.from_file());
        assert!(project.path().ends_with("api.v1.2.yml"));
    }

    #[test]
    fn test_list_projects() {
        let home = TempDir::new().unwrap();
        let store = ProjectStore::new(home.path());
        assert!(store.list_projects().unwrap().is_empty());

        for name in ["beta", "alpha"] {
            let mut project = store.get_project(name).unwrap();
            store.save(&mut project).unwrap();
        }

        assert_eq!(
            store.list_projects().unwrap(),
            vec!["alpha".to_string(), "beta".to_string()]
        );
    }
}
