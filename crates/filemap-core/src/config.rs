//! Configuration parsing
//!
//! This module loads a filemap project file, which groups targets by task:
//!
//! ```yaml
//! name: site
//! base_dir: .
//! tasks:
//!   copy:
//!     options:
//!       mode: preserve
//!     assets:
//!       files:
//!         - { expand: true, cwd: static, src: ["**/*"], dest: public/ }
//!   concat:
//!     dist/app.js: [src/*.js]
//! ```
//!
//! Task and target order follows the file.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::normalize::{NormalizedEntry, Normalizer};

/// Default project file name
pub const CONFIG_FILE: &str = "filemap.yaml";

/// Target-level key reserved for task options
const OPTIONS_KEY: &str = "options";

/// Root project configuration from `filemap.yaml`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    pub name: String,

    /// Directory patterns are matched in, relative to the project file
    #[serde(default)]
    pub base_dir: Option<String>,

    /// Let wildcards match dot-files unless a mapping says otherwise
    #[serde(default)]
    pub dot: bool,

    /// Task name → task block (targets plus optional `options`)
    #[serde(default)]
    pub tasks: Map<String, Value>,
}

/// Main configuration container
#[derive(Debug, Clone)]
pub struct Config {
    /// Project configuration
    pub project: ProjectConfig,

    /// Directory containing the project file
    pub base_path: PathBuf,
}

impl Config {
    /// Load configuration from a directory or a project file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the project directory or filemap.yaml file
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let config = Config::load("./my-project")?;
    /// println!("Project: {}", config.project.name);
    /// ```
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let (config_path, base_path) = if path.is_dir() {
            (path.join(CONFIG_FILE), path.to_path_buf())
        } else {
            (
                path.to_path_buf(),
                path.parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or(Path::new("."))
                    .to_path_buf(),
            )
        };

        if !config_path.exists() {
            return Err(Error::ConfigNotFound {
                path: config_path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(&config_path)?;
        let project = Self::parse(&contents)?;
        tracing::debug!(
            "Loaded project '{}' with {} tasks from {}",
            project.name,
            project.tasks.len(),
            config_path.display()
        );

        Ok(Self { project, base_path })
    }

    /// Parse project YAML
    pub fn parse(contents: &str) -> Result<ProjectConfig> {
        let project: ProjectConfig = serde_yaml::from_str(contents)?;
        for (task, block) in &project.tasks {
            if !block.is_object() {
                return Err(Error::ConfigInvalid {
                    message: format!("task '{}' must be a mapping of targets", task),
                });
            }
        }
        Ok(project)
    }

    /// Task names in declaration order
    pub fn tasks(&self) -> impl Iterator<Item = &str> {
        self.project.tasks.keys().map(String::as_str)
    }

    /// Target names of `task` in declaration order, skipping `options`
    pub fn targets(&self, task: &str) -> Result<Vec<&str>> {
        Ok(self
            .task(task)?
            .keys()
            .map(String::as_str)
            .filter(|k| *k != OPTIONS_KEY)
            .collect())
    }

    /// Raw file specification of `task:target`
    pub fn target(&self, task: &str, target: &str) -> Result<&Value> {
        if target == OPTIONS_KEY {
            return Err(Error::ConfigInvalid {
                message: format!("'{}' is reserved for task options", OPTIONS_KEY),
            });
        }
        self.task(task)?
            .get(target)
            .ok_or_else(|| Error::ConfigInvalid {
                message: format!("target '{}' not found in task '{}'", target, task),
            })
    }

    /// Directory patterns are matched in
    pub fn base_dir(&self) -> PathBuf {
        match &self.project.base_dir {
            Some(dir) => self.base_path.join(dir),
            None => self.base_path.clone(),
        }
    }

    /// A normalizer rooted at [`Config::base_dir`] with project defaults
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new()
            .with_base_dir(self.base_dir())
            .with_dot(self.project.dot)
    }

    /// Normalize `task:target` with `normalizer`
    pub fn normalize_target(
        &self,
        normalizer: &Normalizer,
        task: &str,
        target: &str,
    ) -> Result<Vec<NormalizedEntry>> {
        let value = self.target(task, target)?;
        normalizer.normalize(value, target)
    }

    fn task(&self, task: &str) -> Result<&Map<String, Value>> {
        self.project
            .tasks
            .get(task)
            .and_then(Value::as_object)
            .ok_or_else(|| Error::ConfigInvalid {
                message: format!("task '{}' not found", task),
            })
    }
}

/// Split a `task:target` reference
pub fn parse_target_ref(reference: &str) -> Result<(&str, &str)> {
    reference
        .split_once(':')
        .filter(|(task, target)| !task.is_empty() && !target.is_empty())
        .ok_or_else(|| Error::ConfigInvalid {
            message: format!(
                "target reference '{}' must be in 'task:target' format",
                reference
            ),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PROJECT: &str = r#"
name: site
tasks:
  concat:
    options:
      separator: ";"
    dist/built.js: src/*.js
    vendor:
      src: [vendor/*.js]
      dest: dist/vendor.js
  copy:
    assets:
      files:
        - expand: true
          cwd: static
          src: ["**/*"]
          dest: public/
"#;

    #[test]
    fn test_parse_minimal_config() {
        let config = Config::parse("name: test-project\n").unwrap();
        assert_eq!(config.name, "test-project");
        assert!(config.base_dir.is_none());
        assert!(!config.dot);
        assert!(config.tasks.is_empty());
    }

    #[test]
    fn test_tasks_and_targets_keep_order() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), PROJECT).unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.tasks().collect::<Vec<_>>(), vec!["concat", "copy"]);
        assert_eq!(
            config.targets("concat").unwrap(),
            vec!["dist/built.js", "vendor"]
        );
        assert!(config.target("concat", "vendor").unwrap().is_object());
        assert!(config.target("concat", "options").is_err());
        assert!(config.target("concat", "missing").is_err());
        assert!(config.targets("missing").is_err());
    }

    #[test]
    fn test_load_from_file_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.yaml");
        std::fs::write(&path, "name: custom\nbase_dir: web\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.project.name, "custom");
        assert_eq!(config.base_dir(), dir.path().join("web"));
    }

    #[test]
    fn test_missing_config_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_task_must_be_mapping() {
        let err = Config::parse("name: x\ntasks:\n  copy: [a, b]\n").unwrap_err();
        assert!(matches!(err, Error::ConfigInvalid { .. }));
    }

    #[test]
    fn test_parse_target_ref() {
        assert_eq!(parse_target_ref("copy:assets").unwrap(), ("copy", "assets"));
        assert_eq!(
            parse_target_ref("concat:dist/built.js").unwrap(),
            ("concat", "dist/built.js")
        );
        assert!(parse_target_ref("copy").is_err());
        assert!(parse_target_ref(":assets").is_err());
    }
}
