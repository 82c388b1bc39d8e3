use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::{CONFIG_FILENAME, DEFAULT_HELPER_MODULE, DEFAULT_MARKER, PYPROJECT_FILENAME};

#[derive(Debug, Deserialize, Default, Clone)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default, rename = "auto-deprecator")]
    /// The main configuration section.
    pub auto_deprecator: AutoDeprecatorConfig,
    /// The path to the configuration file this was loaded from.
    /// Set by the loaders, `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
/// Configuration options, all optional; CLI flags take precedence.
pub struct AutoDeprecatorConfig {
    /// Current version of the project.
    pub current_version: Option<String>,
    /// Dotted module whose `__version__` is the current version.
    pub version_source: Option<String>,
    /// Name of the marker decorator.
    pub marker: Option<String>,
    /// Module the marker decorator is imported from.
    pub helper_module: Option<String>,
    /// List of folders to exclude.
    pub exclude_folders: Option<Vec<String>>,
}

impl AutoDeprecatorConfig {
    /// Marker name, falling back to `deprecate`.
    #[must_use]
    pub fn marker(&self) -> &str {
        self.marker.as_deref().unwrap_or(DEFAULT_MARKER)
    }

    /// Helper module, falling back to `auto_deprecator`.
    #[must_use]
    pub fn helper_module(&self) -> &str {
        self.helper_module.as_deref().unwrap_or(DEFAULT_HELPER_MODULE)
    }
}

#[derive(Debug, Deserialize, Clone)]
struct PyProject {
    #[serde(default)]
    tool: ToolConfig,
}

#[derive(Debug, Deserialize, Default, Clone)]
struct ToolConfig {
    #[serde(rename = "auto-deprecator")]
    auto_deprecator: Option<AutoDeprecatorConfig>,
}

impl Config {
    /// Loads configuration starting from a specific path and traversing up.
    ///
    /// A `pyproject.toml` without a `[tool.auto-deprecator]` table is
    /// skipped, so the search continues upwards. The first configuration
    /// file found must be readable and valid; the search never steps past a
    /// broken one.
    ///
    /// # Errors
    ///
    /// Returns an error if a discovered file cannot be read or parsed.
    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }

        loop {
            // 1. Try CONFIG_FILENAME
            let config_toml = current.join(CONFIG_FILENAME);
            if config_toml.exists() {
                return Self::load_from_file(&config_toml);
            }

            // 2. Try PYPROJECT_FILENAME, only if it carries our table
            let pyproject_toml = current.join(PYPROJECT_FILENAME);
            if pyproject_toml.exists() {
                let content = fs::read_to_string(&pyproject_toml).with_context(|| {
                    format!("Failed to read config file {}", pyproject_toml.display())
                })?;
                let pyproject = toml::from_str::<PyProject>(&content)
                    .with_context(|| format!("Invalid config file {}", pyproject_toml.display()))?;
                if let Some(section) = pyproject.tool.auto_deprecator {
                    return Ok(Config {
                        auto_deprecator: section,
                        config_file_path: Some(pyproject_toml),
                    });
                }
            }

            if !current.pop() {
                break;
            }
        }

        Ok(Config::default())
    }

    /// Loads an explicitly named configuration file.
    ///
    /// Unlike [`Config::load_from_path`], a missing file is an error. A file
    /// named `pyproject.toml` is read through its
    /// `[tool.auto-deprecator]` table.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let is_pyproject = path
            .file_name()
            .is_some_and(|name| name == PYPROJECT_FILENAME);

        let auto_deprecator = if is_pyproject {
            toml::from_str::<PyProject>(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?
                .tool
                .auto_deprecator
                .unwrap_or_default()
        } else {
            toml::from_str::<Config>(&content)
                .with_context(|| format!("Invalid config file {}", path.display()))?
                .auto_deprecator
        };

        Ok(Config {
            auto_deprecator,
            config_file_path: Some(path.to_path_buf()),
        })
    }
}
