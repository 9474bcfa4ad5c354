use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::MessageTemplate;
use crate::error::{ReleaseError, Result};

/// Conventional location of the deployment configuration, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "deployment.toml";

pub const JIRA_SECTION: &str = "JIRA";
pub const PROJECT_SECTION: &str = "PROJECT";

/// Keys that must be present before the pipeline starts.
pub const REQUIRED_KEYS: &[(&str, &str)] = &[
    (JIRA_SECTION, "server"),
    (JIRA_SECTION, "username"),
    (JIRA_SECTION, "password"),
    (JIRA_SECTION, "project"),
    (JIRA_SECTION, "fix_version"),
    (JIRA_SECTION, "search_pattern"),
    (PROJECT_SECTION, "version"),
    (PROJECT_SECTION, "rc_version"),
    (PROJECT_SECTION, "bump_message"),
    (PROJECT_SECTION, "tag_message"),
];

type Sections = BTreeMap<String, BTreeMap<String, String>>;

/// The persisted deployment settings: section name -> (key -> string value).
///
/// The file is a TOML document whose top-level tables are the sections.
/// It is re-read by every stage that needs it and rewritten in full by
/// [`DeploymentConfig::save`].
#[derive(Debug, Clone, PartialEq)]
pub struct DeploymentConfig {
    path: PathBuf,
    sections: Sections,
}

/// Connection and query settings for the issue tracker, taken from `[JIRA]`.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackerSettings {
    pub server: String,
    pub username: String,
    pub password: String,
    pub project: String,
    pub fix_version: String,
    pub search_pattern: String,
}

impl TrackerSettings {
    /// Render `search_pattern` with the project key and fix version.
    pub fn search_query(&self) -> Result<String> {
        MessageTemplate::new(self.search_pattern.as_str())
            .render(&[self.project.as_str(), self.fix_version.as_str()])
    }
}

impl DeploymentConfig {
    /// Loads the configuration file at `path`.
    ///
    /// # Errors
    /// * `ConfigRead` - If the file is absent, unreadable, or not a document of
    ///   sections holding scalar values
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .map_err(|e| ReleaseError::config_read(path, e.to_string()))?;
        Self::parse(path, &contents)
    }

    /// Parses configuration text that belongs to `path`.
    pub fn parse(path: impl AsRef<Path>, contents: &str) -> Result<Self> {
        let path = path.as_ref();
        let document: toml::Table = toml::from_str(contents)
            .map_err(|e| ReleaseError::config_read(path, e.to_string()))?;

        let mut sections = Sections::new();
        for (section, value) in document {
            let toml::Value::Table(entries) = value else {
                return Err(ReleaseError::config_read(
                    path,
                    format!("'{}' is not a section", section),
                ));
            };

            let mut values = BTreeMap::new();
            for (key, value) in entries {
                let value = scalar_to_string(&value).ok_or_else(|| {
                    ReleaseError::config_read(
                        path,
                        format!("[{}] {} must be a plain value", section, key),
                    )
                })?;
                values.insert(key, value);
            }
            sections.insert(section, values);
        }

        Ok(DeploymentConfig {
            path: path.to_path_buf(),
            sections,
        })
    }

    /// Overwrites the backing file with the full configuration.
    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string(&self.sections)
            .map_err(|e| ReleaseError::config_read(&self.path, e.to_string()))?;
        fs::write(&self.path, contents)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// # Errors
    /// * `MissingKey` - If the section or the key within it does not exist
    pub fn get(&self, section: &str, key: &str) -> Result<&str> {
        self.sections
            .get(section)
            .and_then(|values| values.get(key))
            .map(String::as_str)
            .ok_or_else(|| ReleaseError::missing_key(section, key))
    }

    /// Sets a value, creating the section if needed. Not persisted until [`save`](Self::save).
    pub fn set(&mut self, section: &str, key: &str, value: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    /// Checks every key in [`REQUIRED_KEYS`] is present.
    pub fn validate(&self) -> Result<()> {
        for (section, key) in REQUIRED_KEYS {
            self.get(section, key)?;
        }
        Ok(())
    }

    pub fn tracker_settings(&self) -> Result<TrackerSettings> {
        Ok(TrackerSettings {
            server: self.get(JIRA_SECTION, "server")?.to_string(),
            username: self.get(JIRA_SECTION, "username")?.to_string(),
            password: self.get(JIRA_SECTION, "password")?.to_string(),
            project: self.get(JIRA_SECTION, "project")?.to_string(),
            fix_version: self.get(JIRA_SECTION, "fix_version")?.to_string(),
            search_pattern: self.get(JIRA_SECTION, "search_pattern")?.to_string(),
        })
    }
}

fn scalar_to_string(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
        other => Some(other.to_string()),
    }
}
