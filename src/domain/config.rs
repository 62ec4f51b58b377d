use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration for a documentation project.
///
/// This struct holds settings that control which files are scanned for
/// requirement blocks, how links between documents are written, and how
/// strictly problems are treated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// File extensions (without the dot) parsed as source documents.
    source_extensions: Vec<String>,

    /// Path component names skipped while walking the source tree.
    ///
    /// Any file below a directory with one of these names, or any file with
    /// one of these names, is ignored. The `.req` metadata directory is
    /// always skipped.
    exclude: Vec<String>,

    /// Suffix appended to document names when writing links.
    ///
    /// For example, `.md` links `design/core` as `design/core.md`.
    link_suffix: String,

    /// Title of the generated index page.
    index_title: String,

    /// Whether warnings (unresolved references, duplicates, dangling
    /// derivation links) fail a build.
    pub strict: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_extensions: default_source_extensions(),
            exclude: default_exclude(),
            link_suffix: default_link_suffix(),
            index_title: default_index_title(),
            strict: false,
        }
    }
}

impl Config {
    /// Loads the configuration from a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the TOML content is
    /// invalid.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {e}"))?;
        toml::from_str(&content).map_err(|e| format!("Failed to parse config file: {e}"))
    }

    /// Saves the configuration to a TOML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration cannot be serialized to TOML or if
    /// the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content =
            toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize config: {e}"))?;
        std::fs::write(path, content).map_err(|e| format!("Failed to write config file: {e}"))
    }

    /// Returns the extensions of source documents.
    #[must_use]
    pub fn source_extensions(&self) -> &[String] {
        &self.source_extensions
    }

    /// Checks if a file extension marks a source document.
    #[must_use]
    pub fn is_source_extension(&self, extension: &str) -> bool {
        self.source_extensions.iter().any(|e| e == extension)
    }

    /// Returns the excluded path component names.
    #[must_use]
    pub fn exclude(&self) -> &[String] {
        &self.exclude
    }

    /// Checks if a path component name is excluded.
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        name == ".req" || self.exclude.iter().any(|e| e == name)
    }

    /// Returns the suffix appended to document names in links.
    #[must_use]
    pub fn link_suffix(&self) -> &str {
        &self.link_suffix
    }

    /// Sets the suffix appended to document names in links.
    pub fn set_link_suffix(&mut self, suffix: impl Into<String>) {
        self.link_suffix = suffix.into();
    }

    /// Returns the title of the index page.
    #[must_use]
    pub fn index_title(&self) -> &str {
        &self.index_title
    }

    /// Adds a path component name to the exclude list.
    ///
    /// Returns `true` if the name was added, `false` if it already existed.
    pub fn add_exclude(&mut self, name: String) -> bool {
        if self.exclude.contains(&name) {
            false
        } else {
            self.exclude.push(name);
            true
        }
    }
}

fn default_source_extensions() -> Vec<String> {
    vec!["rst".to_string()]
}

fn default_exclude() -> Vec<String> {
    vec!["_build".to_string()]
}

fn default_link_suffix() -> String {
    ".md".to_string()
}

fn default_index_title() -> String {
    "Requirement Index".to_string()
}

/// The serialized versions of the configuration.
/// This allows for future changes to the configuration format and to the domain
/// type without breaking compatibility.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default = "default_source_extensions")]
        source_extensions: Vec<String>,

        #[serde(default = "default_exclude")]
        exclude: Vec<String>,

        #[serde(default = "default_link_suffix")]
        link_suffix: String,

        #[serde(default = "default_index_title")]
        index_title: String,

        #[serde(default)]
        strict: bool,
    },
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 {
                source_extensions,
                exclude,
                link_suffix,
                index_title,
                strict,
            } => Self {
                source_extensions,
                exclude,
                link_suffix,
                index_title,
                strict,
            },
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1 {
            source_extensions: config.source_extensions,
            exclude: config.exclude,
            link_suffix: config.link_suffix,
            index_title: config.index_title,
            strict: config.strict,
        }
    }
}
