//! Site configuration module.
//!
//! Handles loading and validating the optional `config.toml` in the site
//! root. Every key has a default, so a site with no config file at all uses
//! the conventional layout:
//!
//! ```text
//! site/
//! ├── config.toml      # Optional
//! ├── pages/           # pages_dir
//! ├── templates/       # templates_dir: template.html, style.css
//! ├── output/          # output_dir, created on first build
//! └── logfile          # fingerprint_log, created on first build
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! pages_dir = "pages"
//! templates_dir = "templates"
//! output_dir = "output"
//! fingerprint_log = "logfile"
//! template = "template.html"
//! stylesheet = "style.css"
//! reserved = ["template.html", "style.css", ".git"]
//!
//! [publish]
//! # remote = "user@host:/var/www/site"
//! command = "rsync"
//! args = ["-av", "--exclude=.git", "--delete"]
//! ```
//!
//! Relative directory paths are resolved against the site root. Unknown keys
//! are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the site root.
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("pages directory not found: {0}")]
    MissingPages(PathBuf),
    #[error("templates directory not found: {0}")]
    MissingTemplates(PathBuf),
    #[error("{key} {path} lies inside the pages directory {pages}")]
    InsidePages {
        key: &'static str,
        path: PathBuf,
        pages: PathBuf,
    },
}

/// Site configuration loaded from `config.toml`.
///
/// All fields have defaults. A config file need only specify the values it
/// wants to override. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Source tree, relative to the site root.
    pub pages_dir: String,
    /// Template and stylesheet directory, relative to the site root.
    pub templates_dir: String,
    /// Destination tree, relative to the site root.
    pub output_dir: String,
    /// Append-only fingerprint log, relative to the site root.
    pub fingerprint_log: String,
    /// Main page template, inside `templates_dir`.
    pub template: String,
    /// Stylesheet copied to the output root, inside `templates_dir`.
    pub stylesheet: String,
    /// File and directory names never treated as pages, at any depth.
    pub reserved: Vec<String>,
    /// Remote transfer settings.
    pub publish: PublishConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            pages_dir: "pages".to_string(),
            templates_dir: "templates".to_string(),
            output_dir: "output".to_string(),
            fingerprint_log: "logfile".to_string(),
            template: "template.html".to_string(),
            stylesheet: "style.css".to_string(),
            reserved: vec![
                "template.html".to_string(),
                "style.css".to_string(),
                ".git".to_string(),
            ],
            publish: PublishConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Reject values that cannot describe a usable site layout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [
            ("pages_dir", &self.pages_dir),
            ("templates_dir", &self.templates_dir),
            ("output_dir", &self.output_dir),
            ("fingerprint_log", &self.fingerprint_log),
            ("template", &self.template),
            ("stylesheet", &self.stylesheet),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.publish.command.trim().is_empty() {
            return Err(ConfigError::Validation(
                "publish.command must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Settings for copying the output tree to a remote host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PublishConfig {
    /// Transfer destination, e.g. `user@host:/var/www/site`. Publishing is
    /// refused while this is unset.
    pub remote: Option<String>,
    /// Transfer program.
    pub command: String,
    /// Arguments placed before the source and destination.
    pub args: Vec<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            remote: None,
            command: "rsync".to_string(),
            args: vec![
                "-av".to_string(),
                "--exclude=.git".to_string(),
                "--delete".to_string(),
            ],
        }
    }
}

/// Absolute locations derived from a site root and its config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitePaths {
    pub root: PathBuf,
    pub pages: PathBuf,
    pub templates: PathBuf,
    pub output: PathBuf,
    pub fingerprint_log: PathBuf,
    pub template: PathBuf,
    pub stylesheet: PathBuf,
}

impl SitePaths {
    pub fn resolve(root: &Path, config: &SiteConfig) -> Self {
        let templates = root.join(&config.templates_dir);
        Self {
            root: root.to_path_buf(),
            pages: root.join(&config.pages_dir),
            template: templates.join(&config.template),
            stylesheet: templates.join(&config.stylesheet),
            templates,
            output: root.join(&config.output_dir),
            fingerprint_log: root.join(&config.fingerprint_log),
        }
    }

    /// Fail early if the source or template directory is missing, or if
    /// anything the build writes would land in the source tree.
    pub fn check(&self) -> Result<(), ConfigError> {
        if !self.pages.is_dir() {
            return Err(ConfigError::MissingPages(self.pages.clone()));
        }
        if !self.templates.is_dir() {
            return Err(ConfigError::MissingTemplates(self.templates.clone()));
        }
        let pages = normalize(&self.pages);
        for (key, path) in [
            ("output_dir", &self.output),
            ("fingerprint_log", &self.fingerprint_log),
        ] {
            if normalize(path).starts_with(&pages) {
                return Err(ConfigError::InsidePages {
                    key,
                    path: path.clone(),
                    pages: self.pages.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Resolve `.` and `..` without touching the filesystem; the output
/// directory may not exist yet.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

// =============================================================================
// Config loading and validation
// =============================================================================

/// Load config from `config.toml` in the given directory.
///
/// Returns the defaults when there is no file. Unspecified keys keep their
/// defaults, unknown keys are rejected and the result is validated.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(SiteConfig::default());
    }
    let content = fs::read_to_string(&config_path)?;
    let config: SiteConfig = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `--gen-config` CLI flag.
pub fn stock_config_toml() -> &'static str {
    r##"# Leafpress Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Relative paths are resolved against the directory holding this file.
# Unknown keys will cause an error.

# Source pages. Every file below this directory becomes one output page.
pages_dir = "pages"

# Holds the page template and the stylesheet.
templates_dir = "templates"

# Where rendered pages are written.
output_dir = "output"

# Append-only record of every content fingerprint that has been built.
# Delete it to force a full rebuild.
fingerprint_log = "logfile"

# Page template inside templates_dir. Without it, the legacy fragments
# prefix.html and suffix.html are concatenated around each page instead.
template = "template.html"

# Copied to the root of output_dir whenever it changes.
stylesheet = "style.css"

# Names never treated as pages, at any depth in pages_dir.
reserved = ["template.html", "style.css", ".git"]

# ---------------------------------------------------------------------------
# Remote publishing (--publish)
# ---------------------------------------------------------------------------
[publish]
# Destination handed to the transfer command. Publishing is refused while
# this is unset.
# remote = "user@example.com:/var/www/site"

# Transfer program and the arguments placed before source and destination.
command = "rsync"
args = ["-av", "--exclude=.git", "--delete"]
"##
}
