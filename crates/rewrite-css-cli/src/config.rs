//! Configuration file discovery and parsing
//!
//! Searches for `.config/rewrite-css.yaml` walking up from the current directory.
//! The project root is the parent of `.config/`.

use camino::{Utf8Path, Utf8PathBuf};
use eyre::{Result, eyre};
use facet::Facet;
use rewrite_css::RewriteOptions;
use std::env;

const CONFIG_DIR: &str = ".config";
const CONFIG_FILE: &str = "rewrite-css.yaml";

/// Configuration from `.config/rewrite-css.yaml`
#[derive(Debug, Clone, Default, Facet)]
#[facet(rename_all = "snake_case")]
pub struct RewriteCssConfig {
    /// Directory rebased URLs are made relative to (relative to project root)
    #[facet(default)]
    pub root: Option<String>,

    /// Prepended to every rebased URL, e.g. `https://cdn.example.com`
    #[facet(default)]
    pub prefix: Option<String>,

    /// Where rewritten files go (relative to project root)
    #[facet(default)]
    pub out_dir: Option<String>,

    /// Engine options (`debug`, `minify`)
    #[facet(default)]
    pub rewrite: Option<RewriteOptions>,
}

/// Configuration with paths resolved against the project root
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub root: Utf8PathBuf,
    pub prefix: String,
    pub out_dir: Option<Utf8PathBuf>,
    pub options: RewriteOptions,
}

impl ResolvedConfig {
    /// Resolve a parsed config; relative paths are taken from `project_root`.
    pub fn resolve(config: RewriteCssConfig, project_root: &Utf8Path) -> Self {
        let root = match config.root.as_deref() {
            Some(root) => project_root.join(root),
            None => project_root.to_owned(),
        };
        Self {
            root,
            prefix: config.prefix.unwrap_or_default(),
            out_dir: config.out_dir.map(|dir| project_root.join(dir)),
            options: config.rewrite.unwrap_or_default(),
        }
    }

    /// Discover and load configuration, falling back to defaults rooted at `cwd`.
    pub fn discover(cwd: &Utf8Path) -> Result<Self> {
        match find_config_file(cwd) {
            Some(path) => load_config(&path),
            None => Ok(Self::resolve(RewriteCssConfig::default(), cwd)),
        }
    }
}

/// Current directory as a UTF-8 path
pub fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = env::current_dir()?;
    Utf8PathBuf::try_from(cwd).map_err(|e| {
        eyre!(
            "Current directory is not valid UTF-8: {}",
            e.as_path().display()
        )
    })
}

/// Search for `.config/rewrite-css.yaml` walking up from `start`
fn find_config_file(start: &Utf8Path) -> Option<Utf8PathBuf> {
    start
        .ancestors()
        .map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

/// Load and resolve configuration from a config file path
fn load_config(config_path: &Utf8Path) -> Result<ResolvedConfig> {
    let content = fs_err::read_to_string(config_path)?;

    let config: RewriteCssConfig = facet_yaml::from_str(&content)
        .map_err(|e| eyre!("Failed to parse {}: {}", config_path, e))?;

    // Project root is the parent of .config/
    let root = config_path
        .parent()
        .and_then(|config_dir| config_dir.parent())
        .ok_or_else(|| eyre!("{} is not inside a .config directory", config_path))?;

    tracing::debug!(%config_path, "loaded configuration");
    Ok(ResolvedConfig::resolve(config, root))
}
