//! Configuration for promptfish.
//!
//! Configuration sources (highest priority first):
//! 1. Command-line flags
//! 2. Environment variables (UNRAID_HOST, UNRAID_BOOK_PATH, EXCLUDE_SUBJECTS, ...),
//!    optionally loaded from a `.env` file
//! 3. Config file (.promptfish/config.yaml)
//! 4. Built-in defaults
//!
//! Config file discovery:
//! - Searches current directory and parents for .promptfish/config.yaml
//! - Falls back to ~/.promptfish/config.yaml
//!
//! Filter lists are additive: every layer extends the built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::adapters::{Credentials, LocalTransport, SshTransport, Transport};
use crate::extract::SentenceBounds;
use crate::library::filter::parse_list;
use crate::library::{CatalogMode, CatalogSource, FilterConfig};

const DEFAULT_USER: &str = "root";
const DEFAULT_PORT: u16 = 22;
const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Configuration errors (all fatal at startup)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("UNRAID_HOST not set (flag --host, env, or config file)")]
    MissingHost,

    #[error("UNRAID_BOOK_PATH not set (flag --root, env, or config file)")]
    MissingRootPath,

    #[error("Failed to read config file {}: {source}", .path.display())]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}: {source}", .path.display())]
    ParseFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid sentence bounds: min_chars ({min}) must be below max_chars ({max})")]
    InvalidBounds { min: usize, max: usize },
}

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub remote: RemoteSection,
    #[serde(default)]
    pub library: LibrarySection,
    #[serde(default)]
    pub filter: FilterSection,
    #[serde(default)]
    pub extract: ExtractSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RemoteSection {
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub key_path: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LibrarySection {
    /// Library root on the server
    pub root: Option<String>,
    pub catalog: Option<CatalogMode>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterSection {
    #[serde(default)]
    pub exclude_subjects: Vec<String>,
    #[serde(default)]
    pub exclude_title_keywords: Vec<String>,
    #[serde(default)]
    pub fiction_tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractSection {
    pub min_chars: Option<usize>,
    pub max_chars: Option<usize>,
}

/// Values supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub host: Option<String>,
    pub user: Option<String>,
    pub port: Option<u16>,
    pub password: Option<String>,
    pub key_path: Option<PathBuf>,
    pub root: Option<String>,
    pub catalog: Option<CatalogMode>,
    /// Comma-separated additions
    pub exclude_subjects: Option<String>,
    /// Comma-separated additions
    pub exclude_title_keywords: Option<String>,
    /// Comma-separated additions
    pub fiction_tags: Option<String>,
    pub min_chars: Option<usize>,
    pub max_chars: Option<usize>,
    /// Read the library from the local filesystem instead of over SSH
    pub local: bool,
}

/// Resolved SSH connection settings
#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub host: String,
    pub user: String,
    pub port: u16,
    pub credentials: Credentials,
    pub timeout: Duration,
}

/// Fully resolved, immutable settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
    /// `None` when the library is local
    pub remote: Option<RemoteSettings>,
    pub root: String,
    pub catalog: CatalogMode,
    pub filter: FilterConfig,
    pub bounds: SentenceBounds,
    /// Path to config file (if one was used)
    pub config_file: Option<PathBuf>,
}

impl Settings {
    /// Build the transport these settings describe
    pub fn transport(&self) -> Box<dyn Transport> {
        match &self.remote {
            Some(remote) => Box::new(
                SshTransport::new(
                    remote.host.clone(),
                    remote.user.clone(),
                    remote.port,
                    remote.credentials.clone(),
                )
                .with_timeout(remote.timeout),
            ),
            None => Box::new(LocalTransport::new()),
        }
    }

    /// Catalog source for the configured root and mode
    pub fn catalog_source(&self) -> CatalogSource {
        CatalogSource::new(self.root.clone(), self.catalog)
    }
}

/// Find config file by searching current directory and parents, then home
pub fn find_config_file() -> Option<PathBuf> {
    let mut current = std::env::current_dir().ok()?;

    loop {
        let config_path = current.join(".promptfish").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    let home_config = dirs::home_dir()?.join(".promptfish").join("config.yaml");
    home_config.exists().then_some(home_config)
}

/// Load and parse config file
pub fn load_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    serde_yaml::from_str(&content).map_err(|source| ConfigError::ParseFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Discover the config file and resolve all layers
pub fn load(overrides: Overrides) -> Result<Settings, ConfigError> {
    let file = match find_config_file() {
        Some(path) => {
            let config = load_config_file(&path)?;
            Some((path, config))
        }
        None => None,
    };

    resolve(overrides, file)
}

/// Merge overrides over an (optional) config file and the defaults
pub fn resolve(
    overrides: Overrides,
    file: Option<(PathBuf, ConfigFile)>,
) -> Result<Settings, ConfigError> {
    let (config_file, file) = match file {
        Some((path, config)) => (Some(path), config),
        None => (None, ConfigFile::default()),
    };

    let root = non_empty(overrides.root)
        .or_else(|| non_empty(file.library.root.clone()))
        .ok_or(ConfigError::MissingRootPath)?;

    let remote = if overrides.local {
        None
    } else {
        let host = non_empty(overrides.host)
            .or_else(|| non_empty(file.remote.host.clone()))
            .ok_or(ConfigError::MissingHost)?;

        let key_path = overrides
            .key_path
            .or_else(|| non_empty(file.remote.key_path.clone()).map(PathBuf::from));

        Some(RemoteSettings {
            host,
            user: non_empty(overrides.user)
                .or_else(|| non_empty(file.remote.user.clone()))
                .unwrap_or_else(|| DEFAULT_USER.to_string()),
            port: overrides.port.or(file.remote.port).unwrap_or(DEFAULT_PORT),
            credentials: Credentials::resolve(key_path, overrides.password),
            timeout: Duration::from_secs(
                file.remote.timeout_seconds.unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
        })
    };

    let filter = FilterConfig::default()
        .with_fiction_tags(&file.filter.fiction_tags)
        .with_fiction_tags(parse_list(overrides.fiction_tags.as_deref().unwrap_or_default()))
        .with_excluded_subjects(&file.filter.exclude_subjects)
        .with_excluded_subjects(parse_list(
            overrides.exclude_subjects.as_deref().unwrap_or_default(),
        ))
        .with_title_keywords(&file.filter.exclude_title_keywords)
        .with_title_keywords(parse_list(
            overrides.exclude_title_keywords.as_deref().unwrap_or_default(),
        ));

    let bounds = resolve_bounds(overrides.min_chars, overrides.max_chars, &file.extract)?;

    Ok(Settings {
        remote,
        root,
        catalog: overrides
            .catalog
            .or(file.library.catalog)
            .unwrap_or_default(),
        filter,
        bounds,
        config_file,
    })
}

/// Sentence bounds from flags, the config file (if any), and defaults.
///
/// Used on its own by commands that never open a session.
pub fn load_bounds(
    min_chars: Option<usize>,
    max_chars: Option<usize>,
) -> Result<SentenceBounds, ConfigError> {
    let extract = match find_config_file() {
        Some(path) => load_config_file(&path)?.extract,
        None => ExtractSection::default(),
    };
    resolve_bounds(min_chars, max_chars, &extract)
}

fn resolve_bounds(
    min_chars: Option<usize>,
    max_chars: Option<usize>,
    extract: &ExtractSection,
) -> Result<SentenceBounds, ConfigError> {
    let defaults = SentenceBounds::default();
    let bounds = SentenceBounds {
        min_chars: min_chars.or(extract.min_chars).unwrap_or(defaults.min_chars),
        max_chars: max_chars.or(extract.max_chars).unwrap_or(defaults.max_chars),
    };

    if bounds.min_chars >= bounds.max_chars {
        return Err(ConfigError::InvalidBounds {
            min: bounds.min_chars,
            max: bounds.max_chars,
        });
    }

    Ok(bounds)
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
