//! Run configuration: defaults, an optional TOML file and command line values.

use serde::{Deserialize, Serialize};
use std::env;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/graphql";
pub const DEFAULT_CONCURRENCY: usize = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Environment variables searched for the access token, in order.
pub const TOKEN_ENV_VARS: [&str; 2] = ["GITHUB_API_TOKEN", "GITHUB_TOKEN"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GITHUB_API_TOKEN not found in environment variables or .env file")]
    MissingToken,

    #[error("Invalid concurrency {0}, at least 1 is required")]
    InvalidConcurrency(usize),

    #[error("Invalid timeout, at least 1 second is required")]
    InvalidTimeout,

    #[error("Read config file {} failed: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse config file {} failed: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Relation between the viewer and a listed repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Affiliation {
    Owner,
    Collaborator,
    OrganizationMember,
}

impl Affiliation {
    pub fn as_graphql(&self) -> &'static str {
        match self {
            Affiliation::Owner => "OWNER",
            Affiliation::Collaborator => "COLLABORATOR",
            Affiliation::OrganizationMember => "ORGANIZATION_MEMBER",
        }
    }
}

impl FromStr for Affiliation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('_', "-").as_str() {
            "owner" => Ok(Affiliation::Owner),
            "collaborator" => Ok(Affiliation::Collaborator),
            "organization-member" => Ok(Affiliation::OrganizationMember),
            _ => Err(format!(
                "unknown affiliation '{}', expected owner, collaborator or organization-member",
                s
            )),
        }
    }
}

impl Display for Affiliation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Affiliation::Owner => "owner",
            Affiliation::Collaborator => "collaborator",
            Affiliation::OrganizationMember => "organization-member",
        };
        f.write_str(name)
    }
}

/// Everything one synchronization run needs, threaded explicitly into the
/// lister and the driver.
#[derive(Clone)]
pub struct SyncConfig {
    pub token: String,
    pub root: PathBuf,
    pub concurrency: usize,
    pub affiliations: Vec<Affiliation>,
    pub ignore: Vec<String>,
    pub skip_archived: bool,
    pub skip_forks: bool,
    pub ssh: bool,
    pub timeout: Duration,
    pub endpoint: String,
}

impl SyncConfig {
    pub fn new(token: impl Into<String>, root: impl AsRef<Path>) -> Self {
        Self {
            token: token.into(),
            root: root.as_ref().to_path_buf(),
            concurrency: DEFAULT_CONCURRENCY,
            affiliations: vec![Affiliation::Owner],
            ignore: Vec::new(),
            skip_archived: false,
            skip_forks: false,
            ssh: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        }
    }

    /// Overlay values present in a config file.
    pub fn merge_file(&mut self, file: ConfigFile) {
        if let Some(concurrency) = file.concurrency {
            self.concurrency = concurrency;
        }
        if let Some(affiliations) = file.affiliations {
            self.affiliations = affiliations;
        }
        if let Some(ignore) = file.ignore {
            self.ignore = ignore;
        }
        if let Some(skip_archived) = file.skip_archived {
            self.skip_archived = skip_archived;
        }
        if let Some(skip_forks) = file.skip_forks {
            self.skip_forks = skip_forks;
        }
        if let Some(ssh) = file.ssh {
            self.ssh = ssh;
        }
        if let Some(timeout) = file.timeout {
            self.timeout = Duration::from_secs(timeout);
        }
        if let Some(endpoint) = file.endpoint {
            self.endpoint = endpoint;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.token.trim().is_empty() {
            return Err(ConfigError::MissingToken);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency(self.concurrency));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout);
        }
        Ok(())
    }
}

// keep the token out of debug output
impl std::fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncConfig")
            .field("token", &"***")
            .field("root", &self.root)
            .field("concurrency", &self.concurrency)
            .field("affiliations", &self.affiliations)
            .field("ignore", &self.ignore)
            .field("skip_archived", &self.skip_archived)
            .field("skip_forks", &self.skip_forks)
            .field("ssh", &self.ssh)
            .field("timeout", &self.timeout)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

/// Optional settings file. The token is deliberately not accepted here.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ConfigFile {
    pub concurrency: Option<usize>,
    pub affiliations: Option<Vec<Affiliation>>,
    pub ignore: Option<Vec<String>>,
    pub skip_archived: Option<bool>,
    pub skip_forks: Option<bool>,
    pub ssh: Option<bool>,
    /// seconds
    pub timeout: Option<u64>,
    pub endpoint: Option<String>,
}

impl ConfigFile {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// First non-empty token found in [`TOKEN_ENV_VARS`].
pub fn token_from_env() -> Option<String> {
    TOKEN_ENV_VARS
        .iter()
        .filter_map(|name| env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}
