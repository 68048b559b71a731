use clap::{ArgAction, Parser};
use std::path::PathBuf;
use std::time::Duration;

use ghsync::config::{Affiliation, SyncConfig};

#[derive(Parser, Debug)]
#[command(
    name = "ghsync",
    author,
    version,
    about = "Clone or update every repository of a GitHub account into a local directory",
    long_about = None,
    arg_required_else_help(true)
)]
pub(crate) struct Cli {
    /// The destination directory, created if absent
    #[arg(value_name = "DIRECTORY")]
    pub directory: PathBuf,

    /// Maximum number of repositories synced at the same time
    #[arg(short, long, value_name = "N", value_parser = parse_positive::<usize>)]
    pub concurrency: Option<usize>,

    /// Use specified config file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Repository affiliations to list: owner, collaborator, organization-member
    #[arg(long = "affiliation", value_name = "A", value_delimiter = ',')]
    pub affiliations: Vec<Affiliation>,

    /// Ignore repositories whose name matches the glob
    #[arg(long, value_name = "GLOB")]
    pub ignore: Vec<String>,

    /// Skip archived repositories
    #[arg(long, action = ArgAction::SetTrue)]
    pub skip_archived: bool,

    /// Skip forked repositories
    #[arg(long, action = ArgAction::SetTrue)]
    pub skip_forks: bool,

    /// Clone over SSH instead of HTTPS
    #[arg(long, action = ArgAction::SetTrue)]
    pub ssh: bool,

    /// Timeout of a single git command, in seconds
    #[arg(long, value_name = "SECS", value_parser = parse_positive::<u64>)]
    pub timeout: Option<u64>,

    /// GitHub GraphQL endpoint
    #[arg(long, value_name = "URL")]
    pub endpoint: Option<String>,

    /// Print debug messages, including git command lines
    #[arg(short, long, action = ArgAction::SetTrue)]
    pub verbose: bool,
}

impl Cli {
    /// Overlay the values given on the command line.
    pub fn apply(&self, config: &mut SyncConfig) {
        if let Some(concurrency) = self.concurrency {
            config.concurrency = concurrency;
        }
        if !self.affiliations.is_empty() {
            config.affiliations = self.affiliations.clone();
        }
        if !self.ignore.is_empty() {
            config.ignore.extend(self.ignore.iter().cloned());
        }
        config.skip_archived |= self.skip_archived;
        config.skip_forks |= self.skip_forks;
        config.ssh |= self.ssh;
        if let Some(timeout) = self.timeout {
            config.timeout = Duration::from_secs(timeout);
        }
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
    }
}

fn parse_positive<T>(value: &str) -> Result<T, String>
where
    T: std::str::FromStr + PartialEq + Default,
{
    match value.parse::<T>() {
        Ok(n) if n == T::default() => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(_) => Err(format!("'{}' is not a positive number", value)),
    }
}
