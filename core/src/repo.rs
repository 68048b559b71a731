use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};

use crate::config::SyncConfig;
use crate::utils::error::SyncResult;

/// The minimal metadata needed to locate and clone one remote repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoDescriptor {
    pub name: String,
    pub clone_url: String,
    /// Other URLs naming the same remote, e.g. the SSH form of an HTTPS url.
    pub alternate_urls: Vec<String>,
    /// `None` for a repository without any commit.
    pub default_branch: Option<String>,
    pub is_fork: bool,
    pub is_archived: bool,
}

impl RepoDescriptor {
    pub fn new(
        name: impl Into<String>,
        clone_url: impl Into<String>,
        default_branch: Option<String>,
    ) -> Self {
        Self {
            name: name.into(),
            clone_url: clone_url.into(),
            alternate_urls: Vec::new(),
            default_branch,
            is_fork: false,
            is_archived: false,
        }
    }

    /// Where this repository lives under `root`.
    pub fn local_path(&self, root: impl AsRef<Path>) -> PathBuf {
        root.as_ref().join(&self.name)
    }

    /// A name is only usable as a single path component below the root.
    pub fn has_valid_name(&self) -> bool {
        let name = self.name.as_str();
        !name.is_empty()
            && name != "."
            && name != ".."
            && !name.contains(['/', '\\'])
            && !name.contains('\0')
    }

    pub fn urls(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.clone_url.as_str()).chain(self.alternate_urls.iter().map(String::as_str))
    }
}

/// Drops repositories excluded by name patterns, archive or fork state.
#[derive(Debug, Clone)]
pub struct RepoFilter {
    ignore: GlobSet,
    skip_archived: bool,
    skip_forks: bool,
}

impl RepoFilter {
    pub fn new(
        ignore: &[impl AsRef<str>],
        skip_archived: bool,
        skip_forks: bool,
    ) -> SyncResult<Self> {
        let mut builder = GlobSetBuilder::new();
        for pattern in ignore {
            builder.add(Glob::new(pattern.as_ref())?);
        }
        Ok(Self {
            ignore: builder.build()?,
            skip_archived,
            skip_forks,
        })
    }

    pub fn from_config(config: &SyncConfig) -> SyncResult<Self> {
        Self::new(&config.ignore, config.skip_archived, config.skip_forks)
    }

    pub fn is_excluded(&self, repo: &RepoDescriptor) -> bool {
        self.ignore.is_match(&repo.name)
            || (self.skip_archived && repo.is_archived)
            || (self.skip_forks && repo.is_fork)
    }

    /// Returns the kept repositories, in listing order, and how many were dropped.
    pub fn apply(&self, repos: Vec<RepoDescriptor>) -> (Vec<RepoDescriptor>, usize) {
        let total = repos.len();
        let kept: Vec<_> = repos
            .into_iter()
            .filter(|repo| !self.is_excluded(repo))
            .collect();
        let excluded = total - kept.len();
        (kept, excluded)
    }
}
