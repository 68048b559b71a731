//! Thin wrappers over the `git` executable.

pub mod remote;
pub mod repo;

pub use remote::{get_remote_url, has_remote, normalize_url, urls_match};
pub use repo::{get_current_branch, is_repository, local_branch_exists};
