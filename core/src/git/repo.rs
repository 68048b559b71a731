use anyhow::anyhow;
use std::path::Path;
use std::process::Command;

use crate::utils::cmd::{exec_git, git_command};

pub fn is_repository(path: impl AsRef<Path>) -> Result<(), anyhow::Error> {
    if path.as_ref().join(".git").is_dir() {
        let args = ["rev-parse", "--show-cdup"];
        if let Ok(output) = exec_git(path, &args) {
            if output.trim().is_empty() {
                return Ok(());
            }
        }
    }

    Err(anyhow!("repository not found!"))
}

/// Fails on a detached HEAD.
pub fn get_current_branch(path: impl AsRef<Path>) -> Result<String, anyhow::Error> {
    let args = ["branch", "--show-current"];
    let output = exec_git(&path, &args)?;

    match output.trim() {
        "" => Err(anyhow!("current branch not found.")),
        branch => Ok(branch.to_string()),
    }
}

pub fn local_branch_exists(
    path: impl AsRef<Path>,
    branch: impl AsRef<str>,
) -> Result<bool, anyhow::Error> {
    let full_ref = format!("refs/heads/{}", branch.as_ref());
    let args = ["show-ref", "--verify", "--quiet", &full_ref];
    // show-ref exits 1 without output when the ref is missing
    Ok(exec_git(path, &args).is_ok())
}

/// `git clone` of `url` into `dest`, run from `dest`'s parent.
pub fn clone_command(parent: impl AsRef<Path>, url: &str, dest: &Path) -> Command {
    let mut command = git_command(parent);
    command
        .args(["clone", "--recurse-submodules", "--progress", url])
        .arg(dest);
    command
}

pub fn fetch_all_command(path: impl AsRef<Path>) -> Command {
    let mut command = git_command(path);
    command.args(["fetch", "--all", "--prune", "--tags", "--progress"]);
    command
}

/// Fast-forward the checked out branch; git refuses to clobber local changes.
pub fn merge_ff_only_command(path: impl AsRef<Path>, remote_ref: &str) -> Command {
    let mut command = git_command(path);
    command.args(["merge", "--ff-only", remote_ref]);
    command
}

/// Fast-forward a branch that is not checked out, without touching the tree.
pub fn fetch_into_branch_command(path: impl AsRef<Path>, remote: &str, branch: &str) -> Command {
    let mut command = git_command(path);
    command.args(["fetch", "--progress", remote]);
    command.arg(format!("{}:{}", branch, branch));
    command
}

pub fn submodule_update_command(path: impl AsRef<Path>) -> Command {
    let mut command = git_command(path);
    command.args(["submodule", "update", "--init", "--recursive", "--progress"]);
    command
}
