use anyhow::anyhow;
use std::path::Path;

use crate::utils::cmd::exec_git;

pub fn get_remote_url(path: impl AsRef<Path>, name: impl AsRef<str>) -> Result<String, anyhow::Error> {
    let name = name.as_ref();
    let args = ["remote", "get-url", name];
    let output = exec_git(path, &args)?;

    match output.trim().lines().next() {
        Some(url) if !url.trim().is_empty() => Ok(url.trim().to_string()),
        _ => Err(anyhow!("remote {} not found", name)),
    }
}

/// Whether `name` is among the remotes configured in `path`.
pub fn has_remote(path: impl AsRef<Path>, name: impl AsRef<str>) -> Result<bool, anyhow::Error> {
    let output = exec_git(path, &["remote"])?;
    Ok(output.lines().any(|line| line.trim() == name.as_ref()))
}

/// Reduce a remote url to `host/path` so that https, ssh and scp-like
/// spellings of the same repository compare equal. Only the host is
/// case-insensitive; ports and local paths are kept as written.
pub fn normalize_url(url: impl AsRef<str>) -> String {
    let url = url.as_ref().trim();

    let (authority, path) = match url.find("://") {
        Some(idx) => {
            let rest = &url[idx + 3..];
            match rest.find('/') {
                Some(slash) => (&rest[..slash], &rest[slash..]),
                None => (rest, ""),
            }
        }
        // scp-like `user@host:owner/repo`, or a plain local path
        None => match url.find(':') {
            Some(colon) if !url[..colon].contains(['/', '\\']) => {
                (&url[..colon], &url[colon + 1..])
            }
            _ => ("", url),
        },
    };

    // drop user info, e.g. `git@` or `user:token@`
    let host = match authority.rfind('@') {
        Some(at) => &authority[at + 1..],
        None => authority,
    }
    .to_lowercase();

    let path = path.trim_end_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let path = path.trim_end_matches('/');

    match host.is_empty() {
        true => path.to_string(),
        false => format!("{}/{}", host, path.trim_start_matches('/')),
    }
}

pub fn urls_match(a: impl AsRef<str>, b: impl AsRef<str>) -> bool {
    normalize_url(a) == normalize_url(b)
}
