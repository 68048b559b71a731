#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use ghsync::ops::{drive, SyncReport, SyncStatus, Worker};
use ghsync::repo::RepoDescriptor;
use ghsync::utils::progress::{Progress, RepoInfo};
use ghsync::utils::StyleMessage;
use tempfile::TempDir;

pub const TIMEOUT: Duration = Duration::from_secs(120);

pub mod failed_message {
    pub const GIT_INIT: &str = "git init failed";
    pub const GIT_COMMIT: &str = "git commit failed";
    pub const GIT_CLONE: &str = "git clone failed";
    pub const GIT_PUSH: &str = "git push failed";
    pub const WRITE_FILE: &str = "write file failed";
}

#[derive(Clone, Default)]
pub struct TestProgress;

impl Progress for TestProgress {
    fn repos_start(&self, _total: usize) {}

    fn repos_end(&self) {}

    fn repo_start(&self, _repo_info: &RepoInfo, _message: StyleMessage) {}

    fn repo_info(&self, _repo_info: &RepoInfo, _message: StyleMessage) {}

    fn repo_end(&self, _repo_info: &RepoInfo, _message: StyleMessage) {}

    fn repo_error(&self, _repo_info: &RepoInfo, _message: StyleMessage) {}
}

pub fn exec_cmd(path: impl AsRef<Path>, cmd: &str, args: &[&str]) -> anyhow::Result<String> {
    let output = std::process::Command::new(cmd)
        .current_dir(path)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()?;
    let stdout = String::from_utf8(output.stdout)?;
    let stderr = String::from_utf8(output.stderr)?;

    match output.status.success() {
        false => Err(anyhow::anyhow!(stderr)),
        true => Ok(stdout),
    }
}

pub fn create_test_dir(name: &str) -> TempDir {
    tempfile::Builder::new()
        .prefix(name)
        .tempdir()
        .expect("create temp dir failed")
}

fn git_commit(work: &Path, message: &str) {
    exec_cmd(work, "git", &["add", "-A"]).expect(failed_message::GIT_COMMIT);
    exec_cmd(
        work,
        "git",
        &[
            "-c",
            "user.name=ghsync",
            "-c",
            "user.email=ghsync@example.com",
            "-c",
            "commit.gpgsign=false",
            "commit",
            "-m",
            message,
        ],
    )
    .expect(failed_message::GIT_COMMIT);
}

/// Create `<base>/remotes/<name>.git` with one commit on `main`, plus a
/// work tree in `<base>/work/<name>` used to push later commits.
pub fn create_remote(base: &Path, name: &str) -> PathBuf {
    let work = base.join("work").join(name);
    std::fs::create_dir_all(&work).unwrap();
    exec_cmd(&work, "git", &["init"]).expect(failed_message::GIT_INIT);
    exec_cmd(&work, "git", &["symbolic-ref", "HEAD", "refs/heads/main"])
        .expect(failed_message::GIT_INIT);

    std::fs::write(work.join("README.md"), format!("# {}\n", name))
        .expect(failed_message::WRITE_FILE);
    git_commit(&work, "init");

    let remotes = base.join("remotes");
    std::fs::create_dir_all(&remotes).unwrap();
    let bare = remotes.join(format!("{}.git", name));
    exec_cmd(
        base,
        "git",
        &["clone", "--bare", work.to_str().unwrap(), bare.to_str().unwrap()],
    )
    .expect(failed_message::GIT_CLONE);
    bare
}

/// Commit `file` in the work tree of `name` and push it to the bare remote.
pub fn push_commit(base: &Path, name: &str, file: &str, content: &str) {
    let work = base.join("work").join(name);
    let bare = base.join("remotes").join(format!("{}.git", name));
    std::fs::write(work.join(file), content).expect(failed_message::WRITE_FILE);
    git_commit(&work, &format!("add {}", file));
    exec_cmd(&work, "git", &["push", bare.to_str().unwrap(), "main"])
        .expect(failed_message::GIT_PUSH);
}

pub fn head_of(path: &Path, rev: &str) -> String {
    exec_cmd(path, "git", &["rev-parse", rev])
        .expect("git rev-parse failed")
        .trim()
        .to_string()
}

pub fn descriptor(name: &str, url: &Path) -> RepoDescriptor {
    RepoDescriptor::new(name, url.to_str().unwrap(), Some("main".to_string()))
}

pub fn run<W: Worker>(repos: &[RepoDescriptor], concurrency: usize, worker: &W) -> SyncReport {
    drive(
        repos,
        concurrency,
        worker,
        &TestProgress,
        &AtomicBool::new(false),
    )
    .expect("drive failed")
}

pub fn status_of(report: &SyncReport, name: &str) -> SyncStatus {
    report
        .outcomes()
        .iter()
        .find(|o| o.name == name)
        .unwrap_or_else(|| panic!("no outcome for {}", name))
        .status
}
