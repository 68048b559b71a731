use anyhow::Context;
use atomic_counter::{AtomicCounter, RelaxedCounter};
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::config::SyncConfig;
use crate::git;
use crate::github::{list_repos, PageFetcher};
use crate::ops::report::{SyncOutcome, SyncReport, SyncStatus};
use crate::repo::{RepoDescriptor, RepoFilter};
use crate::utils::cmd::exec_cmd_with_progress;
use crate::utils::error::{SyncError, SyncResult};
use crate::utils::logger;
use crate::utils::progress::{Progress, RepoInfo};
use crate::utils::style_message::{error_chain, StyleMessage};

/// Synchronizes one repository below a local root.
///
/// Implementations turn every per-repository problem into a `Failed` or
/// `Skipped` outcome instead of returning an error.
pub trait Worker: Send + Sync {
    fn sync<P: Progress>(&self, repo_info: &RepoInfo, progress: &P) -> SyncOutcome;
}

/// Clones or updates repositories with the `git` executable.
#[derive(Debug, Clone)]
pub struct GitWorker {
    root: PathBuf,
    timeout: Duration,
}

enum LocalState {
    Missing,
    EmptyDir,
    WorkingCopy,
    Foreign(&'static str),
}

enum Action {
    Cloned,
    Updated,
    Skipped(String),
}

impl GitWorker {
    pub fn new(root: impl AsRef<Path>, timeout: Duration) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            timeout,
        }
    }

    fn inner_exec(&self, repo_info: &RepoInfo, progress: &impl Progress) -> anyhow::Result<Action> {
        let repo = repo_info.repo;
        if !repo.has_valid_name() {
            return Ok(Action::Skipped(format!(
                "invalid repository name '{}'",
                repo.name
            )));
        }

        let full_path = repo.local_path(&self.root);
        match inspect(&full_path)? {
            LocalState::Missing | LocalState::EmptyDir => {
                self.exec_clone(repo_info, &full_path, progress)?;
                Ok(Action::Cloned)
            }
            LocalState::WorkingCopy => {
                if !git::has_remote(&full_path, "origin").context("list remotes failed")? {
                    return Ok(Action::Skipped(
                        "working copy has no origin remote".to_string(),
                    ));
                }
                let origin = git::get_remote_url(&full_path, "origin")
                    .context("read origin url failed")?;
                if !repo.urls().any(|url| git::urls_match(&origin, url)) {
                    let msg = StyleMessage::git_remote_mismatch(&origin, &repo.clone_url);
                    return Ok(Action::Skipped(msg.to_plain_text()));
                }

                self.exec_update(repo_info, &full_path, progress)?;
                Ok(Action::Updated)
            }
            LocalState::Foreign(reason) => Ok(Action::Skipped(reason.to_string())),
        }
    }

    fn exec_clone(
        &self,
        repo_info: &RepoInfo,
        full_path: &Path,
        progress: &impl Progress,
    ) -> anyhow::Result<()> {
        let url = &repo_info.repo.clone_url;
        progress.repo_info(repo_info, StyleMessage::git_cloning(url));

        let mut command = git::repo::clone_command(&self.root, url, full_path);
        exec_cmd_with_progress(repo_info, &mut command, self.timeout, progress)
            .context("clone failed")
    }

    fn exec_update(
        &self,
        repo_info: &RepoInfo,
        full_path: &Path,
        progress: &impl Progress,
    ) -> anyhow::Result<()> {
        progress.repo_info(repo_info, "fetch...".into());
        let mut command = git::repo::fetch_all_command(full_path);
        exec_cmd_with_progress(repo_info, &mut command, self.timeout, progress)
            .context("fetch failed")?;

        if let Some(branch) = &repo_info.repo.default_branch {
            self.exec_fast_forward(repo_info, full_path, branch, progress)?;
        }

        progress.repo_info(repo_info, "update submodules...".into());
        let mut command = git::repo::submodule_update_command(full_path);
        exec_cmd_with_progress(repo_info, &mut command, self.timeout, progress)
            .context("submodule update failed")
    }

    /// Bring the local default branch up to its remote counterpart without
    /// discarding anything local.
    fn exec_fast_forward(
        &self,
        repo_info: &RepoInfo,
        full_path: &Path,
        branch: &str,
        progress: &impl Progress,
    ) -> anyhow::Result<()> {
        progress.repo_info(repo_info, StyleMessage::git_fast_forward(branch));

        let checked_out = git::get_current_branch(full_path)
            .map(|current| current == branch)
            .unwrap_or(false);

        let mut command = match checked_out {
            true => git::repo::merge_ff_only_command(full_path, &format!("origin/{}", branch)),
            false if git::local_branch_exists(full_path, branch)? => {
                git::repo::fetch_into_branch_command(full_path, "origin", branch)
            }
            // nothing local to move
            false => return Ok(()),
        };
        exec_cmd_with_progress(repo_info, &mut command, self.timeout, progress)
            .with_context(|| format!("fast-forward {} failed", branch))
    }
}

impl Worker for GitWorker {
    fn sync<P: Progress>(&self, repo_info: &RepoInfo, progress: &P) -> SyncOutcome {
        let name = repo_info.name();
        match self.inner_exec(repo_info, progress) {
            Ok(Action::Cloned) => SyncOutcome::cloned(name),
            Ok(Action::Updated) => SyncOutcome::updated(name),
            Ok(Action::Skipped(reason)) => SyncOutcome::skipped(name, reason),
            Err(e) => SyncOutcome::failed(name, error_chain(&e)),
        }
    }
}

fn inspect(path: &Path) -> anyhow::Result<LocalState> {
    let metadata = match std::fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LocalState::Missing),
        Err(e) => {
            return Err(e).with_context(|| format!("inspect {} failed", path.display()));
        }
    };

    if !metadata.is_dir() {
        return Ok(LocalState::Foreign("path exists but is not a directory"));
    }

    let is_empty = std::fs::read_dir(path)
        .with_context(|| format!("read {} failed", path.display()))?
        .next()
        .is_none();
    if is_empty {
        return Ok(LocalState::EmptyDir);
    }

    match git::is_repository(path) {
        Ok(()) => Ok(LocalState::WorkingCopy),
        Err(_) => Ok(LocalState::Foreign(
            "path exists but is not a git repository",
        )),
    }
}

/// Run `worker` over every repository with at most `concurrency` running at
/// once.
///
/// Always yields exactly one outcome per repository. With a concurrency of 1
/// repositories are processed in order. Once `cancel` is set no further
/// repository is started and the remaining ones are reported as skipped.
pub fn drive<W: Worker, P: Progress>(
    repos: &[RepoDescriptor],
    concurrency: usize,
    worker: &W,
    progress: &P,
    cancel: &AtomicBool,
) -> SyncResult<SyncReport> {
    if concurrency == 0 {
        return Err(SyncError::InvalidConcurrency(concurrency));
    }

    progress.repos_start(repos.len());

    // create thread pool, one thread per concurrent repository
    let counter = RelaxedCounter::new(1);
    let thread_pool = rayon::ThreadPoolBuilder::new()
        .num_threads(concurrency)
        .thread_name(|idx| format!("ghsync-worker-{}", idx))
        .build()?;

    // single item jobs, so a thread picks up the next pending repository as
    // soon as it finishes one
    let outcomes: Vec<SyncOutcome> = thread_pool.install(|| {
        repos
            .par_iter()
            .with_max_len(1)
            .enumerate()
            .map(|(id, repo)| {
                if cancel.load(Ordering::SeqCst) {
                    return SyncOutcome::skipped(&repo.name, "cancelled");
                }

                let index = counter.inc();
                let repo_info = RepoInfo::new(id, index, repo);
                progress.repo_start(&repo_info, "waiting...".into());

                let outcome = worker.sync(&repo_info, progress);
                match outcome.status {
                    SyncStatus::Failed => progress.repo_error(
                        &repo_info,
                        outcome.detail.as_deref().unwrap_or_default().into(),
                    ),
                    status => progress.repo_end(&repo_info, status.to_string().into()),
                }
                outcome
            })
            .collect()
    });

    progress.repos_end();
    Ok(SyncReport::new(outcomes))
}

/// List, filter and synchronize every repository described by `config`.
pub fn sync_repos<F: PageFetcher, P: Progress>(
    config: &SyncConfig,
    fetcher: &F,
    progress: P,
    cancel: &AtomicBool,
) -> SyncResult<SyncReport> {
    config.validate()?;
    let filter = RepoFilter::from_config(config)?;

    logger::info(StyleMessage::ops_start("sync repos", &config.root));

    let repos = list_repos(fetcher)?;
    let (repos, excluded) = filter.apply(repos);
    if excluded > 0 {
        logger::info(StyleMessage::repos_excluded(excluded));
    }

    prepare_root(&config.root)?;

    logger::info(format!(
        "Comparing and syncing {} repositories, {} at a time...",
        repos.len(),
        config.concurrency
    ));

    let worker = GitWorker::new(&config.root, config.timeout);
    drive(&repos, config.concurrency, &worker, &progress, cancel)
}

fn prepare_root(root: &Path) -> SyncResult<()> {
    if root.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(root).map_err(|source| SyncError::CreateDir {
        path: root.to_path_buf(),
        source,
    })?;
    logger::info(StyleMessage::dir_created(root));
    Ok(())
}
