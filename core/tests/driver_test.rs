use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use ghsync::ops::{drive, SyncOutcome, SyncReport, SyncStatus, Worker};
use ghsync::repo::RepoDescriptor;
use ghsync::utils::error::SyncError;
use ghsync::utils::progress::{Progress, RepoInfo};

use crate::common::TestProgress;

mod common;

/// Simulated worker: sleeps, records concurrency and start order.
#[derive(Default)]
struct SimWorker {
    delay: Duration,
    fail_every: Option<usize>,
    cancel_after: Option<(usize, &'static AtomicBool)>,
    active: AtomicUsize,
    max_active: AtomicUsize,
    started: Mutex<Vec<String>>,
}

impl SimWorker {
    fn new(delay_ms: u64) -> Self {
        Self {
            delay: Duration::from_millis(delay_ms),
            ..Default::default()
        }
    }

    fn started(&self) -> Vec<String> {
        self.started.lock().unwrap().clone()
    }
}

impl Worker for SimWorker {
    fn sync<P: Progress>(&self, repo_info: &RepoInfo, _progress: &P) -> SyncOutcome {
        let name = repo_info.name();
        let started = {
            let mut started = self.started.lock().unwrap();
            started.push(name.to_string());
            started.len()
        };
        if let Some((after, flag)) = self.cancel_after {
            if started >= after {
                flag.store(true, Ordering::SeqCst);
            }
        }

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        std::thread::sleep(self.delay);
        self.active.fetch_sub(1, Ordering::SeqCst);

        match self.fail_every {
            Some(n) if repo_info.id % n == 0 => SyncOutcome::failed(name, "simulated failure"),
            _ => SyncOutcome::updated(name),
        }
    }
}

fn repos(count: usize) -> Vec<RepoDescriptor> {
    (0..count)
        .map(|i| {
            RepoDescriptor::new(
                format!("repo-{:02}", i),
                format!("https://github.com/octo/repo-{:02}.git", i),
                Some("main".to_string()),
            )
        })
        .collect()
}

fn names(report: &SyncReport) -> Vec<String> {
    report.outcomes().iter().map(|o| o.name.clone()).collect()
}

fn drive_with(repos: &[RepoDescriptor], concurrency: usize, worker: &SimWorker) -> SyncReport {
    drive(
        repos,
        concurrency,
        worker,
        &TestProgress,
        &AtomicBool::new(false),
    )
    .unwrap()
}

#[test]
fn drive_yields_one_outcome_per_repo() {
    let input = repos(6);
    for concurrency in 1..=input.len() + 2 {
        let worker = SimWorker::new(1);
        let report = drive_with(&input, concurrency, &worker);

        assert_eq!(report.total(), input.len(), "concurrency {}", concurrency);
        let mut got = names(&report);
        got.sort();
        let want: Vec<_> = input.iter().map(|r| r.name.clone()).collect();
        assert_eq!(got, want);
    }
}

#[test]
fn drive_empty_list_is_empty_report() {
    let worker = SimWorker::new(0);
    let report = drive_with(&[], 3, &worker);
    assert_eq!(report.total(), 0);
    assert!(!report.has_failures());
}

/// 并发为 1 时按输入顺序依次处理
#[test]
fn drive_sequential_keeps_input_order() {
    let input = repos(8);
    let worker = SimWorker::new(2);
    let report = drive_with(&input, 1, &worker);

    let want: Vec<_> = input.iter().map(|r| r.name.clone()).collect();
    assert_eq!(worker.started(), want);
    assert_eq!(names(&report), want);
    assert_eq!(worker.max_active.load(Ordering::SeqCst), 1);
}

#[test]
fn drive_concurrent_matches_sequential_outcomes() {
    let input = repos(10);

    let sequential = SimWorker {
        fail_every: Some(3),
        ..SimWorker::new(1)
    };
    let concurrent = SimWorker {
        fail_every: Some(3),
        ..SimWorker::new(1)
    };

    let expected = drive_with(&input, 1, &sequential);
    let report = drive_with(&input, 4, &concurrent);

    assert_eq!(report.outcomes(), expected.outcomes());
}

/// 同时运行的任务数不超过并发数, 且能达到并发数
#[test]
fn drive_respects_concurrency_bound() {
    let input = repos(16);
    let worker = SimWorker::new(50);
    let report = drive_with(&input, 4, &worker);

    assert_eq!(report.total(), 16);
    assert_eq!(worker.max_active.load(Ordering::SeqCst), 4);
    assert_eq!(worker.active.load(Ordering::SeqCst), 0);
}

#[test]
fn drive_concurrency_above_repo_count() {
    let input = repos(3);
    let worker = SimWorker::new(50);
    let report = drive_with(&input, 8, &worker);

    assert_eq!(report.total(), 3);
    assert!(worker.max_active.load(Ordering::SeqCst) <= 3);
}

#[test]
fn drive_failures_do_not_stop_the_run() {
    let input = repos(9);
    let worker = SimWorker {
        fail_every: Some(2),
        ..SimWorker::new(1)
    };
    let report = drive_with(&input, 3, &worker);

    assert_eq!(report.total(), 9);
    assert_eq!(worker.started().len(), 9);
    assert!(report.has_failures());
    assert_eq!(report.count(SyncStatus::Failed), 5);
    assert_eq!(report.count(SyncStatus::Updated), 4);
    assert!(report
        .failures()
        .all(|o| o.detail.as_deref() == Some("simulated failure")));
}

#[test]
fn drive_zero_concurrency_is_rejected() {
    let worker = SimWorker::new(0);
    let res = drive(
        &repos(2),
        0,
        &worker,
        &TestProgress,
        &AtomicBool::new(false),
    );

    assert!(matches!(res, Err(SyncError::InvalidConcurrency(0))));
    assert!(worker.started().is_empty());
}

/// 取消之后不再启动新的仓库, 未启动的仓库记为 skipped
#[test]
fn drive_cancel_skips_unstarted_repos() {
    static CANCEL: AtomicBool = AtomicBool::new(false);

    let input = repos(6);
    let worker = SimWorker {
        cancel_after: Some((2, &CANCEL)),
        ..SimWorker::new(5)
    };
    let report = drive(&input, 1, &worker, &TestProgress, &CANCEL).unwrap();

    assert_eq!(report.total(), 6);
    assert_eq!(worker.started().len(), 2);
    assert_eq!(report.count(SyncStatus::Updated), 2);
    assert_eq!(report.count(SyncStatus::Skipped), 4);
    assert!(report
        .with_status(SyncStatus::Skipped)
        .all(|o| o.detail.as_deref() == Some("cancelled")));
    assert_eq!(names(&report), input.iter().map(|r| r.name.clone()).collect::<Vec<_>>());
}

#[test]
fn drive_cancelled_before_start() {
    let input = repos(4);
    let worker = SimWorker::new(0);
    let report = drive(&input, 2, &worker, &TestProgress, &AtomicBool::new(true)).unwrap();

    assert_eq!(report.total(), 4);
    assert!(worker.started().is_empty());
    assert_eq!(report.count(SyncStatus::Skipped), 4);
}
