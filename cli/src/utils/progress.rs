use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use ghsync::utils::progress::{Progress, RepoInfo};
use ghsync::utils::style_message::{StyleMessage, GREEN_BOLD, PURPLE_BOLD, RED_BOLD};

/// Terminal progress: one total bar plus a spinner per running repository.
#[derive(Clone, Default)]
pub(crate) struct MultiProgress {
    multi_progress: Arc<Mutex<indicatif::MultiProgress>>,
    main_progress_bar: Arc<Mutex<Option<ProgressBar>>>,
    spinner_progress_bars: Arc<Mutex<HashMap<usize, ProgressBar>>>,
    total_repos: Arc<AtomicUsize>,
}

impl MultiProgress {
    fn create_total_bar(&self, total: usize) {
        let main_progress_bar = self
            .multi_progress
            .lock()
            .unwrap()
            .add(ProgressBar::new(total as u64));
        main_progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {percent}% [{bar:30.green/white}] {pos}/{len}")
                .unwrap()
                .progress_chars("=>-"),
        );
        main_progress_bar.enable_steady_tick(Duration::from_millis(500));
        let _ = self
            .main_progress_bar
            .lock()
            .unwrap()
            .insert(main_progress_bar);
    }

    fn create_progress_bar(&self, index: usize) -> ProgressBar {
        let progress_bar = self
            .multi_progress
            .lock()
            .unwrap()
            .add(ProgressBar::new_spinner());
        progress_bar.set_style(
            ProgressStyle::with_template("{spinner:.green.dim.bold} {msg} ")
                .unwrap()
                .tick_chars("/-\\| "),
        );
        progress_bar.enable_steady_tick(Duration::from_millis(500));
        self.spinner_progress_bars
            .lock()
            .unwrap()
            .insert(index, progress_bar.clone());
        progress_bar
    }

    #[inline]
    fn prefix(&self, index: usize) -> String {
        format!(
            "[{:02}/{:02}]",
            index,
            self.total_repos.load(Ordering::Relaxed)
        )
    }

    fn spinner_info(&self, repo_info: &RepoInfo, desc: StyleMessage) -> String {
        format!(
            "{:>9} {}: {}",
            self.prefix(repo_info.index),
            &PURPLE_BOLD.paint(repo_info.name()),
            desc
        )
    }

    fn spinner_end(&self, repo_info: &RepoInfo, status: StyleMessage, is_success: bool) -> String {
        let style = match is_success {
            true => &*GREEN_BOLD,
            false => &*RED_BOLD,
        };
        format!(
            "{:>9} {} {}: {}",
            StyleMessage::repo_end(is_success),
            self.prefix(repo_info.index),
            style.paint(repo_info.name()),
            status,
        )
    }

    fn finish_repo(&self, repo_info: &RepoInfo, message: StyleMessage, is_success: bool) {
        let pb = self
            .spinner_progress_bars
            .lock()
            .unwrap()
            .remove(&repo_info.index);
        if let Some(pb) = pb {
            if !pb.is_finished() {
                pb.finish_with_message(self.spinner_end(repo_info, message, is_success));
            }
        }

        if let Some(main) = self.main_progress_bar.lock().unwrap().as_ref() {
            main.inc(1);
        }
    }
}

impl Progress for MultiProgress {
    fn repos_start(&self, total: usize) {
        self.total_repos.store(total, Ordering::Relaxed);
        self.create_total_bar(total);
    }

    fn repos_end(&self) {
        if let Some(main) = self.main_progress_bar.lock().unwrap().as_ref() {
            if !main.is_finished() {
                main.finish();
            }
        }
    }

    fn repo_start(&self, repo_info: &RepoInfo, message: StyleMessage) {
        let pb = self.create_progress_bar(repo_info.index);
        pb.set_message(truncate_spinner_msg(self.spinner_info(repo_info, message)));
    }

    fn repo_info(&self, repo_info: &RepoInfo, message: StyleMessage) {
        if let Some(pb) = self
            .spinner_progress_bars
            .lock()
            .unwrap()
            .get(&repo_info.index)
        {
            pb.set_message(truncate_spinner_msg(self.spinner_info(repo_info, message)));
        }
    }

    fn repo_end(&self, repo_info: &RepoInfo, message: StyleMessage) {
        self.finish_repo(repo_info, message, true);
    }

    fn repo_error(&self, repo_info: &RepoInfo, message: StyleMessage) {
        self.finish_repo(repo_info, message, false);
    }
}

pub fn get_terminal_width() -> usize {
    match term_size::dimensions() {
        Some((width, _)) if width > 10 => width - 10,
        _ => 70,
    }
}

pub fn truncate_spinner_msg(msg: impl AsRef<str>) -> String {
    let max_width = get_terminal_width();
    console::truncate_str(msg.as_ref(), max_width, "...").to_string()
}
