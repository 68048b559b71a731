use std::fmt::{Display, Formatter};

use crate::utils::style_message::{GREEN_BOLD, RED, RED_BOLD, YELLOW, YELLOW_BOLD};
use crate::utils::StyleMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncStatus {
    Cloned,
    Updated,
    Failed,
    Skipped,
}

impl Display for SyncStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SyncStatus::Cloned => "cloned",
            SyncStatus::Updated => "updated",
            SyncStatus::Failed => "failed",
            SyncStatus::Skipped => "skipped",
        };
        f.write_str(name)
    }
}

/// Result of one synchronization attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    pub name: String,
    pub status: SyncStatus,
    pub detail: Option<String>,
}

impl SyncOutcome {
    pub fn cloned(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: SyncStatus::Cloned,
            detail: None,
        }
    }

    pub fn updated(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: SyncStatus::Updated,
            detail: None,
        }
    }

    pub fn failed(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: SyncStatus::Failed,
            detail: Some(detail.into()),
        }
    }

    pub fn skipped(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: SyncStatus::Skipped,
            detail: Some(detail.into()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == SyncStatus::Failed
    }
}

/// Every outcome of one run, one per repository handed to the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    outcomes: Vec<SyncOutcome>,
}

impl SyncReport {
    pub fn new(outcomes: Vec<SyncOutcome>) -> Self {
        Self { outcomes }
    }

    pub fn outcomes(&self) -> &[SyncOutcome] {
        &self.outcomes
    }

    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    pub fn count(&self, status: SyncStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn with_status(&self, status: SyncStatus) -> impl Iterator<Item = &SyncOutcome> {
        self.outcomes.iter().filter(move |o| o.status == status)
    }

    pub fn failures(&self) -> impl Iterator<Item = &SyncOutcome> {
        self.with_status(SyncStatus::Failed)
    }

    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(SyncOutcome::is_failed)
    }
}

/// Human readable summary: totals per status, then every failure and skip
/// with its detail.
pub fn render(report: &SyncReport) -> StyleMessage {
    let failed = report.count(SyncStatus::Failed);
    let skipped = report.count(SyncStatus::Skipped);

    let mut msg = StyleMessage::new()
        .plain_text("sync finished! ")
        .styled_text(report.total().to_string(), &GREEN_BOLD)
        .plain_text(" repositories: ")
        .plain_text(format!(
            "{} cloned, {} updated, ",
            report.count(SyncStatus::Cloned),
            report.count(SyncStatus::Updated)
        ));
    msg = match skipped {
        0 => msg.plain_text("0 skipped, "),
        _ => msg
            .styled_text(skipped.to_string(), &YELLOW_BOLD)
            .plain_text(" skipped, "),
    };
    msg = match failed {
        0 => msg.plain_text("0 failed."),
        _ => msg
            .styled_text(failed.to_string(), &RED_BOLD)
            .plain_text(" failed."),
    };

    if failed > 0 {
        msg = msg.plain_text("\n\nFailures:");
        for outcome in report.failures() {
            msg = msg
                .plain_text("\n  ")
                .join(detail_line(outcome, &RED));
        }
    }

    if skipped > 0 {
        msg = msg.plain_text("\n\nSkipped:");
        for outcome in report.with_status(SyncStatus::Skipped) {
            msg = msg
                .plain_text("\n  ")
                .join(detail_line(outcome, &YELLOW));
        }
    }
    msg
}

fn detail_line(outcome: &SyncOutcome, style: &'static ansi_term::Style) -> StyleMessage {
    StyleMessage::repo_detail(
        &outcome.name,
        outcome.detail.as_deref().unwrap_or("no detail"),
        style,
    )
}
