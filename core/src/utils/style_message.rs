use ansi_term::{Colour, Style};
use lazy_static::lazy_static;
use std::fmt::{Display, Formatter};
use std::path::Path;

use crate::utils::path::PathExtension;

lazy_static! {
    pub static ref RED: Style = Style::new().fg(Colour::Red);
    pub static ref BLUE: Style = Style::new().fg(Colour::Blue);
    pub static ref YELLOW: Style = Style::new().fg(Colour::Yellow);
    pub static ref RED_BOLD: Style = Style::new().fg(Colour::Red).bold();
    pub static ref GREEN_BOLD: Style = Style::new().fg(Colour::Green).bold();
    pub static ref YELLOW_BOLD: Style = Style::new().fg(Colour::Yellow).bold();
    pub static ref PURPLE_BOLD: Style = Style::new().fg(Colour::Purple).bold();
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyleText {
    pub content: String,
    pub style: Option<&'static Style>,
}

impl StyleText {
    pub fn to_plain_text(&self) -> &str {
        self.content.as_str()
    }
}

impl Display for StyleText {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.style {
            Some(style) if console::colors_enabled() => {
                f.write_str(&style.paint(&self.content).to_string())
            }
            _ => f.write_str(&self.content),
        }
    }
}

/// A line of terminal output made of optionally styled fragments.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StyleMessage(pub Vec<StyleText>);

impl StyleMessage {
    pub fn new() -> Self {
        StyleMessage::default()
    }

    pub fn plain_text(mut self, content: impl AsRef<str>) -> Self {
        self.0.push(StyleText {
            content: content.as_ref().to_string(),
            style: None,
        });
        self
    }

    pub fn styled_text(mut self, content: impl AsRef<str>, style: &'static Style) -> Self {
        self.0.push(StyleText {
            content: content.as_ref().to_string(),
            style: Some(style),
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn join(mut self, other: StyleMessage) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn to_plain_text(&self) -> String {
        self.0.iter().map(|st| st.to_plain_text()).collect()
    }
}

// format message
impl StyleMessage {
    pub(crate) fn ops_start(ops: impl AsRef<str>, path: impl AsRef<Path>) -> Self {
        StyleMessage::new()
            .plain_text(format!("{} in ", ops.as_ref()))
            .styled_text(path.display_path(), &PURPLE_BOLD)
    }

    pub(crate) fn dir_created(path: impl AsRef<Path>) -> Self {
        StyleMessage::new()
            .plain_text("Created target directory: ")
            .styled_text(path.display_path(), &PURPLE_BOLD)
    }

    pub(crate) fn repos_fetched(fetched: usize, total: usize) -> Self {
        StyleMessage::new()
            .plain_text("Fetched ")
            .styled_text(format!("{}/{}", fetched, total), &GREEN_BOLD)
            .plain_text(" repositories")
    }

    pub(crate) fn repos_excluded(amount: usize) -> Self {
        match amount {
            1 => StyleMessage::new()
                .styled_text("1", &YELLOW_BOLD)
                .plain_text(" repository excluded by filters."),
            _ => StyleMessage::new()
                .styled_text(amount.to_string(), &YELLOW_BOLD)
                .plain_text(" repositories excluded by filters."),
        }
    }

    pub fn repo_end(is_success: bool) -> Self {
        let (sign, style): (&str, &'static Style) = match is_success {
            true => ("√", &*GREEN_BOLD),
            false => ("x", &*RED_BOLD),
        };
        StyleMessage::new().styled_text(sign, style)
    }

    pub(crate) fn repo_detail(name: impl AsRef<str>, detail: impl AsRef<str>, style: &'static Style) -> Self {
        StyleMessage::new()
            .styled_text(name.as_ref(), &PURPLE_BOLD)
            .plain_text(": ")
            .styled_text(detail.as_ref().trim(), style)
    }

    pub(crate) fn git_cloning(url: impl AsRef<str>) -> Self {
        StyleMessage::new()
            .plain_text("clone ")
            .styled_text(url.as_ref(), &BLUE)
            .plain_text("...")
    }

    pub(crate) fn git_fast_forward(branch: impl AsRef<str>) -> Self {
        StyleMessage::new()
            .plain_text("fast-forward ")
            .styled_text(branch.as_ref(), &BLUE)
            .plain_text("...")
    }

    pub(crate) fn git_remote_mismatch(origin: impl AsRef<str>, expected: impl AsRef<str>) -> Self {
        StyleMessage::new()
            .plain_text("origin points to ")
            .styled_text(origin.as_ref(), &BLUE)
            .plain_text(", expected ")
            .styled_text(expected.as_ref(), &BLUE)
    }
}

/// Flatten an error chain into one line, outermost context first.
pub fn error_chain(error: &anyhow::Error) -> String {
    error
        .chain()
        .map(|c| c.to_string().trim().to_string())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(": ")
}

impl Display for StyleMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for text in &self.0 {
            write!(f, "{}", text)?;
        }
        Ok(())
    }
}

impl<T> From<T> for StyleMessage
where
    T: AsRef<str>,
{
    fn from(value: T) -> Self {
        StyleMessage::new().plain_text(value.as_ref())
    }
}
