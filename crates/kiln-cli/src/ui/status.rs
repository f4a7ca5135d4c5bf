//! Live build board: one progress bar per artifact.

use crate::dev::{AggregateState, Render};
use crate::ui::{format_size, format_status_line, is_ci};
use indexmap::IndexMap;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use parking_lot::Mutex;

/// Terminal renderer for the build tracker.
///
/// Bars are created on first sight of an artifact and kept in the order the
/// tracker lists them. Outside a terminal the board draws nothing.
pub struct StatusBoard {
    multi: MultiProgress,
    header: ProgressBar,
    bars: Mutex<IndexMap<String, ProgressBar>>,
    footer: ProgressBar,
}

impl StatusBoard {
    pub fn new() -> Self {
        let target = if Self::should_show() {
            ProgressDrawTarget::stderr()
        } else {
            ProgressDrawTarget::hidden()
        };
        Self::with_draw_target(target)
    }

    pub fn with_draw_target(target: ProgressDrawTarget) -> Self {
        let multi = MultiProgress::with_draw_target(target);
        let header = multi.add(ProgressBar::new(0));
        header.set_style(message_style());
        header.set_message(format!("{}", "waiting for a port...".dimmed()));
        let footer = multi.add(ProgressBar::new(0));
        footer.set_style(message_style());

        Self {
            multi,
            header,
            bars: Mutex::new(IndexMap::new()),
            footer,
        }
    }

    /// Whether the board should be drawn (a terminal outside CI).
    pub fn should_show() -> bool {
        !is_ci() && console::user_attended_stderr()
    }

    fn bar_for(&self, name: &str) -> ProgressBar {
        let mut bars = self.bars.lock();
        if let Some(bar) = bars.get(name) {
            return bar.clone();
        }
        let bar = self
            .multi
            .insert_before(&self.footer, ProgressBar::new(100));
        bar.set_style(artifact_style());
        bars.insert(name.to_string(), bar.clone());
        bar
    }
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for StatusBoard {
    fn render(&self, state: &AggregateState) {
        match state.port {
            Some(port) => self.header.set_message(format!(
                "{} {}  total {} gz",
                "serving".green().bold(),
                format!("http://localhost:{}", port).cyan(),
                format_size(state.size)
            )),
            None => self
                .header
                .set_message(format!("{}", "waiting for a port...".dimmed())),
        }

        for file in state.files.values() {
            let bar = self.bar_for(&file.name);
            bar.set_position(u64::from(file.progress));
            bar.set_message(format_status_line(file));
        }

        match &state.error {
            Some(failure) => self
                .footer
                .set_message(format!("{} {}", "✗".red().bold(), failure.to_string().red())),
            None => self.footer.set_message(String::new()),
        }
    }
}

impl Drop for StatusBoard {
    fn drop(&mut self) {
        for bar in self.bars.lock().values() {
            bar.abandon();
        }
        self.header.abandon();
        self.footer.abandon();
    }
}

fn artifact_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("  [{bar:20.cyan/blue}] {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░")
}

fn message_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
}
