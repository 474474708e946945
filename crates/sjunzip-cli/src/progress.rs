//! Progress reporting for CLI extraction.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressState;
use indicatif::ProgressStyle;
use sjunzip_core::ProgressCallback;
use sjunzip_core::report::ArchiveOutcome;
use std::fmt::Write;
use std::path::Path;
use std::path::PathBuf;

/// CLI progress wrapper implementing `ProgressCallback`.
///
/// Tracks the archive being extracted so a fail-fast error can be attributed
/// to it. When a bar is attached it shows the archive, entry count, bytes
/// written and ETA. The bar is cleared on drop.
pub struct CliProgress {
    bar: Option<ProgressBar>,
    current_archive: Option<PathBuf>,
    bytes_written: u64,
}

impl CliProgress {
    /// Creates a progress tracker, with a visible bar if `show_bar` is set.
    #[must_use]
    pub fn new(show_bar: bool) -> Self {
        Self {
            bar: show_bar.then(Self::create_bar),
            current_archive: None,
            bytes_written: 0,
        }
    }

    fn create_bar() -> ProgressBar {
        let bar = ProgressBar::new(0);

        // Template: "[1/3] 写真.zip [████████░░░░] 42/100 entries (15.2 MB, 12s)"
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{prefix} [{bar:40.cyan/blue}] {pos}/{len} entries ({msg}, {eta})")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .with_key("eta", |state: &ProgressState, w: &mut dyn Write| {
                    write!(w, "{}", humanize_duration(state.eta())).unwrap_or(());
                })
                .progress_chars("█▓░"),
        );
        bar.set_message(humanize_bytes(0));
        bar
    }

    /// Checks if we should show progress (TTY detection).
    #[must_use]
    pub fn should_show(quiet: bool, json: bool) -> bool {
        !quiet && !json && Term::stdout().is_term()
    }

    /// The archive most recently started.
    pub fn current_archive(&self) -> Option<&Path> {
        self.current_archive.as_deref()
    }
}

impl Drop for CliProgress {
    fn drop(&mut self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl ProgressCallback for CliProgress {
    fn on_entry_start(&mut self, _path: &Path, total: usize, _current: usize) {
        if let Some(bar) = &self.bar {
            bar.set_length(total as u64);
        }
    }

    fn on_bytes_written(&mut self, bytes: u64) {
        self.bytes_written += bytes;
        if let Some(bar) = &self.bar {
            bar.set_message(humanize_bytes(self.bytes_written));
        }
    }

    fn on_entry_complete(&mut self, _path: &Path) {
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn on_complete(&mut self) {
        if let Some(bar) = &self.bar
            && let Some(len) = bar.length()
        {
            bar.set_position(len);
        }
    }

    fn on_archive_start(&mut self, archive: &Path, total: usize, current: usize) {
        self.current_archive = Some(archive.to_path_buf());
        self.bytes_written = 0;
        if let Some(bar) = &self.bar {
            let name = archive
                .file_name()
                .map_or_else(|| archive.display().to_string(), |n| n.to_string_lossy().into_owned());
            bar.reset();
            bar.set_length(0);
            bar.set_prefix(format!("[{current}/{total}] {name}"));
            bar.set_message(humanize_bytes(0));
        }
    }

    fn on_archive_complete(&mut self, outcome: &ArchiveOutcome) {
        if let (Some(bar), Err(reason)) = (&self.bar, &outcome.result) {
            bar.println(format!("failed: {}: {reason}", outcome.archive.display()));
        }
    }
}

/// Converts bytes to human-readable format (KB, MB, GB, TB).
pub fn humanize_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.1} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{bytes} B")
    }
}

/// Converts duration to human-readable format.
fn humanize_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 3600 {
        format!("{}h{}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m{}s", secs / 60, secs % 60)
    } else {
        format!("{secs}s")
    }
}
