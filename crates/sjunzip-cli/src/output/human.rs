//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use crate::progress::humanize_bytes;
use anyhow::Result;
use console::Term;
use console::style;
use sjunzip_core::ArchiveManifest;
use sjunzip_core::BatchReport;
use sjunzip_core::formats::EntryKind;
use sjunzip_core::report::ArchiveOutcome;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::new();
        let mut count = 0;

        for c in s.chars().rev() {
            if count == 3 {
                result.push(',');
                count = 0;
            }
            result.push(c);
            count += 1;
        }

        result.chars().rev().collect()
    }

    fn outcome_line(&self, outcome: &ArchiveOutcome) -> String {
        match &outcome.result {
            Ok(report) => {
                let mark = if self.use_colors {
                    style("✓").green().bold().to_string()
                } else {
                    "OK".to_string()
                };
                format!(
                    "{mark} {} -> {} ({} files, {} directories, {})",
                    outcome.archive.display(),
                    outcome.destination.display(),
                    Self::format_number(report.files_extracted),
                    Self::format_number(report.directories_created),
                    humanize_bytes(report.bytes_written)
                )
            }
            Err(reason) => {
                let mark = if self.use_colors {
                    style("✗").red().bold().to_string()
                } else {
                    "FAILED".to_string()
                };
                format!("{mark} {}: {reason}", outcome.archive.display())
            }
        }
    }

    fn mode_string(kind: EntryKind, mode: u32) -> String {
        let type_char = match kind {
            EntryKind::File => '-',
            EntryKind::Directory => 'd',
            EntryKind::Symlink => 'l',
        };
        let mut out = String::with_capacity(10);
        out.push(type_char);
        for shift in [6, 3, 0] {
            let bits = (mode >> shift) & 0o7;
            out.push(if bits & 0o4 == 0 { '-' } else { 'r' });
            out.push(if bits & 0o2 == 0 { '-' } else { 'w' });
            out.push(if bits & 0o1 == 0 { '-' } else { 'x' });
        }
        out
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_batch_result(&self, report: &BatchReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        for outcome in &report.archives {
            let _ = self.term.write_line(&self.outcome_line(outcome));
        }

        if report.archives.len() > 1 || self.verbose {
            let _ = self.term.write_line("");
            let _ = self.term.write_line(&format!(
                "Extraction complete: {} succeeded, {} failed",
                report.succeeded(),
                report.failed()
            ));
            let _ = self.term.write_line(&format!(
                "  Files extracted: {}",
                Self::format_number(report.files_extracted())
            ));
            let _ = self.term.write_line(&format!(
                "  Total size: {}",
                humanize_bytes(report.bytes_written())
            ));
        }

        if self.verbose {
            let _ = self
                .term
                .write_line(&format!("  Duration: {:?}", report.duration));
        }

        Ok(())
    }

    fn format_manifest(&self, manifest: &ArchiveManifest, long: bool) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        if !long {
            for entry in &manifest.entries {
                let _ = self.term.write_line(&entry.name);
            }
            return Ok(());
        }

        for entry in &manifest.entries {
            let _ = self.term.write_line(&format!(
                "{} {:>10} {:>10}  {}",
                Self::mode_string(entry.kind, entry.mode),
                entry.size,
                entry.compressed_size,
                entry.name
            ));
        }

        let _ = self.term.write_line("");
        let _ = self.term.write_line(&format!(
            "Total: {} entries ({} directories), {} [{}]",
            Self::format_number(manifest.total_entries()),
            Self::format_number(manifest.directories()),
            humanize_bytes(manifest.total_size),
            manifest.encoding
        ));

        Ok(())
    }

    fn format_error(&self, _operation: &str, _error: &anyhow::Error) {
        // Returned from `main`, which prints it to stderr.
    }

    fn format_warning(&self, message: &str) {
        if self.quiet {
            return;
        }

        if self.use_colors {
            let _ = self
                .term
                .write_line(&format!("{} {message}", style("⚠").yellow().bold()));
        } else {
            let _ = self.term.write_line(&format!("WARNING: {message}"));
        }
    }
}
