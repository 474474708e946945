//! JSON output formatter for machine-readable results.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use super::formatter::kind_label;
use anyhow::Result;
use serde::Serialize;
use sjunzip_core::ArchiveManifest;
use sjunzip_core::BatchReport;
use sjunzip_core::report::ArchiveOutcome;
use std::io::Write;
use std::io::{self};

pub struct JsonFormatter;

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

#[derive(Serialize)]
struct ArchiveOutput {
    archive: String,
    destination: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    files_extracted: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    directories_created: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bytes_written: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    entries_skipped: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u128>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl From<&ArchiveOutcome> for ArchiveOutput {
    fn from(outcome: &ArchiveOutcome) -> Self {
        let report = outcome.result.as_ref().ok();
        Self {
            archive: outcome.archive.display().to_string(),
            destination: outcome.destination.display().to_string(),
            status: if outcome.is_success() {
                "success"
            } else {
                "error"
            },
            files_extracted: report.map(|r| r.files_extracted),
            directories_created: report.map(|r| r.directories_created),
            bytes_written: report.map(|r| r.bytes_written),
            entries_skipped: report.map(|r| r.entries_skipped),
            duration_ms: report.map(|r| r.duration.as_millis()),
            error: outcome.result.as_ref().err().cloned(),
        }
    }
}

#[derive(Serialize)]
struct BatchOutput {
    archives: Vec<ArchiveOutput>,
    succeeded: usize,
    failed: usize,
    files_extracted: usize,
    bytes_written: u64,
    duration_ms: u128,
}

impl OutputFormatter for JsonFormatter {
    fn format_batch_result(&self, report: &BatchReport) -> Result<()> {
        let data = BatchOutput {
            archives: report.archives.iter().map(ArchiveOutput::from).collect(),
            succeeded: report.succeeded(),
            failed: report.failed(),
            files_extracted: report.files_extracted(),
            bytes_written: report.bytes_written(),
            duration_ms: report.duration.as_millis(),
        };

        if report.has_failures() {
            let message = format!(
                "{} of {} archives failed to extract",
                report.failed(),
                report.archives.len()
            );
            Self::output(&JsonOutput::partial("extract", data, message))
        } else {
            Self::output(&JsonOutput::success("extract", data))
        }
    }

    fn format_manifest(&self, manifest: &ArchiveManifest, _long: bool) -> Result<()> {
        #[derive(Serialize)]
        struct EntryOutput<'a> {
            name: &'a str,
            kind: &'static str,
            size: u64,
            compressed_size: u64,
            mode: String,
        }

        #[derive(Serialize)]
        struct ManifestOutput<'a> {
            archive: String,
            encoding: &'static str,
            total_entries: usize,
            total_size: u64,
            entries: Vec<EntryOutput<'a>>,
        }

        let data = ManifestOutput {
            archive: manifest.archive.display().to_string(),
            encoding: manifest.encoding.name(),
            total_entries: manifest.total_entries(),
            total_size: manifest.total_size,
            entries: manifest
                .entries
                .iter()
                .map(|e| EntryOutput {
                    name: &e.name,
                    kind: kind_label(e.kind),
                    size: e.size,
                    compressed_size: e.compressed_size,
                    mode: format!("{:04o}", e.mode),
                })
                .collect(),
        };

        Self::output(&JsonOutput::success("list", data))
    }

    fn format_error(&self, operation: &str, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error(operation, format!("{error:#}"));
        let _ = Self::output(&output);
    }

    fn format_warning(&self, message: &str) {
        // Keeps stdout a single JSON document.
        log::warn!("{message}");
    }
}
