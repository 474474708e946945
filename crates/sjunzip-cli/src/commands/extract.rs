//! Extract command implementation.

use crate::cli::ExtractArgs;
use crate::error::BatchFailed;
use crate::error::add_archive_context;
use crate::error::convert_extraction_error;
use crate::output::OutputFormatter;
use crate::progress::CliProgress;
use anyhow::Result;
use sjunzip_core::ExtractConfig;
use sjunzip_core::batch::BatchOptions;
use sjunzip_core::batch::FailurePolicy;
use sjunzip_core::batch::discover_archives;
use sjunzip_core::batch::extract_batch;
use std::path::Path;
use std::path::PathBuf;

pub fn execute(
    args: &ExtractArgs,
    formatter: &dyn OutputFormatter,
    quiet: bool,
    json: bool,
) -> Result<()> {
    let target = args
        .target
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let candidates = add_archive_context(discover_archives(Some(&target)), &target)?;

    if candidates.is_empty() {
        formatter.format_warning(&format!("No ZIP archives found in {}", target.display()));
    }

    let options = build_options(args);
    let total = candidates.len();

    // Progress bar only on a TTY, never in quiet or JSON mode
    let mut progress = CliProgress::new(CliProgress::should_show(quiet, json));
    let report = match extract_batch(candidates, &options, &mut progress) {
        Ok(report) => report,
        Err(err) => {
            let archive = progress
                .current_archive()
                .map_or_else(|| target.clone(), Path::to_path_buf);
            drop(progress);
            return Err(convert_extraction_error(err, &archive));
        }
    };
    drop(progress);

    formatter.format_batch_result(&report)?;

    if report.has_failures() {
        return Err(BatchFailed {
            failed: report.failed(),
            total,
        }
        .into());
    }

    Ok(())
}

fn build_options(args: &ExtractArgs) -> BatchOptions {
    BatchOptions {
        extract: ExtractConfig::default()
            .with_encoding(args.encoding)
            .with_preserve_permissions(!args.no_preserve_permissions),
        failure_policy: if args.keep_going {
            FailurePolicy::Continue
        } else {
            FailurePolicy::Abort
        },
        sort_order: args.sort.into(),
        output_base: args.output_dir.clone(),
    }
}
