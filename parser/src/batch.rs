//! Parallel import of several dump files.

use std::path::{Path, PathBuf};

use chrono::Utc;
use ifr_menu_core::MenuDocument;
use tracing::{info, warn};

use crate::config::ImportConfig;
use crate::error::{ImportError, Result};
use crate::report::{ExtractionReport, ExtractionReportBundle, FailureCode};
use crate::{ExtractionRun, import_file};

/// Batch import configuration.
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    /// Settings applied to every dump.
    pub import: ImportConfig,
    /// Number of parallel import jobs (`None` = one per CPU, capped by input count).
    pub jobs: Option<usize>,
}

/// A document produced from one input file.
#[derive(Debug, Clone)]
pub struct ImportedDocument {
    pub path: PathBuf,
    pub document: MenuDocument,
}

/// Aggregated output of a batch run, ordered by input path.
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub documents: Vec<ImportedDocument>,
    /// Inputs that produced no document.
    pub failures: Vec<String>,
    /// Non-fatal warnings, prefixed with the input name.
    pub warnings: Vec<String>,
    pub reports: Vec<ExtractionReport>,
}

/// Imports every input in parallel.
///
/// A file that cannot be read or holds no forms is recorded as a failure and
/// does not stop the others.
///
/// # Errors
///
/// Returns [`ImportError::ThreadPool`] if the worker pool cannot be created.
pub fn import_batch(inputs: &[PathBuf], config: &BatchConfig) -> Result<BatchOutcome> {
    use rayon::prelude::*;

    let jobs = config
        .jobs
        .filter(|jobs| *jobs > 0)
        .unwrap_or_else(|| default_parallel_jobs(inputs.len()));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|err| ImportError::ThreadPool(err.to_string()))?;

    let results: Vec<(PathBuf, Result<ExtractionRun>)> = pool.install(|| {
        inputs
            .par_iter()
            .map(|path| (path.clone(), import_file(path, &config.import)))
            .collect()
    });

    // Sort by path for deterministic output.
    let mut sorted_results = results;
    sorted_results.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut outcome = BatchOutcome::default();
    for (path, result) in sorted_results {
        let label = source_label(&path);
        match result {
            Ok(run) => {
                outcome.warnings.extend(
                    run.result
                        .warnings
                        .into_iter()
                        .map(|warning| format!("{label}: {warning}")),
                );
                match run.result.document {
                    Some(document) => outcome.documents.push(ImportedDocument { path, document }),
                    None => outcome.failures.push(label),
                }
                outcome.reports.push(run.report);
            }
            Err(err) => {
                warn!(input = %path.display(), error = %err, "Skipping unreadable dump");
                outcome.reports.push(ExtractionReport::failed(
                    label.clone(),
                    FailureCode::ReadFailed,
                    err.to_string(),
                    config.import.parser.title_delimiter,
                ));
                outcome.failures.push(label);
            }
        }
    }

    info!(
        inputs = inputs.len(),
        documents = outcome.documents.len(),
        failures = outcome.failures.len(),
        jobs,
        "Batch import finished"
    );

    Ok(outcome)
}

/// Builds the serializable report for a batch run.
pub fn build_report_bundle(
    reports: Vec<ExtractionReport>,
    failures: Vec<String>,
) -> ExtractionReportBundle {
    ExtractionReportBundle {
        schema_version: Some(ifr_menu_core::MENU_CONTRACT_VERSION.to_string()),
        generated_at: Utc::now().to_rfc3339(),
        reports,
        failures,
    }
}

/// Name used for an input in reports: its file name, or the full path when
/// it has none.
pub fn source_label(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn default_parallel_jobs(input_count: usize) -> usize {
    let cpu_count = std::thread::available_parallelism()
        .map(|parallelism| parallelism.get())
        .unwrap_or(4);
    cpu_count.min(input_count.max(1))
}
