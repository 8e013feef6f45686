use chrono::Utc;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cuts::CutThresholds;
use crate::engine::{CoincidenceEngine, CoincidenceRecord, FileCounters};
use crate::error::{BiPoError, Result};
use crate::source::JsonlEventSource;

/// Tagging outcome for a single input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileReport {
    pub id: String,
    pub file_path: String,
    pub counters: FileCounters,
    pub coincidences: Vec<CoincidenceRecord>,
    /// Set when the file could not be read; counters are all zero then.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: String,
}

impl FileReport {
    fn succeeded(path: &str, counters: FileCounters, coincidences: Vec<CoincidenceRecord>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file_path: path.to_string(),
            counters,
            coincidences,
            error: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }

    fn failed(path: &str, error: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file_path: path.to_string(),
            counters: FileCounters::default(),
            coincidences: Vec::new(),
            error: Some(error),
            created_at: Utc::now().to_rfc3339(),
        }
    }

    /// GTIDs of the accepted pairs, Bi then Po for each, in match order.
    pub fn gtid_list(&self) -> Vec<u32> {
        let mut ids = Vec::with_capacity(self.coincidences.len() * 2);
        for pair in &self.coincidences {
            ids.push(pair.bi_gtid);
            ids.push(pair.po_gtid);
        }
        ids
    }
}

/// Aggregate outcome of a batch, reduced over the per-file reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchSummary {
    pub files_processed: usize,
    pub files_failed: usize,
    pub totals: FileCounters,
}

impl BatchSummary {
    fn from_reports(reports: &[FileReport]) -> Self {
        let mut totals = FileCounters::default();
        let mut files_failed = 0;
        for report in reports {
            totals.merge(&report.counters);
            if report.error.is_some() {
                files_failed += 1;
            }
        }
        Self {
            files_processed: reports.len() - files_failed,
            files_failed,
            totals,
        }
    }
}

/// Tag every file in `paths`, each as an independent sequential scan.
///
/// An unreadable file is reported and skipped; it never aborts the rest
/// of the batch. Configuration problems (empty input list, inconsistent
/// thresholds, residual stage enabled with no collaborator available)
/// abort before any file is opened.
pub fn run_batch(
    paths: &[String],
    cuts: &CutThresholds,
    parallel: bool,
) -> Result<(Vec<FileReport>, BatchSummary)> {
    cuts.validate()?;
    if paths.is_empty() {
        return Err(BiPoError::InvalidConfiguration(
            "input file list is empty".to_string(),
        ));
    }
    if cuts.time_residual_cut {
        return Err(BiPoError::InvalidConfiguration(
            "time_residual_cut needs a PMT-level residual calculator, which batch mode does not carry".to_string(),
        ));
    }

    let reports: Vec<FileReport> = if parallel {
        paths.par_iter().map(|path| tag_file(path, cuts)).collect()
    } else {
        paths.iter().map(|path| tag_file(path, cuts)).collect()
    };

    let summary = BatchSummary::from_reports(&reports);
    Ok((reports, summary))
}

fn tag_file(path: &str, cuts: &CutThresholds) -> FileReport {
    log::info!("analysing {}", path);
    let mut source = match JsonlEventSource::open(path) {
        Ok(source) => source,
        Err(e) => {
            log::error!("{}: skipping: {}", path, e);
            return FileReport::failed(path, e.to_string());
        }
    };

    let engine = CoincidenceEngine::new(cuts);
    let mut coincidences = Vec::new();
    match engine.run(&mut source, |record| coincidences.push(record)) {
        Ok(counters) => {
            log::info!(
                "{}: {} events examined, {} Bi candidates, {} coincidences",
                path,
                counters.events_examined,
                counters.bi_candidates,
                counters.coincidences
            );
            FileReport::succeeded(path, counters, coincidences)
        }
        Err(e) => {
            log::error!("{}: scan failed: {}", path, e);
            FileReport::failed(path, e.to_string())
        }
    }
}
