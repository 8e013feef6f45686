use serde::{Deserialize, Serialize};

use crate::cuts::CutThresholds;
use crate::error::{BiPoError, Result};
use crate::event::{Event, EventSource};
use crate::features::{extract_features, FeatureSet};

/// A confirmed (Bi, Po) coincidence pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoincidenceRecord {
    pub bi_gtid: u32,
    pub po_gtid: u32,
    /// Vertex separation of the pair [mm].
    pub delta_r_mm: f64,
    /// Decay time of the pair [ns].
    pub delta_t_ns: u64,
}

/// Diagnostic counters for one tagging run. Not part of the matching
/// contract; returned explicitly rather than kept as ambient state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCounters {
    /// Events pulled while scanning for a Bi candidate.
    pub events_examined: u64,
    /// Events that passed the full Bi filter.
    pub bi_candidates: u64,
    /// Confirmed coincidence pairs.
    pub coincidences: u64,
}

impl FileCounters {
    pub fn merge(&mut self, other: &FileCounters) {
        self.events_examined += other.events_examined;
        self.bi_candidates += other.bi_candidates;
        self.coincidences += other.coincidences;
    }
}

/// External PMT-level time-residual check, folded into pair acceptance
/// when `CutThresholds::time_residual_cut` is enabled. The calculator
/// needs detector geometry this crate does not carry, so it stays an
/// injected collaborator.
pub trait ResidualFilter {
    fn accept(&self, event: &Event, features: &FeatureSet) -> bool;
}

/// The stateful forward-scanning coincidence matcher.
///
/// One forward-only cursor is shared between the outer Bi scan and the
/// nested Po scan: every event the Po scan consumes is gone for good and
/// is never revisited as a later Bi candidate. This is a deliberate
/// throughput/completeness trade-off inherited from the production
/// tagger; two independent cursors would silently double-count
/// coincidences that share a Po.
pub struct CoincidenceEngine<'a> {
    cuts: &'a CutThresholds,
    residual: Option<&'a dyn ResidualFilter>,
}

impl<'a> CoincidenceEngine<'a> {
    pub fn new(cuts: &'a CutThresholds) -> Self {
        Self {
            cuts,
            residual: None,
        }
    }

    /// Attach the time-residual collaborator. Only consulted when the
    /// thresholds enable the residual stage.
    pub fn with_residual_filter(mut self, filter: &'a dyn ResidualFilter) -> Self {
        self.residual = Some(filter);
        self
    }

    /// Scan one event stream to exhaustion, handing each confirmed pair
    /// to `sink` as soon as it is finalized.
    ///
    /// Fails up front with `InvalidConfiguration` when the residual
    /// stage is enabled but no filter implementation was attached.
    pub fn run<S: EventSource>(
        &self,
        source: &mut S,
        mut sink: impl FnMut(CoincidenceRecord),
    ) -> Result<FileCounters> {
        self.cuts.validate()?;
        if self.cuts.time_residual_cut && self.residual.is_none() {
            return Err(BiPoError::InvalidConfiguration(
                "time_residual_cut is enabled but no residual filter is attached".to_string(),
            ));
        }

        let mut counters = FileCounters::default();

        while let Some(bi_event) = source.next_event() {
            counters.events_examined += 1;
            if counters.events_examined % 1000 == 0 {
                log::debug!("examined {} events", counters.events_examined);
            }

            let bi = match extract_features(&bi_event, self.cuts.is_simulated) {
                Ok(features) => features,
                Err(BiPoError::NoValidFit) => continue,
                Err(e) => return Err(e),
            };
            if !self.passes_bi_cuts(&bi) {
                continue;
            }
            counters.bi_candidates += 1;
            log::debug!("Bi candidate gtid={} at t={} ns", bi_event.gtid, bi.timestamp_ns);

            if let Some(record) = self.scan_for_po(source, bi_event.gtid, &bi) {
                log::info!(
                    "coincidence: bi_gtid={} po_gtid={} delta_t={} ns delta_r={:.1} mm",
                    record.bi_gtid,
                    record.po_gtid,
                    record.delta_t_ns,
                    record.delta_r_mm
                );
                counters.coincidences += 1;
                sink(record);
            }
            // The outer scan resumes wherever the Po scan stopped; the
            // shared cursor makes that automatic.
        }

        Ok(counters)
    }

    /// Forward scan for the Po partner of an accepted Bi candidate.
    ///
    /// Stops on the first confirmed pair, on a gap already beyond the
    /// time window (timestamps only increase, so no later event can
    /// qualify), or on stream exhaustion.
    fn scan_for_po<S: EventSource>(
        &self,
        source: &mut S,
        bi_gtid: u32,
        bi: &FeatureSet,
    ) -> Option<CoincidenceRecord> {
        while let Some(po_event) = source.next_event() {
            let po = match extract_features(&po_event, self.cuts.is_simulated) {
                Ok(features) => features,
                Err(_) => continue,
            };
            if !self.passes_po_cuts(&po) {
                continue;
            }

            let delta_r = (po.position - bi.position).norm();
            let delta_t = po.timestamp_ns.saturating_sub(bi.timestamp_ns);

            let mut accepted = delta_r < self.cuts.delta_r_max
                && delta_t > self.cuts.delta_t_min_ns
                && delta_t < self.cuts.delta_t_max_ns;
            if accepted && self.cuts.time_residual_cut {
                if let Some(filter) = self.residual {
                    accepted = filter.accept(&po_event, &po);
                }
            }

            if accepted {
                return Some(CoincidenceRecord {
                    bi_gtid,
                    po_gtid: po_event.gtid,
                    delta_r_mm: delta_r,
                    delta_t_ns: delta_t,
                });
            }
            if delta_t > self.cuts.delta_t_max_ns {
                return None;
            }
        }
        None
    }

    /// Bi-stage filter. Hard rejects, in production order.
    fn passes_bi_cuts(&self, features: &FeatureSet) -> bool {
        if features.z < self.cuts.bi_z_min {
            return false;
        }
        if features.radius < self.cuts.bi_r_min || features.radius > self.cuts.bi_r_max {
            return false;
        }
        if features.nhits_cleaned < self.cuts.bi_nhits_cleaned_min {
            return false;
        }
        if let Some(dc) = &features.dc {
            if !dc.passes(self.cuts.dc_bitmask) {
                return false;
            }
        }
        true
    }

    /// Po-stage filter. Soft rejects; the Bi candidate stays active.
    fn passes_po_cuts(&self, features: &FeatureSet) -> bool {
        if features.z < self.cuts.po_z_min {
            return false;
        }
        if features.radius > self.cuts.po_r_max {
            return false;
        }
        if features.nhits_cleaned < self.cuts.po_nhits_cleaned_min
            || features.nhits_cleaned > self.cuts.po_nhits_cleaned_max
        {
            return false;
        }
        if let Some(dc) = &features.dc {
            if !dc.passes(self.cuts.dc_bitmask) {
                return false;
            }
        }
        true
    }
}
