use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BiPoError, Result};

/// Data-cleaning bitmask selecting the passes required of real data.
pub const DEFAULT_DC_BITMASK: u64 = 0x2100_0000_0242;

/// Immutable cut thresholds for one tagging run.
///
/// Loaded once before any scan begins and never mutated afterwards.
/// Defaults are the observed production configuration. Lengths are in
/// millimetres, times in nanoseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CutThresholds {
    /// Bi fiducial cut: minimum vertical coordinate [mm].
    pub bi_z_min: f64,
    /// Bi fiducial cut: minimum radius [mm].
    pub bi_r_min: f64,
    /// Bi fiducial cut: maximum radius [mm].
    pub bi_r_max: f64,
    /// Bi minimum cleaned-hit count.
    pub bi_nhits_cleaned_min: u32,

    /// Po fiducial cut: minimum vertical coordinate [mm].
    pub po_z_min: f64,
    /// Po fiducial cut: maximum radius [mm].
    pub po_r_max: f64,
    /// Po cleaned-hit count window.
    pub po_nhits_cleaned_min: u32,
    pub po_nhits_cleaned_max: u32,

    /// Joint cut: maximum vertex separation [mm], strict.
    pub delta_r_max: f64,
    /// Joint cut: decay-time window (strict bounds) [ns].
    pub delta_t_min_ns: u64,
    pub delta_t_max_ns: u64,

    /// Data-cleaning bitmask applied to both candidates on real data.
    pub dc_bitmask: u64,
    /// Simulated data never evaluates the data-cleaning masks.
    pub is_simulated: bool,

    /// Enable the optional PMT-level time-residual acceptance stage.
    pub time_residual_cut: bool,
    /// Accepted time-residual window [ns], only meaningful when the
    /// residual stage is enabled.
    pub tres_min_ns: f64,
    pub tres_max_ns: f64,
}

impl Default for CutThresholds {
    fn default() -> Self {
        Self {
            bi_z_min: 1400.0,
            bi_r_min: 2000.0,
            bi_r_max: 6000.0,
            bi_nhits_cleaned_min: 250,
            po_z_min: 850.0,
            po_r_max: 6000.0,
            po_nhits_cleaned_min: 150,
            po_nhits_cleaned_max: 350,
            delta_r_max: 1000.0,
            delta_t_min_ns: 3690,
            delta_t_max_ns: 1_800_000,
            dc_bitmask: DEFAULT_DC_BITMASK,
            is_simulated: false,
            time_residual_cut: false,
            tres_min_ns: -5.0,
            tres_max_ns: 15.0,
        }
    }
}

impl CutThresholds {
    /// Load thresholds from a JSON file. Missing fields keep their
    /// defaults; unknown fields are rejected.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BiPoError::InvalidConfiguration(format!(
                "cannot read cuts file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let cuts: CutThresholds = serde_json::from_str(&content).map_err(|e| {
            BiPoError::InvalidConfiguration(format!(
                "malformed cuts file '{}': {}",
                path.display(),
                e
            ))
        })?;
        cuts.validate()?;
        Ok(cuts)
    }

    /// Reject internally inconsistent thresholds before any I/O happens.
    pub fn validate(&self) -> Result<()> {
        if self.bi_r_min > self.bi_r_max {
            return Err(BiPoError::InvalidConfiguration(format!(
                "bi_r_min ({}) exceeds bi_r_max ({})",
                self.bi_r_min, self.bi_r_max
            )));
        }
        if self.po_nhits_cleaned_min > self.po_nhits_cleaned_max {
            return Err(BiPoError::InvalidConfiguration(format!(
                "po_nhits_cleaned_min ({}) exceeds po_nhits_cleaned_max ({})",
                self.po_nhits_cleaned_min, self.po_nhits_cleaned_max
            )));
        }
        if self.delta_t_min_ns >= self.delta_t_max_ns {
            return Err(BiPoError::InvalidConfiguration(format!(
                "delta_t_min_ns ({}) must be below delta_t_max_ns ({})",
                self.delta_t_min_ns, self.delta_t_max_ns
            )));
        }
        if self.delta_r_max <= 0.0 || !self.delta_r_max.is_finite() {
            return Err(BiPoError::InvalidConfiguration(format!(
                "delta_r_max ({}) must be positive and finite",
                self.delta_r_max
            )));
        }
        if self.time_residual_cut && self.tres_min_ns >= self.tres_max_ns {
            return Err(BiPoError::InvalidConfiguration(format!(
                "tres_min_ns ({}) must be below tres_max_ns ({})",
                self.tres_min_ns, self.tres_max_ns
            )));
        }
        Ok(())
    }
}
