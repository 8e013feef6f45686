use nalgebra::Vector3;

use crate::error::{BiPoError, Result};
use crate::event::Event;

/// Duration of one hardware clock tick [ns].
pub const CLOCK_TICK_NS: u64 = 20;

/// Data-cleaning applied/flagged masks for one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataCleaningMasks {
    pub applied: u64,
    pub flagged: u64,
}

impl DataCleaningMasks {
    /// Every cleaning pass selected by `mask` that was applied must also
    /// have been passed. Bitwise on u64, never through floats.
    pub fn passes(&self, mask: u64) -> bool {
        let required = self.applied & mask;
        required & self.flagged == required
    }
}

/// Physical quantities of one event needed by the filter stages.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    /// Fitted vertex position [mm].
    pub position: Vector3<f64>,
    /// Distance from detector center [mm].
    pub radius: f64,
    /// Vertical coordinate [mm].
    pub z: f64,
    pub nhits_cleaned: u32,
    /// Clock counter converted to nanoseconds. Monotonic across a stream.
    pub timestamp_ns: u64,
    /// `None` for simulated data, where the cleaning masks are never
    /// evaluated and the upstream accessor is not safe to call.
    pub dc: Option<DataCleaningMasks>,
}

/// Derive the feature set of one event, or fail with `NoValidFit`.
///
/// Preconditions are checked in order, short-circuiting on the first
/// failure: a reconstruction result exists, its position is valid, its
/// time is valid. Callers must skip a `NoValidFit` event as both a Bi
/// and a Po candidate.
pub fn extract_features(event: &Event, is_simulated: bool) -> Result<FeatureSet> {
    let fit = event.fit.as_ref().ok_or(BiPoError::NoValidFit)?;
    if !fit.valid_position || !fit.valid_time {
        return Err(BiPoError::NoValidFit);
    }

    let position = Vector3::new(fit.x, fit.y, fit.z);
    let dc = if is_simulated {
        None
    } else {
        Some(DataCleaningMasks {
            applied: event.dc_applied,
            flagged: event.dc_flagged,
        })
    };

    Ok(FeatureSet {
        position,
        radius: position.norm(),
        z: fit.z,
        nhits_cleaned: event.nhits_cleaned,
        timestamp_ns: event.clock_count * CLOCK_TICK_NS,
        dc,
    })
}
