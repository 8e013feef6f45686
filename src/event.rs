use serde::{Deserialize, Serialize};

/// Reconstructed vertex of an event, as produced by the upstream fitter.
///
/// A vertex may exist while its position or time reconstruction failed;
/// both validity flags must hold before the coordinates are usable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitVertex {
    /// Position in the detector-centered frame [mm]
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub valid_position: bool,
    pub valid_time: bool,
}

/// One reconstructed detector event record.
///
/// `clock_count` is the raw 50 MHz hardware clock counter. Inter-event
/// timing must use this counter, never the fitted in-event time, which is
/// confined to the short intra-event window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Global trigger id, unique within a stream. Output bookkeeping only.
    pub gtid: u32,
    /// Hardware clock counter (20 ns per tick).
    pub clock_count: u64,
    /// Hits surviving detector-level cleaning.
    pub nhits_cleaned: u32,
    /// Data-cleaning passes applied to this event. Real data only.
    #[serde(default)]
    pub dc_applied: u64,
    /// Data-cleaning passes the event survived. Real data only.
    #[serde(default)]
    pub dc_flagged: u64,
    /// Reconstruction result, absent when the named fitter did not run.
    pub fit: Option<FitVertex>,
}

/// A lazy, finite, forward-only, non-restartable sequence of events.
///
/// The coincidence engine shares one cursor of this kind between its Bi
/// and Po scan phases; implementations must never rewind.
pub trait EventSource {
    fn next_event(&mut self) -> Option<Event>;
}

impl<I: Iterator<Item = Event>> EventSource for I {
    fn next_event(&mut self) -> Option<Event> {
        self.next()
    }
}
