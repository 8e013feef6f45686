use std::cell::Cell;
use std::rc::Rc;

use bipo_rs::{CoincidenceEngine, CoincidenceRecord, CutThresholds, Event, FitVertex};

/// Wraps a finite stream and counts every pull, to pin down exactly which
/// events the engine consumed.
struct CountingSource {
    inner: std::vec::IntoIter<Event>,
    pulls: Rc<Cell<usize>>,
}

impl CountingSource {
    fn new(events: Vec<Event>) -> (Self, Rc<Cell<usize>>) {
        let pulls = Rc::new(Cell::new(0));
        (
            Self {
                inner: events.into_iter(),
                pulls: Rc::clone(&pulls),
            },
            pulls,
        )
    }
}

impl Iterator for CountingSource {
    type Item = Event;

    fn next(&mut self) -> Option<Event> {
        let event = self.inner.next();
        if event.is_some() {
            self.pulls.set(self.pulls.get() + 1);
        }
        event
    }
}

fn loose_cuts() -> CutThresholds {
    CutThresholds {
        bi_z_min: 1400.0,
        bi_r_min: 2000.0,
        bi_r_max: 6000.0,
        bi_nhits_cleaned_min: 0,
        po_z_min: 850.0,
        po_r_max: 6000.0,
        po_nhits_cleaned_min: 0,
        po_nhits_cleaned_max: 10_000,
        delta_r_max: 1000.0,
        delta_t_min_ns: 50,
        delta_t_max_ns: 10_000,
        ..Default::default()
    }
}

/// r = 3000 mm, z = 2000 mm, inside both fiducial volumes.
fn fiducial_event(gtid: u32, clock_count: u64) -> Event {
    Event {
        gtid,
        clock_count,
        nhits_cleaned: 1,
        dc_applied: 0,
        dc_flagged: 0,
        fit: Some(FitVertex {
            x: (3000.0f64 * 3000.0 - 2000.0 * 2000.0).sqrt(),
            y: 0.0,
            z: 2000.0,
            valid_position: true,
            valid_time: true,
        }),
    }
}

/// z below the Bi floor but above the Po floor.
fn po_only_event(gtid: u32, clock_count: u64) -> Event {
    let mut event = fiducial_event(gtid, clock_count);
    if let Some(fit) = event.fit.as_mut() {
        fit.z = 1000.0;
        fit.x = (3000.0f64 * 3000.0 - 1000.0 * 1000.0).sqrt();
    }
    event
}

fn tag(cuts: &CutThresholds, events: Vec<Event>) -> (Vec<CoincidenceRecord>, usize) {
    let engine = CoincidenceEngine::new(cuts);
    let (mut source, pulls) = CountingSource::new(events);
    let mut records = Vec::new();
    engine.run(&mut source, |r| records.push(r)).unwrap();
    (records, pulls.get())
}

#[test]
fn rejected_bi_never_opens_a_po_scan() {
    let cuts = loose_cuts();
    // Both events fail the Bi z cut. Had a Po scan opened for event 1,
    // event 2 would have been consumed inside it and never counted as a
    // Bi-phase pull; events_examined == 2 proves no scan opened.
    let engine = CoincidenceEngine::new(&cuts);
    let (mut source, pulls) = CountingSource::new(vec![
        po_only_event(1, 0),
        po_only_event(2, 250),
    ]);
    let mut records = Vec::new();
    let counters = engine.run(&mut source, |r| records.push(r)).unwrap();
    assert!(records.is_empty());
    assert_eq!(counters.events_examined, 2);
    assert_eq!(counters.bi_candidates, 0);
    assert_eq!(pulls.get(), 2);
}

#[test]
fn po_scan_consumes_from_the_shared_cursor() {
    let cuts = loose_cuts();
    // Event 2 fails Po cuts only softly (hit count), event 3 matches.
    let mut noisy = fiducial_event(2, 100);
    noisy.nhits_cleaned = 50_000;
    let events = vec![fiducial_event(1, 0), noisy, fiducial_event(3, 250)];
    let (records, pulls) = tag(&cuts, events);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].po_gtid, 3);
    assert_eq!(pulls, 3);
}

#[test]
fn scan_stops_at_first_gap_beyond_window() {
    let cuts = loose_cuts();
    // Event 2 exceeds the window; event 3 would match event 1 if the
    // scan (illegally) kept going past the gap.
    let events = vec![
        fiducial_event(1, 0),
        fiducial_event(2, 1_000_000),
        po_only_event(3, 250),
    ];
    let (records, pulls) = tag(&cuts, events);
    assert!(records.is_empty());
    // Event 3 is pulled again only as a Bi candidate (and rejected).
    assert_eq!(pulls, 3);
}

#[test]
fn resumption_starts_after_the_stopping_point() {
    let cuts = loose_cuts();
    // Pair (1,2) matches; 3 then seeds a fresh scan and pairs with 4.
    // Nothing is ever pulled twice: 6 events, 6 pulls.
    let events = vec![
        fiducial_event(1, 0),
        fiducial_event(2, 250),
        fiducial_event(3, 300),
        fiducial_event(4, 550),
        fiducial_event(5, 600),
        fiducial_event(6, 850),
    ];
    let (records, pulls) = tag(&cuts, events);
    let pairs: Vec<(u32, u32)> = records.iter().map(|r| (r.bi_gtid, r.po_gtid)).collect();
    assert_eq!(pairs, vec![(1, 2), (3, 4), (5, 6)]);
    assert_eq!(pulls, 6);
}

#[test]
fn literal_scenario_from_the_production_configuration() {
    // Timestamps 0, 20, 5000, 4000000 ns: the first partner is below the
    // lower time bound, the second matches, the last event reopens the
    // Bi scan against an exhausted stream.
    let cuts = loose_cuts();
    let events = vec![
        fiducial_event(1, 0),
        fiducial_event(2, 1),
        fiducial_event(3, 250),
        fiducial_event(4, 200_000),
    ];
    let engine = CoincidenceEngine::new(&cuts);
    let mut source = events.into_iter();
    let mut records = Vec::new();
    let counters = engine.run(&mut source, |r| records.push(r)).unwrap();
    assert_eq!(counters.coincidences, 1);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].bi_gtid, 1);
    assert_eq!(records[0].po_gtid, 3);
}

#[test]
fn identical_configuration_is_idempotent() {
    let cuts = loose_cuts();
    let events: Vec<Event> = (0..50)
        .map(|i| fiducial_event(i as u32 + 1, i * 200 + (i % 7) * 9))
        .collect();
    let engine = CoincidenceEngine::new(&cuts);

    let mut first = Vec::new();
    engine
        .run(&mut events.clone().into_iter(), |r| first.push(r))
        .unwrap();
    let mut second = Vec::new();
    engine
        .run(&mut events.into_iter(), |r| second.push(r))
        .unwrap();
    assert_eq!(first, second);
}
