pub mod batch;
pub mod cuts;
pub mod engine;
pub mod error;
pub mod event;
pub mod features;
pub mod source;

pub use batch::{run_batch, BatchSummary, FileReport};
pub use cuts::CutThresholds;
pub use engine::{CoincidenceEngine, CoincidenceRecord, FileCounters, ResidualFilter};
pub use error::{BiPoError, Result};
pub use event::{Event, EventSource, FitVertex};
pub use features::{extract_features, DataCleaningMasks, FeatureSet, CLOCK_TICK_NS};
pub use source::JsonlEventSource;
