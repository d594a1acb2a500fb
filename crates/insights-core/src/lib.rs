//! Aggregation pipeline for interview-practice analytics.
//!
//! Turns a noisy stream of per-frame emotion scores and gaze coordinates
//! into a stabilized dominant-emotion label, a time-bucketed recording
//! and a clustered gaze heatmap. Everything here is synchronous and free
//! of I/O so the same code runs inside the HTTP service and in the
//! browser through `insights-wasm`.
//!
//! ## Modules
//! - `stability`: per-label jitter suppression
//! - `descriptor`: primary/secondary emotion label composition
//! - `recorder`: fixed-period top-K sampling state machine
//! - `export`: recorded table aggregation and hand-off traits
//! - `wordcloud`: size/colour weighting for the word-cloud renderer
//! - `gaze`: first-match gaze clustering and heatmap projection
//! - `session`: live composition of filter, selector and recorder

pub mod descriptor;
pub mod emotion;
pub mod error;
pub mod export;
pub mod gaze;
pub mod recorder;
pub mod session;
pub mod stability;
pub mod wordcloud;

pub use descriptor::{describe, DescriptorSelector, DescriptorTable};
pub use emotion::EmotionSample;
pub use error::InsightsError;
pub use export::{aggregate, ExportRow, ExportSink, ExportTable, GridRow, SummaryRow};
pub use gaze::{
    GazeClusterer, GazeCoordinate, GazePoint, GazeSignal, GazeStatus, HeatmapSpot, IgnoreReason,
    IngestOutcome,
};
pub use recorder::{RecordedRow, RecorderState, SessionRecorder};
pub use session::{EmotionSession, EmotionSettings, EmotionUpdate, SessionExport};
pub use stability::StabilityFilter;
pub use wordcloud::{Rgb, WordCloudRenderer, WordCloudStyle, WordWeight};
