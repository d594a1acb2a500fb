//! Gaze clustering.
//!
//! Raw gaze samples are bucketed into clusters: a sample joins the first
//! cluster (in creation order) whose centre lies inside an axis-aligned
//! box of `merge_radius` on both axes, otherwise it opens a new cluster.
//! Clusters only grow; nothing decays.
//!
//! Ingestion is gated by the tracker lifecycle: nothing is accepted
//! before calibration, a stop pauses ingestion without losing clusters,
//! and a restart wipes everything and requires a fresh calibration.

use serde::{Deserialize, Serialize};

use crate::error::{check_threshold, InsightsError};

pub const DEFAULT_MERGE_RADIUS: f64 = 50.0;

const SPOT_OFFSET: f64 = 6.5;
const SPOT_BASE_DIAMETER: f64 = 13.0;
const SPOT_GROWTH: f64 = 2.6;
const SPOT_MAX_OPACITY: f64 = 0.6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazeCoordinate {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GazePoint {
    pub x: f64,
    pub y: f64,
    pub duration: u32,
}

/// Render geometry for one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeatmapSpot {
    pub left: f64,
    pub top: f64,
    pub diameter: f64,
    pub opacity: f64,
}

impl From<&GazePoint> for HeatmapSpot {
    fn from(point: &GazePoint) -> Self {
        let duration = f64::from(point.duration);
        Self {
            left: point.x - SPOT_OFFSET,
            top: point.y - SPOT_OFFSET,
            diameter: SPOT_BASE_DIAMETER + duration * SPOT_GROWTH,
            opacity: (duration / 10.0).min(SPOT_MAX_OPACITY),
        }
    }
}

/// Lifecycle signals from the external gaze tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "message")]
pub enum GazeSignal {
    CalibrationComplete,
    CameraDenied,
    Error(String),
    TrackingStopped,
    TrackingStarted,
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    NotCalibrated,
    TrackingStopped,
    InvalidCoordinate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "index")]
pub enum IngestOutcome {
    Ignored(IgnoreReason),
    Merged(usize),
    Created(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GazeStatus {
    pub calibrated: bool,
    pub tracking: bool,
    pub camera_denied: bool,
}

#[derive(Debug, Clone)]
pub struct GazeClusterer {
    merge_radius: f64,
    clusters: Vec<GazePoint>,
    latest: Option<GazeCoordinate>,
    calibrated: bool,
    tracking: bool,
    camera_denied: bool,
}

impl Default for GazeClusterer {
    fn default() -> Self {
        Self {
            merge_radius: DEFAULT_MERGE_RADIUS,
            clusters: Vec::new(),
            latest: None,
            calibrated: false,
            tracking: true,
            camera_denied: false,
        }
    }
}

impl GazeClusterer {
    pub fn new(merge_radius: f64) -> Result<Self, InsightsError> {
        Ok(Self {
            merge_radius: check_threshold("gaze_merge_radius", merge_radius)?,
            ..Self::default()
        })
    }

    pub fn clusters(&self) -> &[GazePoint] {
        &self.clusters
    }

    /// Most recent accepted raw sample, for the live indicator.
    pub fn latest(&self) -> Option<GazeCoordinate> {
        self.latest
    }

    pub fn status(&self) -> GazeStatus {
        GazeStatus {
            calibrated: self.calibrated,
            tracking: self.tracking,
            camera_denied: self.camera_denied,
        }
    }

    pub fn is_accepting(&self) -> bool {
        self.calibrated && self.tracking
    }

    pub fn heatmap(&self) -> Vec<HeatmapSpot> {
        self.clusters.iter().map(HeatmapSpot::from).collect()
    }

    pub fn ingest(&mut self, x: f64, y: f64) -> IngestOutcome {
        if !self.calibrated {
            return IngestOutcome::Ignored(IgnoreReason::NotCalibrated);
        }
        if !self.tracking {
            return IngestOutcome::Ignored(IgnoreReason::TrackingStopped);
        }
        if !x.is_finite() || !y.is_finite() {
            tracing::debug!(x, y, "Dropping non-finite gaze sample");
            return IngestOutcome::Ignored(IgnoreReason::InvalidCoordinate);
        }

        self.latest = Some(GazeCoordinate { x, y });

        let radius = self.merge_radius;
        let hit = self
            .clusters
            .iter()
            .position(|c| (c.x - x).abs() < radius && (c.y - y).abs() < radius);

        match hit {
            Some(index) => {
                self.clusters[index].duration = self.clusters[index].duration.saturating_add(1);
                IngestOutcome::Merged(index)
            }
            None => {
                self.clusters.push(GazePoint { x, y, duration: 1 });
                IngestOutcome::Created(self.clusters.len() - 1)
            }
        }
    }

    pub fn apply_signal(&mut self, signal: &GazeSignal) {
        match signal {
            GazeSignal::CalibrationComplete => {
                if self.camera_denied {
                    tracing::warn!("Calibration reported after camera denial, ignoring");
                } else {
                    tracing::info!("Gaze calibration complete");
                    self.calibrated = true;
                }
            }
            GazeSignal::CameraDenied => {
                tracing::warn!("Camera access denied");
                self.camera_denied = true;
                self.calibrated = false;
            }
            GazeSignal::Error(message) => {
                tracing::warn!(error = %message, "Gaze tracker reported an error");
            }
            GazeSignal::TrackingStopped => {
                tracing::info!(clusters = self.clusters.len(), "Gaze tracking paused");
                self.tracking = false;
            }
            GazeSignal::TrackingStarted => {
                tracing::info!("Gaze tracking resumed");
                self.tracking = true;
            }
            GazeSignal::Restart => self.restart(),
        }
    }

    /// Clears clusters and calibration; the tracker must calibrate again.
    pub fn restart(&mut self) {
        tracing::info!(cleared = self.clusters.len(), "Gaze tracking restarted");
        self.clusters.clear();
        self.latest = None;
        self.calibrated = false;
        self.tracking = true;
        self.camera_denied = false;
    }
}
