//! Emotion stability filter.
//!
//! Each label keeps its previous raw score and its current stabilized
//! score. A new raw score is adopted only when it moves further than the
//! distance threshold from the previous raw score; smaller moves are
//! treated as jitter and the stabilized score is held.

use std::collections::{HashMap, HashSet};

use crate::emotion::{sanitize_score, EmotionSample};
use crate::error::{check_threshold, InsightsError};

pub const DEFAULT_EMBEDDING_DISTANCE_THRESHOLD: f64 = 0.2;

#[derive(Debug, Clone, Copy)]
struct LabelTrack {
    previous_raw: f64,
    stabilized: f64,
}

#[derive(Debug, Clone)]
pub struct StabilityFilter {
    distance_threshold: f64,
    tracks: HashMap<String, LabelTrack>,
    /// Euclidean norm of the per-label deltas of the last frame.
    last_embedding_distance: f64,
}

impl Default for StabilityFilter {
    fn default() -> Self {
        Self {
            distance_threshold: DEFAULT_EMBEDDING_DISTANCE_THRESHOLD,
            tracks: HashMap::new(),
            last_embedding_distance: 0.0,
        }
    }
}

impl StabilityFilter {
    pub fn new(distance_threshold: f64) -> Result<Self, InsightsError> {
        Ok(Self {
            distance_threshold: check_threshold("embedding_distance_threshold", distance_threshold)?,
            ..Self::default()
        })
    }

    pub fn distance_threshold(&self) -> f64 {
        self.distance_threshold
    }

    pub fn last_embedding_distance(&self) -> f64 {
        self.last_embedding_distance
    }

    /// Stabilizes one frame. The output holds every label of `raw`, in `raw`
    /// order. A label repeated within the frame keeps its first entry only.
    pub fn stabilize(&mut self, raw: &[EmotionSample]) -> Vec<EmotionSample> {
        let mut squared = 0.0;
        let mut out = Vec::with_capacity(raw.len());
        let mut in_frame: HashSet<&str> = HashSet::with_capacity(raw.len());

        for sample in raw {
            if !in_frame.insert(sample.name.as_str()) {
                tracing::debug!(label = %sample.name, "Duplicate label in frame dropped");
                continue;
            }
            if !sample.score.is_finite() {
                tracing::warn!(label = %sample.name, "Non-finite emotion score treated as 0");
            }
            let score = sanitize_score(sample.score);

            let stabilized = match self.tracks.get_mut(&sample.name) {
                Some(track) => {
                    let distance = (score - track.previous_raw).abs();
                    squared += distance * distance;
                    if distance > self.distance_threshold {
                        track.stabilized = score;
                    }
                    track.previous_raw = score;
                    track.stabilized
                }
                None => {
                    self.tracks.insert(
                        sample.name.clone(),
                        LabelTrack {
                            previous_raw: score,
                            stabilized: score,
                        },
                    );
                    score
                }
            };

            out.push(EmotionSample::new(sample.name.clone(), stabilized));
        }

        self.last_embedding_distance = squared.sqrt();
        out
    }

    pub fn reset(&mut self) {
        self.tracks.clear();
        self.last_embedding_distance = 0.0;
    }
}
