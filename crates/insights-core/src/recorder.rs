//! Session recorder.
//!
//! Idle → Recording → Idle. While recording, every tick samples the top
//! emotions of the live snapshot handed in by the caller and appends one
//! timestamped row. The timer itself lives with the caller (tokio in the
//! service, `setInterval` in the browser); the recorder only validates
//! that a tick belongs to the current recording.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::emotion::{top_k, EmotionSample};

/// The only supported sampling period.
pub const RECORDING_PERIOD_MS: u64 = 2_000;

/// Emotions kept per tick.
pub const TOP_K: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedRow {
    pub timestamp_seconds: u64,
    pub scores: BTreeMap<String, f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status")]
pub enum RecorderState {
    Idle,
    #[serde(rename_all = "camelCase")]
    Recording { started_at_ms: u64, generation: u64 },
}

#[derive(Debug, Clone)]
pub struct SessionRecorder {
    state: RecorderState,
    rows: Vec<RecordedRow>,
    next_generation: u64,
}

impl Default for SessionRecorder {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionRecorder {
    pub fn new() -> Self {
        Self {
            state: RecorderState::Idle,
            rows: Vec::new(),
            next_generation: 1,
        }
    }

    pub fn state(&self) -> RecorderState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        matches!(self.state, RecorderState::Recording { .. })
    }

    /// Generation of the active recording, if any.
    pub fn generation(&self) -> Option<u64> {
        match self.state {
            RecorderState::Recording { generation, .. } => Some(generation),
            RecorderState::Idle => None,
        }
    }

    pub fn rows(&self) -> &[RecordedRow] {
        &self.rows
    }

    /// Starts a recording at `now_ms`. Returns the new generation, or `None`
    /// when a recording is already running.
    pub fn start(&mut self, now_ms: u64) -> Option<u64> {
        if self.is_recording() {
            tracing::debug!("Recorder already running, start ignored");
            return None;
        }

        let generation = self.next_generation;
        self.next_generation += 1;
        self.rows.clear();
        self.state = RecorderState::Recording {
            started_at_ms: now_ms,
            generation,
        };
        tracing::info!(generation, "Recording started");
        Some(generation)
    }

    /// Stops the recording and hands back its rows. Idempotent: a second
    /// call returns an empty sequence.
    pub fn stop(&mut self) -> Vec<RecordedRow> {
        match self.state {
            RecorderState::Idle => Vec::new(),
            RecorderState::Recording { generation, .. } => {
                self.state = RecorderState::Idle;
                let rows = std::mem::take(&mut self.rows);
                tracing::info!(generation, rows = rows.len(), "Recording stopped");
                rows
            }
        }
    }

    /// Appends one row sampled from `live` if `generation` is the running one.
    pub fn on_tick(
        &mut self,
        generation: u64,
        now_ms: u64,
        live: &[EmotionSample],
    ) -> Option<&RecordedRow> {
        let started_at_ms = match self.state {
            RecorderState::Recording {
                started_at_ms,
                generation: current,
            } if current == generation => started_at_ms,
            _ => {
                tracing::debug!(generation, "Stale recording tick dropped");
                return None;
            }
        };

        let timestamp_seconds = now_ms.saturating_sub(started_at_ms) / 1000;
        let scores = top_k(live, TOP_K)
            .into_iter()
            .map(|sample| (sample.name, sample.score))
            .collect();

        self.rows.push(RecordedRow {
            timestamp_seconds,
            scores,
        });
        self.rows.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live() -> Vec<EmotionSample> {
        vec![
            EmotionSample::new("Calmness", 0.3),
            EmotionSample::new("Joy", 0.8),
            EmotionSample::new("Interest", 0.5),
            EmotionSample::new("Boredom", 0.1),
        ]
    }

    #[test]
    fn three_ticks_yield_three_rows() {
        let mut recorder = SessionRecorder::new();
        let generation = recorder.start(10_000).unwrap();
        for i in 1..=3 {
            recorder.on_tick(generation, 10_000 + i * RECORDING_PERIOD_MS, &live());
        }
        let rows = recorder.stop();
        let stamps: Vec<u64> = rows.iter().map(|r| r.timestamp_seconds).collect();
        assert_eq!(stamps, vec![2, 4, 6]);
    }

    #[test]
    fn keeps_top_three_only() {
        let mut recorder = SessionRecorder::new();
        let generation = recorder.start(0).unwrap();
        let row = recorder.on_tick(generation, 2_000, &live()).unwrap();
        assert_eq!(row.scores.len(), 3);
        assert!(!row.scores.contains_key("Boredom"));
        assert_eq!(row.scores["Joy"], 0.8);
    }

    #[test]
    fn elapsed_seconds_floor() {
        let mut recorder = SessionRecorder::new();
        let generation = recorder.start(500).unwrap();
        let row = recorder.on_tick(generation, 2_499, &live()).unwrap();
        assert_eq!(row.timestamp_seconds, 1);
    }

    #[test]
    fn start_while_recording_is_ignored() {
        let mut recorder = SessionRecorder::new();
        let generation = recorder.start(0).unwrap();
        assert_eq!(recorder.start(1_000), None);
        assert_eq!(recorder.generation(), Some(generation));
    }

    #[test]
    fn ticks_after_stop_are_dropped() {
        let mut recorder = SessionRecorder::new();
        let generation = recorder.start(0).unwrap();
        recorder.stop();
        assert!(recorder.on_tick(generation, 2_000, &live()).is_none());
        assert!(recorder.rows().is_empty());
        assert!(recorder.stop().is_empty());
    }

    #[test]
    fn stale_generation_cannot_write_into_new_recording() {
        let mut recorder = SessionRecorder::new();
        let old = recorder.start(0).unwrap();
        recorder.stop();
        let new = recorder.start(5_000).unwrap();
        assert_ne!(old, new);
        assert!(recorder.on_tick(old, 6_000, &live()).is_none());
        assert!(recorder.on_tick(new, 7_000, &live()).is_some());
        assert_eq!(recorder.stop().len(), 1);
    }

    #[test]
    fn restart_clears_previous_rows() {
        let mut recorder = SessionRecorder::new();
        let generation = recorder.start(0).unwrap();
        recorder.on_tick(generation, 2_000, &live());
        let generation = {
            recorder.stop();
            recorder.start(10_000).unwrap()
        };
        assert!(recorder.rows().is_empty());
        recorder.on_tick(generation, 12_000, &live());
        assert_eq!(recorder.rows().len(), 1);
    }

    #[test]
    fn empty_snapshot_records_empty_row() {
        let mut recorder = SessionRecorder::new();
        let generation = recorder.start(0).unwrap();
        let row = recorder.on_tick(generation, 2_000, &[]).unwrap();
        assert!(row.scores.is_empty());
    }
}
