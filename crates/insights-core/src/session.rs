//! Live emotion session.
//!
//! Ties the stability filter, descriptor selector and recorder to one
//! owner. The latest stabilized frame lives here and every recording tick
//! reads it at tick time, so a tick always samples the newest scores and
//! never a copy taken when the recording started.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::descriptor::{DescriptorSelector, DescriptorTable, DEFAULT_SCORE_GAP_THRESHOLD};
use crate::emotion::EmotionSample;
use crate::error::InsightsError;
use crate::export::{aggregate, ExportSink, ExportTable};
use crate::recorder::{RecordedRow, RecorderState, SessionRecorder};
use crate::stability::{StabilityFilter, DEFAULT_EMBEDDING_DISTANCE_THRESHOLD};
use crate::wordcloud::{WordCloudRenderer, WordCloudStyle, WordWeight};

#[derive(Debug, Clone)]
pub struct EmotionSettings {
    pub embedding_distance_threshold: f64,
    pub score_gap_threshold: f64,
    pub descriptors: DescriptorTable,
    pub word_cloud: WordCloudStyle,
}

impl Default for EmotionSettings {
    fn default() -> Self {
        Self {
            embedding_distance_threshold: DEFAULT_EMBEDDING_DISTANCE_THRESHOLD,
            score_gap_threshold: DEFAULT_SCORE_GAP_THRESHOLD,
            descriptors: DescriptorTable::default(),
            word_cloud: WordCloudStyle::default(),
        }
    }
}

/// What a renderer needs after one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionUpdate {
    pub stabilized: Vec<EmotionSample>,
    pub descriptor: String,
    pub embedding_distance: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionExport {
    pub table: ExportTable,
    pub word_cloud: Vec<WordWeight>,
}

#[derive(Debug, Clone)]
pub struct EmotionSession {
    filter: StabilityFilter,
    selector: DescriptorSelector,
    recorder: SessionRecorder,
    word_cloud: WordCloudStyle,
    latest: Vec<EmotionSample>,
    descriptor: String,
    /// Every label seen so far, in order of first appearance.
    known_labels: Vec<String>,
    label_set: HashSet<String>,
    frames: u64,
}

impl Default for EmotionSession {
    fn default() -> Self {
        Self {
            filter: StabilityFilter::default(),
            selector: DescriptorSelector::default(),
            recorder: SessionRecorder::new(),
            word_cloud: WordCloudStyle::default(),
            latest: Vec::new(),
            descriptor: String::new(),
            known_labels: Vec::new(),
            label_set: HashSet::new(),
            frames: 0,
        }
    }
}

impl EmotionSession {
    pub fn new(settings: EmotionSettings) -> Result<Self, InsightsError> {
        Ok(Self {
            filter: StabilityFilter::new(settings.embedding_distance_threshold)?,
            selector: DescriptorSelector::new(settings.score_gap_threshold, settings.descriptors)?,
            word_cloud: settings.word_cloud,
            ..Self::default()
        })
    }

    pub fn push_frame(&mut self, raw: &[EmotionSample]) -> EmotionUpdate {
        for sample in raw {
            if self.label_set.insert(sample.name.clone()) {
                self.known_labels.push(sample.name.clone());
            }
        }

        self.latest = self.filter.stabilize(raw);
        self.descriptor = self.selector.describe(&self.latest);
        self.frames += 1;

        EmotionUpdate {
            stabilized: self.latest.clone(),
            descriptor: self.descriptor.clone(),
            embedding_distance: self.filter.last_embedding_distance(),
        }
    }

    pub fn latest(&self) -> &[EmotionSample] {
        &self.latest
    }

    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    pub fn known_labels(&self) -> &[String] {
        &self.known_labels
    }

    /// Distinct labels in `raw` that this session has not seen yet.
    pub fn unseen_labels(&self, raw: &[EmotionSample]) -> usize {
        raw.iter()
            .map(|s| s.name.as_str())
            .filter(|name| !self.label_set.contains(*name))
            .collect::<HashSet<_>>()
            .len()
    }

    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn recorder_state(&self) -> RecorderState {
        self.recorder.state()
    }

    pub fn recorded_rows(&self) -> usize {
        self.recorder.rows().len()
    }

    pub fn is_recording(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Returns the recording generation, or `None` if already recording.
    pub fn start_recording(&mut self, now_ms: u64) -> Option<u64> {
        self.recorder.start(now_ms)
    }

    /// Samples the current stabilized frame into the running recording.
    pub fn tick(&mut self, generation: u64, now_ms: u64) -> Option<RecordedRow> {
        self.recorder
            .on_tick(generation, now_ms, &self.latest)
            .cloned()
    }

    /// Stops the recording and builds the export. Idle sessions yield an empty export.
    pub fn stop_recording(&mut self) -> SessionExport {
        let rows = self.recorder.stop();
        let table = aggregate(&rows, &self.known_labels);
        let word_cloud = self.word_cloud.weigh(&table.averages());
        SessionExport { table, word_cloud }
    }

    /// Stops the recording and hands the results to the external sinks.
    pub fn finish_recording<S, R>(&mut self, sink: &mut S, renderer: &mut R)
    where
        S: ExportSink + ?Sized,
        R: WordCloudRenderer + ?Sized,
    {
        let export = self.stop_recording();
        renderer.render(export.word_cloud);
        sink.deliver(export.table);
    }

    pub fn set_word_cloud_style(&mut self, style: WordCloudStyle) {
        self.word_cloud = style;
    }

    pub fn reset(&mut self) {
        self.recorder.stop();
        self.filter.reset();
        self.latest.clear();
        self.descriptor.clear();
        self.known_labels.clear();
        self.label_set.clear();
        self.frames = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(pairs: &[(&str, f64)]) -> Vec<EmotionSample> {
        pairs
            .iter()
            .map(|(name, score)| EmotionSample::new(*name, *score))
            .collect()
    }

    #[test]
    fn tick_reads_latest_frame_not_start_snapshot() {
        let mut session = EmotionSession::default();
        session.push_frame(&frame(&[("Joy", 0.9), ("Calmness", 0.1)]));
        let generation = session.start_recording(0).unwrap();

        session.push_frame(&frame(&[("Joy", 0.1), ("Calmness", 0.9)]));
        let row = session.tick(generation, 2_000).unwrap();

        assert_eq!(row.scores["Calmness"], 0.9);
        assert_eq!(row.scores["Joy"], 0.1);
    }

    #[test]
    fn stop_exports_sorted_table_and_word_cloud() {
        let mut session = EmotionSession::default();
        session.push_frame(&frame(&[("Joy", 0.5), ("Calmness", 0.25), ("Awe", 0.0)]));
        let generation = session.start_recording(0).unwrap();
        session.tick(generation, 2_000);
        session.tick(generation, 4_000);

        let export = session.stop_recording();
        assert_eq!(export.table.columns, vec!["Joy", "Calmness"]);
        assert_eq!(export.table.rows.len(), 2);
        assert_eq!(export.word_cloud.len(), 2);
        assert_eq!(export.word_cloud[0].text, "Joy");
        assert!(export.word_cloud[0].size > export.word_cloud[1].size);
        assert!(!session.is_recording());
    }

    #[test]
    fn stop_when_idle_is_empty() {
        let mut session = EmotionSession::default();
        let export = session.stop_recording();
        assert!(export.table.is_empty());
        assert!(export.word_cloud.is_empty());
    }

    #[test]
    fn finish_hands_off_to_sinks() {
        let mut session = EmotionSession::default();
        session.push_frame(&frame(&[("Joy", 0.5), ("Calmness", 0.25)]));
        let generation = session.start_recording(0).unwrap();
        session.tick(generation, 2_000);

        let mut tables = Vec::new();
        let mut clouds = Vec::new();
        session.finish_recording(
            &mut |table: ExportTable| tables.push(table),
            &mut |words: Vec<WordWeight>| clouds.push(words),
        );
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].columns.len(), 2);
        assert_eq!(clouds[0].len(), 2);
    }

    #[test]
    fn push_frame_reports_descriptor() {
        let mut session = EmotionSession::default();
        let update = session.push_frame(&frame(&[("Joy", 0.62), ("Calmness", 0.58)]));
        assert_eq!(update.descriptor, "calm Joy");
        assert_eq!(session.descriptor(), "calm Joy");
        assert_eq!(session.known_labels(), &["Joy".to_string(), "Calmness".to_string()]);
    }

    #[test]
    fn repeated_label_records_first_score() {
        let mut session = EmotionSession::default();
        let update = session.push_frame(&frame(&[("Joy", 0.9), ("Joy", 0.1), ("Calmness", 0.2)]));
        assert_eq!(update.stabilized, frame(&[("Joy", 0.9), ("Calmness", 0.2)]));
        assert_eq!(update.embedding_distance, 0.0);

        let generation = session.start_recording(0).unwrap();
        let row = session.tick(generation, 2_000).unwrap();
        assert_eq!(row.scores["Joy"], 0.9);
        assert_eq!(session.known_labels().len(), 2);
    }

    #[test]
    fn unseen_labels_counts_distinct_new_names() {
        let mut session = EmotionSession::default();
        session.push_frame(&frame(&[("Joy", 0.5)]));
        assert_eq!(session.unseen_labels(&frame(&[("Joy", 0.1), ("Awe", 0.2), ("Awe", 0.3)])), 1);

        session.reset();
        assert_eq!(session.unseen_labels(&frame(&[("Joy", 0.1)])), 1);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let settings = EmotionSettings {
            score_gap_threshold: f64::NAN,
            ..EmotionSettings::default()
        };
        assert!(EmotionSession::new(settings).is_err());
    }
}
