//! Descriptor selection.
//!
//! Picks the dominant emotion and, when a runner-up is close enough,
//! prefixes it with the runner-up's qualitative descriptor, for example
//! "calm joy" or "anxious concentration".

use std::collections::HashMap;

use crate::emotion::{sorted_by_score, EmotionSample};
use crate::error::{check_threshold, InsightsError};

pub const DEFAULT_SCORE_GAP_THRESHOLD: f64 = 0.1;

/// Descriptors for the facial expression model's labels. `None` means the
/// label has no usable qualitative form.
const BUILTIN_DESCRIPTORS: &[(&str, Option<&str>)] = &[
    ("Admiration", Some("admiring")),
    ("Adoration", Some("adoring")),
    ("Aesthetic Appreciation", Some("appreciative")),
    ("Amusement", Some("amused")),
    ("Anger", Some("angry")),
    ("Anxiety", Some("anxious")),
    ("Awe", Some("awestruck")),
    ("Awkwardness", Some("awkward")),
    ("Boredom", Some("bored")),
    ("Calmness", Some("calm")),
    ("Concentration", Some("focused")),
    ("Confusion", Some("confused")),
    ("Contemplation", Some("contemplative")),
    ("Contempt", Some("contemptuous")),
    ("Contentment", Some("content")),
    ("Craving", Some("craving")),
    ("Desire", Some("desirous")),
    ("Determination", Some("determined")),
    ("Disappointment", Some("disappointed")),
    ("Disgust", Some("disgusted")),
    ("Distress", Some("distressed")),
    ("Doubt", Some("doubtful")),
    ("Ecstasy", Some("ecstatic")),
    ("Embarrassment", Some("embarrassed")),
    ("Empathic Pain", Some("empathetic")),
    ("Entrancement", Some("entranced")),
    ("Envy", Some("envious")),
    ("Excitement", Some("excited")),
    ("Fear", Some("fearful")),
    ("Guilt", Some("guilty")),
    ("Horror", Some("horrified")),
    ("Interest", Some("interested")),
    ("Joy", Some("joyful")),
    ("Love", Some("loving")),
    ("Nostalgia", Some("nostalgic")),
    ("Pain", Some("pained")),
    ("Pride", Some("proud")),
    ("Realization", Some("realizing")),
    ("Relief", Some("relieved")),
    ("Romance", Some("romantic")),
    ("Sadness", Some("sad")),
    ("Satisfaction", Some("satisfied")),
    ("Shame", Some("ashamed")),
    ("Surprise (negative)", None),
    ("Surprise (positive)", None),
    ("Sympathy", Some("sympathetic")),
    ("Tiredness", Some("tired")),
    ("Triumph", Some("triumphant")),
];

/// Read-only label -> descriptor lookup.
#[derive(Debug, Clone)]
pub struct DescriptorTable {
    entries: HashMap<String, Option<String>>,
}

impl Default for DescriptorTable {
    fn default() -> Self {
        Self::from_pairs(
            BUILTIN_DESCRIPTORS
                .iter()
                .map(|(label, descriptor)| (*label, descriptor.map(str::to_string))),
        )
    }
}

impl DescriptorTable {
    pub fn from_pairs<I, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (L, Option<String>)>,
        L: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(label, descriptor)| (label.into(), descriptor))
                .collect(),
        }
    }

    /// Known, non-empty descriptor for `label`, if any.
    pub fn descriptor(&self, label: &str) -> Option<&str> {
        self.entries
            .get(label)
            .and_then(|d| d.as_deref())
            .filter(|d| !d.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Composes the human-readable label for a stabilized frame.
///
/// Returns an empty string when fewer than two emotions are present.
pub fn describe(
    stabilized: &[EmotionSample],
    score_gap_threshold: f64,
    table: &DescriptorTable,
) -> String {
    let sorted = sorted_by_score(stabilized);
    if sorted.len() < 2 {
        return String::new();
    }

    let primary = &sorted[0];
    let (secondary, descriptor) = sorted[1..]
        .iter()
        .find_map(|e| table.descriptor(&e.name).map(|d| (e, d)))
        .unwrap_or((&sorted[1], ""));

    if (primary.score - secondary.score).abs() > score_gap_threshold || descriptor.is_empty() {
        return primary.name.clone();
    }
    format!("{descriptor} {}", primary.name)
}

#[derive(Debug, Clone)]
pub struct DescriptorSelector {
    score_gap_threshold: f64,
    table: DescriptorTable,
}

impl Default for DescriptorSelector {
    fn default() -> Self {
        Self {
            score_gap_threshold: DEFAULT_SCORE_GAP_THRESHOLD,
            table: DescriptorTable::default(),
        }
    }
}

impl DescriptorSelector {
    pub fn new(score_gap_threshold: f64, table: DescriptorTable) -> Result<Self, InsightsError> {
        Ok(Self {
            score_gap_threshold: check_threshold("score_gap_threshold", score_gap_threshold)?,
            table,
        })
    }

    pub fn describe(&self, stabilized: &[EmotionSample]) -> String {
        describe(stabilized, self.score_gap_threshold, &self.table)
    }

    pub fn score_gap_threshold(&self) -> f64 {
        self.score_gap_threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> DescriptorTable {
        DescriptorTable::from_pairs([
            ("A", Some("keen".to_string())),
            ("B", Some("mildly".to_string())),
            ("C", None),
        ])
    }

    fn frame(pairs: &[(&str, f64)]) -> Vec<EmotionSample> {
        pairs
            .iter()
            .map(|(name, score)| EmotionSample::new(*name, *score))
            .collect()
    }

    #[test]
    fn close_runner_up_adds_descriptor() {
        let out = describe(&frame(&[("A", 0.9), ("B", 0.85)]), 0.1, &table());
        assert_eq!(out, "mildly A");
    }

    #[test]
    fn wide_gap_returns_primary_only() {
        let out = describe(&frame(&[("A", 0.9), ("B", 0.5)]), 0.1, &table());
        assert_eq!(out, "A");
    }

    #[test]
    fn single_emotion_is_empty() {
        assert_eq!(describe(&frame(&[("A", 0.5)]), 0.1, &table()), "");
        assert_eq!(describe(&[], 0.1, &table()), "");
    }

    #[test]
    fn skips_labels_without_descriptor() {
        // C has no descriptor, so B becomes the secondary.
        let out = describe(&frame(&[("A", 0.9), ("C", 0.88), ("B", 0.82)]), 0.1, &table());
        assert_eq!(out, "mildly A");
    }

    #[test]
    fn gap_is_measured_against_chosen_secondary() {
        let out = describe(&frame(&[("A", 0.9), ("C", 0.88), ("B", 0.7)]), 0.1, &table());
        assert_eq!(out, "A");
    }

    #[test]
    fn no_descriptor_anywhere_yields_primary_name() {
        let out = describe(&frame(&[("A", 0.9), ("C", 0.88)]), 0.1, &table());
        assert_eq!(out, "A");
    }

    #[test]
    fn unsorted_input_is_ranked_first() {
        let out = describe(&frame(&[("B", 0.85), ("A", 0.9)]), 0.1, &table());
        assert_eq!(out, "mildly A");
    }

    #[test]
    fn builtin_table_covers_common_labels() {
        let table = DescriptorTable::default();
        assert_eq!(table.descriptor("Calmness"), Some("calm"));
        assert_eq!(table.descriptor("Surprise (positive)"), None);
        assert_eq!(table.descriptor("Unknown"), None);

        let selector = DescriptorSelector::default();
        let out = selector.describe(&frame(&[("Joy", 0.62), ("Calmness", 0.58)]));
        assert_eq!(out, "calm Joy");
    }
}
