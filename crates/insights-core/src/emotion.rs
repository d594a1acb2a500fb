use serde::{Deserialize, Serialize};

/// One emotion label with its score for a single frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmotionSample {
    pub name: String,
    pub score: f64,
}

impl EmotionSample {
    pub fn new(name: impl Into<String>, score: f64) -> Self {
        Self {
            name: name.into(),
            score,
        }
    }
}

/// Maps a raw score into [0, 1]. Non-finite input becomes 0.
pub fn sanitize_score(score: f64) -> f64 {
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Descending by score. `sort_by` is stable, so equal scores keep encounter order.
pub fn sorted_by_score(samples: &[EmotionSample]) -> Vec<EmotionSample> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| b.score.total_cmp(&a.score));
    sorted
}

pub fn top_k(samples: &[EmotionSample], k: usize) -> Vec<EmotionSample> {
    let mut sorted = sorted_by_score(samples);
    sorted.truncate(k);
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_is_stable_on_ties() {
        let samples = vec![
            EmotionSample::new("Calmness", 0.4),
            EmotionSample::new("Joy", 0.7),
            EmotionSample::new("Interest", 0.4),
        ];
        let sorted = sorted_by_score(&samples);
        let names: Vec<&str> = sorted.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Joy", "Calmness", "Interest"]);
    }

    #[test]
    fn top_k_truncates_short_input() {
        let samples = vec![EmotionSample::new("Joy", 0.7)];
        assert_eq!(top_k(&samples, 3).len(), 1);
    }

    #[test]
    fn sanitize_clamps() {
        assert_eq!(sanitize_score(1.5), 1.0);
        assert_eq!(sanitize_score(-0.2), 0.0);
        assert_eq!(sanitize_score(f64::INFINITY), 0.0);
        assert_eq!(sanitize_score(0.42), 0.42);
    }
}
