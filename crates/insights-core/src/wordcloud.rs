//! Word-cloud weighting.
//!
//! Sizes scale linearly with a label's average over the `[min, max]`
//! range of all averages; colours are interpolated channel by channel
//! between two endpoint colours over the same normalized range.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::InsightsError;

pub const DEFAULT_MIN_SIZE: f64 = 14.0;
pub const DEFAULT_MAX_SIZE: f64 = 64.0;
pub const DEFAULT_LOW_COLOR: Rgb = Rgb(0x9e, 0xca, 0xe1);
pub const DEFAULT_HIGH_COLOR: Rgb = Rgb(0x08, 0x30, 0x6b);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl FromStr for Rgb {
    type Err = InsightsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InsightsError::InvalidColor(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(invalid)?;
        if hex.len() != 6 || !hex.is_ascii() {
            return Err(invalid());
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Rgb {
    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (f64::from(a) + (f64::from(b) - f64::from(a)) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordWeight {
    pub text: String,
    pub size: f64,
    pub color: String,
}

/// Receives the ranked words. Fire-and-forget.
pub trait WordCloudRenderer {
    fn render(&mut self, words: Vec<WordWeight>);
}

impl<F> WordCloudRenderer for F
where
    F: FnMut(Vec<WordWeight>),
{
    fn render(&mut self, words: Vec<WordWeight>) {
        self(words)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WordCloudStyle {
    min_size: f64,
    max_size: f64,
    low: Rgb,
    high: Rgb,
}

impl Default for WordCloudStyle {
    fn default() -> Self {
        Self {
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            low: DEFAULT_LOW_COLOR,
            high: DEFAULT_HIGH_COLOR,
        }
    }
}

impl WordCloudStyle {
    pub fn new(min_size: f64, max_size: f64, low: Rgb, high: Rgb) -> Result<Self, InsightsError> {
        if !min_size.is_finite() || !max_size.is_finite() || min_size < 0.0 || min_size > max_size {
            return Err(InsightsError::InvalidSizeRange {
                min: min_size,
                max: max_size,
            });
        }
        Ok(Self {
            min_size,
            max_size,
            low,
            high,
        })
    }

    /// Parses `#rrggbb` endpoint colours.
    pub fn parse(
        min_size: f64,
        max_size: f64,
        low: &str,
        high: &str,
    ) -> Result<Self, InsightsError> {
        Self::new(min_size, max_size, low.parse()?, high.parse()?)
    }

    /// Weights `(label, average)` pairs, keeping their order.
    pub fn weigh(&self, averages: &[(String, f64)]) -> Vec<WordWeight> {
        let (min, max) = averages
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (_, v)| {
                (lo.min(*v), hi.max(*v))
            });
        let span = max - min;

        averages
            .iter()
            .map(|(label, average)| {
                // a single distinct value sits at the top of the range
                let t = if span > f64::EPSILON {
                    ((average - min) / span).clamp(0.0, 1.0)
                } else {
                    1.0
                };
                WordWeight {
                    text: label.clone(),
                    size: self.min_size + (self.max_size - self.min_size) * t,
                    color: self.low.lerp(self.high, t).to_string(),
                }
            })
            .collect()
    }
}
