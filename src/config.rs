use crate::error::Error;
use serde_derive::{Deserialize, Serialize};

pub const DEFAULT_DISTANCE_THRESHOLD: f32 = 100.0;
pub const DEFAULT_RECENT_CAPACITY: usize = 30;
pub const DEFAULT_BINS: usize = 50;
/// Upper bound for `bins`, the grid holds `bins * bins` counters.
pub const MAX_BINS: usize = 4096;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchingPolicy {
    /// Each detection independently takes the closest track, in order.
    #[default]
    Greedy,
    /// Hungarian assignment, at most one detection per track and frame.
    OneToOne,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    pub field_width: u32,
    pub field_height: u32,
    pub distance_threshold: f32,
    pub recent_capacity: usize,
    pub bins: usize,
    pub matching: MatchingPolicy,

    // frames without a match before a track stops being a candidate
    pub max_idle_frames: Option<u32>,

    // detector classes to keep, empty keeps everything
    pub classes: Vec<i32>,
    pub min_confidence: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            field_width: 0,
            field_height: 0,
            distance_threshold: DEFAULT_DISTANCE_THRESHOLD,
            recent_capacity: DEFAULT_RECENT_CAPACITY,
            bins: DEFAULT_BINS,
            matching: MatchingPolicy::Greedy,
            max_idle_frames: None,
            classes: Vec::new(),
            min_confidence: 0.0,
        }
    }
}

impl TrackerConfig {
    pub fn new(field_width: u32, field_height: u32) -> Self {
        Self {
            field_width,
            field_height,
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.field_width == 0 || self.field_height == 0 {
            return Err(Error::InvalidField {
                width: self.field_width as f32,
                height: self.field_height as f32,
            });
        }

        if !self.distance_threshold.is_finite() || self.distance_threshold <= 0.0 {
            return Err(Error::InvalidThreshold(self.distance_threshold));
        }

        if self.recent_capacity == 0 {
            return Err(Error::InvalidCapacity);
        }

        if self.bins == 0 || self.bins > MAX_BINS {
            return Err(Error::InvalidBins);
        }

        Ok(())
    }

    #[inline]
    pub fn field(&self) -> (u32, u32) {
        (self.field_width, self.field_height)
    }

    #[inline]
    pub fn keeps(&self, class: i32, confidence: f32) -> bool {
        confidence >= self.min_confidence
            && (self.classes.is_empty() || self.classes.contains(&class))
    }
}
