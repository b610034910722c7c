//! Player tracking core: nearest-neighbour identity assignment over detector
//! centroids and per-player movement heatmaps.

pub mod bbox;
pub mod config;
pub mod detection;
pub mod error;
pub mod frame;
pub mod heatmap;
pub mod matcher;
pub mod pipeline;
pub mod session;
pub mod shared;

mod circular_queue;
mod track;

pub use config::{MatchingPolicy, TrackerConfig};
pub use detection::Detection;
pub use frame::Frame;
pub use heatmap::{aggregate, DensityGrid};
pub use session::{Assignment, FrameAssignment, Session};
pub use shared::SharedSession;
pub use track::{Identity, Track};

use error::Error;
use std::sync::Arc;

pub trait Tracking {
    fn update(&mut self, frame: &Frame) -> Result<FrameAssignment, Error>;
    fn tracks(&self) -> Arc<[Track]>;
}
