use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Persistent handle of one tracked player. Handles are dense and allocated
/// in order starting from zero.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Identity(pub u32);

impl Identity {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Player {}", self.0)
    }
}

/// Read-only snapshot of one identity for selection lists and overlays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: Identity,

    // (x,y) of the latest assigned centroid
    pub position: (f32, f32),
    pub recent_len: usize,
    pub history_len: usize,
    pub first_frame: u64,
    pub last_frame: u64,
    pub frames_since_update: u64,
    pub retired: bool,
}
