use crate::error::Error;
use crate::heatmap::DensityGrid;
use crate::session::{FrameAssignment, Session};
use crate::{Frame, Identity, Track};

use nalgebra as na;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Session shared between the tracking thread and the display side.
///
/// A single lock guards all identity state: the tracking side takes it for
/// writing once per frame, queries take it for reading and copy out what
/// they need. Clones share the same session and flags.
#[derive(Debug, Clone)]
pub struct SharedSession {
    inner: Arc<RwLock<Session>>,
    stopped: Arc<AtomicBool>,
    paused: Arc<AtomicBool>,
}

impl SharedSession {
    pub fn new(session: Session) -> Self {
        Self {
            inner: Arc::new(RwLock::new(session)),
            stopped: Arc::new(AtomicBool::new(false)),
            paused: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Feeds one frame unless the session was stopped.
    pub fn update(&self, frame: &Frame) -> Result<FrameAssignment, Error> {
        if self.is_stopped() {
            return Err(Error::Stopped);
        }

        self.inner.write().update(frame)
    }

    /// Stops accepting frames. Collected state stays readable.
    #[inline]
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }

    #[inline]
    pub fn pause(&self) {
        self.paused.store(true, Ordering::SeqCst);
    }

    #[inline]
    pub fn resume(&self) {
        self.paused.store(false, Ordering::SeqCst);
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    /// Runs `f` under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&Session) -> R) -> R {
        f(&self.inner.read())
    }

    pub fn identities(&self) -> Vec<Identity> {
        self.inner.read().identities()
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.inner.read().tracks()
    }

    pub fn history(&self, id: Identity) -> Result<Vec<na::Point2<f32>>, Error> {
        self.inner.read().history(id).map(<[_]>::to_vec)
    }

    pub fn heatmap(&self, id: Identity) -> Result<Option<DensityGrid>, Error> {
        self.inner.read().heatmap(id)
    }

    pub fn frames_processed(&self) -> u64 {
        self.inner.read().frames_processed()
    }
}

impl crate::Tracking for SharedSession {
    #[inline]
    fn update(&mut self, frame: &Frame) -> Result<FrameAssignment, Error> {
        SharedSession::update(self, frame)
    }

    #[inline]
    fn tracks(&self) -> Arc<[Track]> {
        SharedSession::tracks(self).into()
    }
}
