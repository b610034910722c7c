//! Background tracking loop.
//!
//! Frames come from any iterator (a decoder plus detector in a real program),
//! are fed into a [`SharedSession`] on a worker thread, and every processed
//! frame is announced on a bounded channel so a display loop can refresh its
//! player list and heatmap. The loop only looks at the stop and pause flags
//! between frames.

use crate::error::Error;
use crate::shared::SharedSession;
use crate::session::FrameAssignment;
use crate::{Frame, Identity};

use std::sync::mpsc::{sync_channel, Receiver};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const PAUSE_POLL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct FrameReport {
    pub assignment: FrameAssignment,
    pub identities: Vec<Identity>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub frames: u64,
    pub rejected: u64,
    pub identities: usize,
}

pub struct TrackingHandle {
    shared: SharedSession,
    reports: Receiver<FrameReport>,
    worker: JoinHandle<PipelineSummary>,
}

impl TrackingHandle {
    #[inline]
    pub fn session(&self) -> &SharedSession {
        &self.shared
    }

    #[inline]
    pub fn reports(&self) -> &Receiver<FrameReport> {
        &self.reports
    }

    #[inline]
    pub fn stop(&self) {
        self.shared.stop();
    }

    #[inline]
    pub fn pause(&self) {
        self.shared.pause();
    }

    #[inline]
    pub fn resume(&self) {
        self.shared.resume();
    }

    /// Stops the worker and waits for it. Pending reports are discarded so a
    /// worker blocked on a full channel can finish, and the stop flag also
    /// ends a paused worker.
    pub fn join(self) -> thread::Result<PipelineSummary> {
        self.shared.stop();
        drop(self.reports);
        self.worker.join()
    }
}

/// Spawns the tracking worker. `backlog` bounds the number of reports that
/// may wait for the display side before the worker blocks.
pub fn spawn_tracking<I>(shared: SharedSession, frames: I, backlog: usize) -> TrackingHandle
where
    I: IntoIterator<Item = Frame>,
    I::IntoIter: Send + 'static,
{
    let (tx, rx) = sync_channel(backlog);
    let session = shared.clone();
    let mut frames = frames.into_iter();

    let worker = thread::spawn(move || {
        let mut summary = PipelineSummary::default();

        log::info!("tracking worker started");

        loop {
            if session.is_stopped() {
                log::debug!("tracking worker received stop signal");
                break;
            }

            if session.is_paused() {
                thread::sleep(PAUSE_POLL);
                continue;
            }

            let frame = match frames.next() {
                Some(frame) => frame,
                None => {
                    log::debug!("frame source exhausted");
                    break;
                }
            };

            match session.update(&frame) {
                Ok(assignment) => {
                    summary.frames += 1;

                    let report = FrameReport {
                        assignment,
                        identities: session.identities(),
                    };

                    if tx.send(report).is_err() {
                        log::debug!("report receiver dropped, stopping");
                        break;
                    }
                }
                Err(Error::Stopped) => break,
                Err(err) => {
                    summary.rejected += 1;
                    log::warn!("skipping frame at {}s: {}", frame.timestamp, err);
                }
            }
        }

        summary.identities = session.read(|s| s.len());

        log::info!(
            "tracking worker done: {} frames, {} rejected, {} identities",
            summary.frames,
            summary.rejected,
            summary.identities
        );

        summary
    });

    TrackingHandle {
        shared,
        reports: rx,
        worker,
    }
}
