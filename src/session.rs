use crate::bbox::BBox;
use crate::circular_queue::CircularQueue;
use crate::config::{MatchingPolicy, TrackerConfig};
use crate::error::Error;
use crate::heatmap::{self, check_position, DensityGrid};
use crate::matcher::{Candidate, GreedyMatcher, Matcher, OneToOneMatcher, Slot};
use crate::{Frame, Identity, Track};

use nalgebra as na;
use serde_derive::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub id: Identity,
    pub x: f32,
    pub y: f32,
}

/// Outcome of one processed frame.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct FrameAssignment {
    pub frame: u64,
    pub timestamp: f32,

    // one entry per accepted detection, in detection order
    pub assignments: Vec<Assignment>,
    pub born: Vec<Identity>,
    pub retired: Vec<Identity>,
}

impl FrameAssignment {
    #[inline]
    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn identity_of(&self, x: f32, y: f32) -> Option<Identity> {
        self.assignments
            .iter()
            .find(|a| a.x == x && a.y == y)
            .map(|a| a.id)
    }
}

#[derive(Debug, Clone)]
pub struct Participant {
    pub id: Identity,

    // newest first, only the latest entry is used for matching
    pub recent: CircularQueue<na::Point2<f32>>,

    // every position ever assigned, oldest first
    pub history: Vec<na::Point2<f32>>,
    pub first_frame: u64,
    pub last_frame: u64,
    pub retired: bool,
}

impl Participant {
    fn new(id: Identity, frame: u64, recent_capacity: usize) -> Self {
        Self {
            id,
            recent: CircularQueue::with_capacity(recent_capacity),
            history: Vec::new(),
            first_frame: frame,
            last_frame: frame,
            retired: false,
        }
    }

    fn update(&mut self, frame: u64, pos: na::Point2<f32>) {
        self.recent.push(pos);
        self.history.push(pos);
        self.last_frame = frame;
    }

    #[inline]
    pub fn last_position(&self) -> Option<&na::Point2<f32>> {
        self.recent.latest()
    }
}

/// Owns every identity of one video session: the recent buffers used for
/// matching and the cumulative histories used for heatmaps.
#[derive(Debug)]
pub struct Session {
    config: TrackerConfig,
    matcher: Box<dyn Matcher>,
    participants: Vec<Participant>,
    frames: u64,
}

impl Session {
    pub fn new(config: TrackerConfig) -> Result<Self, Error> {
        let matcher: Box<dyn Matcher> = match config.matching {
            MatchingPolicy::Greedy => Box::new(GreedyMatcher),
            MatchingPolicy::OneToOne => Box::new(OneToOneMatcher),
        };

        Self::with_matcher(config, matcher)
    }

    pub fn with_matcher(config: TrackerConfig, matcher: Box<dyn Matcher>) -> Result<Self, Error> {
        config.validate()?;

        log::debug!(
            "tracking session on {}x{} field, matcher {:?}",
            config.field_width,
            config.field_height,
            matcher
        );

        Ok(Self {
            config,
            matcher,
            participants: Vec::with_capacity(32),
            frames: 0,
        })
    }

    #[inline]
    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    #[inline]
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }

    /// Runs one detector frame through the engine, using the configured
    /// distance threshold. Detections of classes or confidences the config
    /// does not keep are dropped before matching.
    pub fn update(&mut self, frame: &Frame) -> Result<FrameAssignment, Error> {
        if frame.dims != self.config.field() {
            return Err(Error::FrameDims {
                expected: self.config.field(),
                got: frame.dims,
            });
        }

        let mut positions = Vec::with_capacity(frame.len());

        for det in frame.iter() {
            let [x1, y1, x2, y2]: [f32; 4] = det.ltrb().into();
            let bbox = BBox::checked(x1, y1, x2, y2)?;

            if self.config.keeps(det.class, det.confidence) {
                positions.push(bbox.centroid());
            }
        }

        let mut res = self.assign(&positions, self.config.distance_threshold)?;
        res.timestamp = frame.timestamp;

        Ok(res)
    }

    /// Maps detection centroids to identities.
    ///
    /// Validation happens before anything is touched, so a rejected call
    /// leaves the session as it was.
    pub fn assign(
        &mut self,
        positions: &[na::Point2<f32>],
        threshold: f32,
    ) -> Result<FrameAssignment, Error> {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(Error::InvalidThreshold(threshold));
        }

        let (fw, fh) = self.config.field();
        for p in positions {
            check_position(p, fw as f32, fh as f32)?;
        }

        let frame = self.frames;
        let mut res = FrameAssignment {
            frame,
            ..Default::default()
        };

        if !positions.is_empty() {
            let candidates: Vec<Candidate> = self
                .participants
                .iter()
                .filter(|p| !p.retired)
                .filter_map(|p| {
                    Some(Candidate {
                        id: p.id,
                        position: *p.last_position()?,
                    })
                })
                .collect();

            let slots = self.matcher.match_frame(positions, &candidates, threshold)?;
            self.check_slots(&slots, positions.len(), &candidates)?;

            // newborn slots get identities in order of first appearance
            let mut born: Vec<(usize, Identity)> = Vec::new();

            for (pos, slot) in positions.iter().zip(slots) {
                let id = match slot {
                    Slot::Track(id) => id,
                    Slot::Born(k) => match born.iter().find(|(b, _)| *b == k) {
                        Some((_, id)) => *id,
                        None => {
                            let id = self.allocate(frame);
                            log::debug!("frame {}: new {} at ({}, {})", frame, id, pos.x, pos.y);
                            born.push((k, id));
                            res.born.push(id);
                            id
                        }
                    },
                };

                log::trace!("frame {}: ({}, {}) -> {}", frame, pos.x, pos.y, id);

                self.participants[id.index()].update(frame, *pos);
                res.assignments.push(Assignment {
                    id,
                    x: pos.x,
                    y: pos.y,
                });
            }
        }

        if let Some(max_idle) = self.config.max_idle_frames {
            for p in self.participants.iter_mut().filter(|p| !p.retired) {
                if frame - p.last_frame > max_idle as u64 {
                    p.retired = true;
                    log::debug!("frame {}: {} retired after {} idle frames", frame, p.id, max_idle);
                    res.retired.push(p.id);
                }
            }
        }

        log::debug!(
            "frame {}: {} detections, {} new, {} identities",
            frame,
            res.assignments.len(),
            res.born.len(),
            self.participants.len()
        );

        self.frames += 1;

        Ok(res)
    }

    /// Matchers may only hand detections to the candidates they were offered.
    fn check_slots(
        &self,
        slots: &[Slot],
        expected: usize,
        candidates: &[Candidate],
    ) -> Result<(), Error> {
        if slots.len() != expected {
            return Err(Error::Assignment(format!(
                "matcher returned {} slots for {} detections",
                slots.len(),
                expected
            )));
        }

        for slot in slots {
            if let Slot::Track(id) = slot {
                self.participant(*id)?;

                if !candidates.iter().any(|c| c.id == *id) {
                    return Err(Error::Assignment(format!(
                        "matcher picked {} which was not a candidate",
                        id
                    )));
                }
            }
        }

        Ok(())
    }

    fn allocate(&mut self, frame: u64) -> Identity {
        let id = Identity(self.participants.len() as u32);
        self.participants
            .push(Participant::new(id, frame, self.config.recent_capacity));

        id
    }

    fn participant(&self, id: Identity) -> Result<&Participant, Error> {
        self.participants
            .get(id.index())
            .ok_or(Error::UnknownIdentity(id))
    }

    /// All identities ever allocated, in ascending order.
    pub fn identities(&self) -> Vec<Identity> {
        self.participants.iter().map(|p| p.id).collect()
    }

    /// Identities still taking part in matching.
    pub fn active_identities(&self) -> Vec<Identity> {
        self.participants
            .iter()
            .filter(|p| !p.retired)
            .map(|p| p.id)
            .collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    pub fn history(&self, id: Identity) -> Result<&[na::Point2<f32>], Error> {
        Ok(&self.participant(id)?.history)
    }

    /// Recent track buffer, oldest first.
    pub fn recent(&self, id: Identity) -> Result<Vec<na::Point2<f32>>, Error> {
        Ok(self.participant(id)?.recent.asc_iter().copied().collect())
    }

    pub fn last_position(&self, id: Identity) -> Result<Option<na::Point2<f32>>, Error> {
        Ok(self.participant(id)?.last_position().copied())
    }

    /// Density grid of the whole history of `id`, `None` if it has none.
    pub fn heatmap(&self, id: Identity) -> Result<Option<DensityGrid>, Error> {
        let p = self.participant(id)?;
        let (fw, fh) = self.config.field();

        heatmap::aggregate(&p.history, fw, fh, self.config.bins)
    }

    pub fn track(&self, id: Identity) -> Result<Track, Error> {
        Ok(self.snapshot(self.participant(id)?))
    }

    pub fn tracks(&self) -> Vec<Track> {
        self.participants.iter().map(|p| self.snapshot(p)).collect()
    }

    fn snapshot(&self, p: &Participant) -> Track {
        let position = p.last_position().map(|pt| (pt.x, pt.y)).unwrap_or_default();

        Track {
            id: p.id,
            position,
            recent_len: p.recent.len(),
            history_len: p.history.len(),
            first_frame: p.first_frame,
            last_frame: p.last_frame,
            frames_since_update: self.frames.saturating_sub(1) - p.last_frame,
            retired: p.retired,
        }
    }
}

impl crate::Tracking for Session {
    #[inline]
    fn update(&mut self, frame: &Frame) -> Result<FrameAssignment, Error> {
        Session::update(self, frame)
    }

    #[inline]
    fn tracks(&self) -> std::sync::Arc<[Track]> {
        Session::tracks(self).into()
    }
}
