//! Detection-to-track matching strategies.
//!
//! A matcher only decides *where* each detection goes; the session owns the
//! tracks and applies the decision. Detections that cannot be matched are
//! reported as [`Slot::Born`], numbered in the order the new identities must
//! be allocated.

use crate::error::Error;
use crate::Identity;

use munkres::{solve_assignment, Position, WeightMatrix, Weights};
use nalgebra as na;
use std::fmt;

/// Last known position of a track that may receive detections this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub id: Identity,
    pub position: na::Point2<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Track(Identity),
    /// k-th identity born during this frame
    Born(usize),
}

pub trait Matcher: fmt::Debug + Send + Sync {
    /// Returns one slot per detection, in detection order. `candidates` are
    /// sorted by identity.
    fn match_frame(
        &self,
        detections: &[na::Point2<f32>],
        candidates: &[Candidate],
        threshold: f32,
    ) -> Result<Vec<Slot>, Error>;
}

/// Sequential nearest-neighbour matching.
///
/// Every detection sees the frame as left by the previous ones: its position
/// replaces the matched track's last point, and a track born from an earlier
/// detection of the same frame is already a candidate. Several detections can
/// therefore land on the same track.
#[derive(Debug, Default, Clone, Copy)]
pub struct GreedyMatcher;

impl Matcher for GreedyMatcher {
    fn match_frame(
        &self,
        detections: &[na::Point2<f32>],
        candidates: &[Candidate],
        threshold: f32,
    ) -> Result<Vec<Slot>, Error> {
        let mut live: Vec<(Slot, na::Point2<f32>)> = candidates
            .iter()
            .map(|c| (Slot::Track(c.id), c.position))
            .collect();

        let mut born = 0;
        let mut slots = Vec::with_capacity(detections.len());

        for det in detections {
            let mut best: Option<(usize, f32)> = None;

            for (idx, (_, pos)) in live.iter().enumerate() {
                let dist = na::distance(det, pos);

                // strict so the oldest track wins a tie
                if dist < threshold && best.map_or(true, |(_, d)| dist < d) {
                    best = Some((idx, dist));
                }
            }

            let slot = match best {
                Some((idx, _)) => {
                    live[idx].1 = *det;
                    live[idx].0
                }
                None => {
                    let slot = Slot::Born(born);
                    born += 1;
                    live.push((slot, *det));
                    slot
                }
            };

            slots.push(slot);
        }

        Ok(slots)
    }
}

/// Globally optimal one-to-one matching (Hungarian algorithm) on centroid
/// distance. A track takes at most one detection per frame.
#[derive(Debug, Default, Clone, Copy)]
pub struct OneToOneMatcher;

impl Matcher for OneToOneMatcher {
    fn match_frame(
        &self,
        detections: &[na::Point2<f32>],
        candidates: &[Candidate],
        threshold: f32,
    ) -> Result<Vec<Slot>, Error> {
        let mut assigned: Vec<Option<Identity>> = vec![None; detections.len()];

        if !candidates.is_empty() && !detections.is_empty() {
            let n = detections.len().max(candidates.len());
            let rows = candidates.len();
            let cols = detections.len();

            let dists: Vec<f64> = candidates
                .iter()
                .flat_map(|c| detections.iter().map(move |d| na::distance(d, &c.position) as f64))
                .collect();

            // costlier than any set of admissible pairs
            let forbidden = threshold as f64 * (n as f64 + 1.0);

            let mut mat = WeightMatrix::from_fn(n, |(r, c)| {
                if r < rows && c < cols {
                    let d = dists[r * cols + c];
                    if d < threshold as f64 {
                        d
                    } else {
                        forbidden
                    }
                } else {
                    forbidden
                }
            });

            let solution = solve_assignment(&mut mat)
                .map_err(|err| Error::Assignment(format!("{:?}", err)))?;

            for Position { row, column } in solution {
                if row < rows && column < cols && dists[row * cols + column] < threshold as f64 {
                    assigned[column] = Some(candidates[row].id);
                }
            }

            log::trace!("one-to-one solved {}x{} matrix (n = {})", rows, cols, mat.n());
        }

        let mut born = 0;

        Ok(assigned
            .into_iter()
            .map(|a| match a {
                Some(id) => Slot::Track(id),
                None => {
                    born += 1;
                    Slot::Born(born - 1)
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f32, y: f32) -> na::Point2<f32> {
        na::Point2::new(x, y)
    }

    fn cand(id: u32, x: f32, y: f32) -> Candidate {
        Candidate {
            id: Identity(id),
            position: pt(x, y),
        }
    }

    #[test]
    fn greedy_picks_nearest_within_threshold() {
        let slots = GreedyMatcher
            .match_frame(
                &[pt(110.0, 105.0)],
                &[cand(0, 100.0, 100.0), cand(1, 400.0, 400.0)],
                100.0,
            )
            .unwrap();

        assert_eq!(slots, vec![Slot::Track(Identity(0))]);
    }

    #[test]
    fn greedy_threshold_is_strict() {
        let slots = GreedyMatcher
            .match_frame(&[pt(200.0, 100.0)], &[cand(0, 100.0, 100.0)], 100.0)
            .unwrap();

        assert_eq!(slots, vec![Slot::Born(0)]);
    }

    #[test]
    fn greedy_tie_goes_to_lowest_identity() {
        let slots = GreedyMatcher
            .match_frame(
                &[pt(50.0, 0.0)],
                &[cand(0, 0.0, 0.0), cand(1, 100.0, 0.0)],
                100.0,
            )
            .unwrap();

        assert_eq!(slots, vec![Slot::Track(Identity(0))]);
    }

    #[test]
    fn greedy_lets_two_detections_share_a_track() {
        let slots = GreedyMatcher
            .match_frame(
                &[pt(110.0, 100.0), pt(90.0, 100.0)],
                &[cand(0, 100.0, 100.0)],
                100.0,
            )
            .unwrap();

        assert_eq!(slots, vec![Slot::Track(Identity(0)), Slot::Track(Identity(0))]);
    }

    #[test]
    fn greedy_sees_tracks_born_earlier_in_the_frame() {
        let slots = GreedyMatcher
            .match_frame(&[pt(10.0, 10.0), pt(40.0, 10.0), pt(500.0, 10.0)], &[], 100.0)
            .unwrap();

        assert_eq!(slots, vec![Slot::Born(0), Slot::Born(0), Slot::Born(1)]);
    }

    #[test]
    fn greedy_compares_against_updated_position() {
        // second detection is 150px from the track start but 60px from the first one
        let slots = GreedyMatcher
            .match_frame(&[pt(90.0, 0.0), pt(150.0, 0.0)], &[cand(0, 0.0, 0.0)], 100.0)
            .unwrap();

        assert_eq!(slots, vec![Slot::Track(Identity(0)), Slot::Track(Identity(0))]);
    }

    #[test]
    fn one_to_one_never_shares_a_track() {
        let slots = OneToOneMatcher
            .match_frame(
                &[pt(110.0, 100.0), pt(90.0, 100.0)],
                &[cand(0, 100.0, 100.0)],
                100.0,
            )
            .unwrap();

        assert_eq!(slots.iter().filter(|s| **s == Slot::Track(Identity(0))).count(), 1);
        assert!(slots.contains(&Slot::Born(0)));
    }

    #[test]
    fn one_to_one_prefers_global_optimum() {
        // greedy would put both detections on track 0
        let slots = OneToOneMatcher
            .match_frame(
                &[pt(50.0, 0.0), pt(-40.0, 0.0)],
                &[cand(0, 0.0, 0.0), cand(1, 100.0, 0.0)],
                100.0,
            )
            .unwrap();

        assert_eq!(slots, vec![Slot::Track(Identity(1)), Slot::Track(Identity(0))]);
    }

    #[test]
    fn one_to_one_rejects_far_pairs() {
        let slots = OneToOneMatcher
            .match_frame(
                &[pt(500.0, 500.0), pt(5.0, 5.0)],
                &[cand(3, 0.0, 0.0)],
                100.0,
            )
            .unwrap();

        assert_eq!(slots, vec![Slot::Born(0), Slot::Track(Identity(3))]);
    }

    #[test]
    fn one_to_one_without_candidates_births_everything() {
        let slots = OneToOneMatcher
            .match_frame(&[pt(1.0, 1.0), pt(2.0, 2.0)], &[], 100.0)
            .unwrap();

        assert_eq!(slots, vec![Slot::Born(0), Slot::Born(1)]);
    }
}
