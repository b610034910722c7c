//! Spatial density of one player's movement over the playing field.
//!
//! The field `[0, width] x [0, height]` is cut into `bins x bins` equal cells
//! and every position is counted in exactly one of them. Positions lying on
//! the far edge go into the last cell. There is no smoothing.

use crate::config::MAX_BINS;
use crate::error::Error;

use nalgebra as na;
use ndarray::Array2;

/// Plain 2D histogram of positions.
///
/// Counts are stored image-wise: `counts()[[row, col]]` where the row is the
/// y bin and the column the x bin, so the grid can be blended straight over a
/// frame-sized background.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityGrid {
    counts: Array2<u32>,
    width: f32,
    height: f32,
}

impl DensityGrid {
    #[inline]
    pub fn bins(&self) -> usize {
        self.counts.nrows()
    }

    #[inline]
    pub fn field(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn counts(&self) -> &Array2<u32> {
        &self.counts
    }

    #[inline]
    pub fn into_counts(self) -> Array2<u32> {
        self.counts
    }

    /// Count in the cell at column `x_bin`, row `y_bin`.
    #[inline]
    pub fn get(&self, x_bin: usize, y_bin: usize) -> Option<u32> {
        self.counts.get([y_bin, x_bin]).copied()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    pub fn max(&self) -> u32 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// `(x_bin, y_bin)` of the cell holding `p`.
    pub fn cell_of(&self, p: &na::Point2<f32>) -> Result<(usize, usize), Error> {
        cell_of(p, self.width, self.height, self.bins())
    }

    /// Counts scaled by the busiest cell into `[0, 1]` for colour mapping.
    pub fn normalized(&self) -> Array2<f32> {
        let max = self.max();

        if max == 0 {
            return Array2::zeros(self.counts.raw_dim());
        }

        self.counts.mapv(|c| c as f32 / max as f32)
    }
}

fn check_field(width: f32, height: f32) -> Result<(), Error> {
    if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
        return Err(Error::InvalidField { width, height });
    }

    Ok(())
}

/// Rejects, never clamps: a clamped point would land in the wrong cell.
pub(crate) fn check_position(p: &na::Point2<f32>, width: f32, height: f32) -> Result<(), Error> {
    let inside = p.x.is_finite()
        && p.y.is_finite()
        && (0.0..=width).contains(&p.x)
        && (0.0..=height).contains(&p.y);

    if !inside {
        return Err(Error::PositionOutOfField {
            x: p.x,
            y: p.y,
            width,
            height,
        });
    }

    Ok(())
}

#[inline]
fn bin(v: f32, extent: f32, bins: usize) -> usize {
    let idx = ((v as f64 / extent as f64) * bins as f64).floor() as usize;

    idx.min(bins - 1)
}

fn cell_of(
    p: &na::Point2<f32>,
    width: f32,
    height: f32,
    bins: usize,
) -> Result<(usize, usize), Error> {
    check_position(p, width, height)?;

    Ok((bin(p.x, width, bins), bin(p.y, height, bins)))
}

/// Builds the density grid of `history` over a `field_width x field_height`
/// field.
///
/// Returns `Ok(None)` when `history` is empty: there is nothing to draw, which
/// is not the same thing as a grid of zeros.
pub fn aggregate(
    history: &[na::Point2<f32>],
    field_width: u32,
    field_height: u32,
    bins: usize,
) -> Result<Option<DensityGrid>, Error> {
    let (width, height) = (field_width as f32, field_height as f32);

    check_field(width, height)?;

    if bins == 0 || bins > MAX_BINS {
        return Err(Error::InvalidBins);
    }

    if history.is_empty() {
        return Ok(None);
    }

    let mut counts = Array2::<u32>::zeros((bins, bins));

    for p in history {
        let (col, row) = cell_of(p, width, height, bins)?;
        counts[[row, col]] += 1;
    }

    Ok(Some(DensityGrid {
        counts,
        width,
        height,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn pts(raw: &[(f32, f32)]) -> Vec<na::Point2<f32>> {
        raw.iter().map(|&(x, y)| na::Point2::new(x, y)).collect()
    }

    #[test]
    fn corner_scenario() {
        let history = pts(&[(10.0, 10.0), (10.0, 10.0), (790.0, 590.0)]);
        let grid = aggregate(&history, 800, 600, 50).unwrap().unwrap();

        assert_eq!(grid.bins(), 50);
        assert_eq!(grid.get(0, 0), Some(2));
        assert_eq!(grid.get(49, 49), Some(1));
        assert_eq!(grid.total(), 3);
        assert_eq!(grid.counts().iter().filter(|&&c| c > 0).count(), 2);
    }

    #[test]
    fn empty_history_is_no_data() {
        assert_eq!(aggregate(&[], 800, 600, 50), Ok(None));
    }

    #[test]
    fn far_edge_goes_to_last_bin() {
        let history = pts(&[(800.0, 600.0), (0.0, 0.0), (800.0, 0.0)]);
        let grid = aggregate(&history, 800, 600, 50).unwrap().unwrap();

        assert_eq!(grid.get(49, 49), Some(1));
        assert_eq!(grid.get(0, 0), Some(1));
        assert_eq!(grid.get(49, 0), Some(1));
    }

    #[test]
    fn rows_are_y_bins() {
        // x = 100 -> column 6, y = 20 -> row 1 (16px by 12px cells)
        let grid = aggregate(&pts(&[(100.0, 20.0)]), 800, 600, 50)
            .unwrap()
            .unwrap();

        assert_eq!(grid.counts()[[1, 6]], 1);
        assert_eq!(grid.cell_of(&na::Point2::new(100.0, 20.0)), Ok((6, 1)));
    }

    #[test]
    fn out_of_field_is_rejected() {
        for p in [(-1.0, 10.0), (10.0, 600.5), (f32::NAN, 1.0)] {
            assert!(matches!(
                aggregate(&pts(&[(10.0, 10.0), p]), 800, 600, 50),
                Err(Error::PositionOutOfField { .. })
            ));
        }
    }

    #[test]
    fn bad_field_or_bins() {
        assert!(matches!(
            aggregate(&pts(&[(1.0, 1.0)]), 0, 600, 50),
            Err(Error::InvalidField { .. })
        ));
        assert_eq!(aggregate(&pts(&[(1.0, 1.0)]), 800, 600, 0), Err(Error::InvalidBins));
        // validated even without data
        assert_eq!(aggregate(&[], 800, 600, 0), Err(Error::InvalidBins));
        assert_eq!(
            aggregate(&pts(&[(1.0, 1.0)]), 800, 600, MAX_BINS + 1),
            Err(Error::InvalidBins)
        );
    }

    #[test]
    fn normalized_peaks_at_one() {
        let history = pts(&[(10.0, 10.0), (10.0, 10.0), (10.0, 10.0), (400.0, 300.0)]);
        let grid = aggregate(&history, 800, 600, 10).unwrap().unwrap();
        let norm = grid.normalized();

        assert_relative_eq!(norm[[0, 0]], 1.0);
        assert_relative_eq!(norm[[5, 5]], 1.0 / 3.0);
        assert_relative_eq!(norm.sum(), 4.0 / 3.0);
    }

    #[test]
    fn sum_matches_history_len() {
        let history: Vec<_> = (0..500)
            .map(|i| na::Point2::new((i * 37 % 801) as f32, (i * 53 % 601) as f32))
            .collect();
        let grid = aggregate(&history, 800, 600, 50).unwrap().unwrap();

        assert_eq!(grid.total(), 500);
    }
}
