//! Resampling of scattered `(x, y, z)` points onto a regular grid.

use crate::core::Interpolation;
use crate::error::{PlotError, PlotResult};

/// A regular grid: `z[row][col]` is the height at `(x[col], y[row])`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub z: Vec<Vec<f64>>,
}

/// Resample scattered points onto an `n x n` grid spanning their bounding box.
///
/// `Nearest` copies the closest sample; `Linear` and `Cubic` use inverse
/// distance weighting with power 2 and 3 respectively, which keeps every
/// grid height within the sampled range.
pub fn resample(
    x: &[f64],
    y: &[f64],
    z: &[f64],
    n: usize,
    method: Interpolation,
) -> PlotResult<Grid> {
    if n < 2 {
        return Err(PlotError::configuration(format!(
            "interpolation_range must be at least 2, got {n}"
        )));
    }
    if x.len() != y.len() || x.len() != z.len() {
        return Err(PlotError::shape(format!(
            "scattered surface needs equal lengths, got x={}, y={}, z={}",
            x.len(),
            y.len(),
            z.len()
        )));
    }
    let points: Vec<[f64; 3]> = x
        .iter()
        .zip(y)
        .zip(z)
        .map(|((&x, &y), &z)| [x, y, z])
        .filter(|p| p.iter().all(|v| v.is_finite()))
        .collect();
    if points.is_empty() {
        return Err(PlotError::shape("scattered surface has no finite points"));
    }

    let axis = |pick: usize| {
        let (lo, hi) = points
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[pick]), hi.max(p[pick]))
            });
        linspace(lo, hi, n)
    };
    let gx = axis(0);
    let gy = axis(1);

    let z = gy
        .iter()
        .map(|&py| {
            gx.iter()
                .map(|&px| estimate(&points, px, py, method))
                .collect()
        })
        .collect();

    Ok(Grid { x: gx, y: gy, z })
}

fn linspace(lo: f64, hi: f64, n: usize) -> Vec<f64> {
    let step = (hi - lo) / (n - 1) as f64;
    (0..n).map(|i| lo + step * i as f64).collect()
}

fn estimate(points: &[[f64; 3]], px: f64, py: f64, method: Interpolation) -> f64 {
    let dist2 = |p: &[f64; 3]| (p[0] - px).powi(2) + (p[1] - py).powi(2);

    if method == Interpolation::Nearest {
        return points
            .iter()
            .min_by(|a, b| dist2(a).total_cmp(&dist2(b)))
            .map_or(f64::NAN, |p| p[2]);
    }

    let power = if method == Interpolation::Linear { 2.0 } else { 3.0 };
    let mut num = 0.0;
    let mut den = 0.0;
    for p in points {
        let d2 = dist2(p);
        if d2 < 1e-24 {
            return p[2];
        }
        let w = d2.powf(-power / 2.0);
        num += w * p[2];
        den += w;
    }
    num / den
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_spans_bounding_box() {
        let g = resample(&[0.0, 2.0, 0.0, 2.0], &[1.0, 1.0, 3.0, 3.0], &[0.0; 4], 5, Interpolation::Cubic)
            .unwrap();
        assert_eq!(g.x, vec![0.0, 0.5, 1.0, 1.5, 2.0]);
        assert_eq!(g.y, vec![1.0, 1.5, 2.0, 2.5, 3.0]);
        assert_eq!(g.z.len(), 5);
        assert!(g.z.iter().all(|row| row.len() == 5));
    }

    #[test]
    fn reproduces_samples_and_stays_in_range() {
        let (x, y, z) = ([0.0, 1.0, 0.0, 1.0], [0.0, 0.0, 1.0, 1.0], [1.0, 2.0, 3.0, 4.0]);
        for method in [Interpolation::Nearest, Interpolation::Linear, Interpolation::Cubic] {
            let g = resample(&x, &y, &z, 3, method).unwrap();
            assert_eq!(g.z[0][0], 1.0);
            assert_eq!(g.z[2][2], 4.0);
            let mid = g.z[1][1];
            assert!((1.0..=4.0).contains(&mid), "{method:?}: {mid}");
        }
    }

    #[test]
    fn rejects_bad_input() {
        let err = resample(&[0.0], &[0.0], &[0.0], 1, Interpolation::Linear).unwrap_err();
        assert!(matches!(err.current_context(), PlotError::Configuration(_)));
        let err = resample(&[0.0, 1.0], &[0.0], &[0.0], 10, Interpolation::Linear).unwrap_err();
        assert!(matches!(err.current_context(), PlotError::Shape(_)));
    }
}
