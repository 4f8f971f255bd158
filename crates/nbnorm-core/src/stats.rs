//! Pooled image statistics
//!
//! Global min, median, mean, and mean absolute deviation over the whole
//! cube (all three planes together). These drive the blackpoint baseline
//! and noise-floor estimate of the normalization stage.

use crate::decoders::RasterCube;
use serde::{Deserialize, Serialize};

/// Pooled statistics of a raster cube
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CubeStatistics {
    /// Minimum sample value
    pub min: f32,

    /// Median sample value
    pub median: f32,

    /// Mean sample value
    pub mean: f32,

    /// Mean absolute deviation from the mean
    pub mean_abs_deviation: f32,
}

/// Compute pooled statistics over all three planes.
///
/// Degenerate inputs (constant cubes) are valid here and simply yield a
/// zero deviation; guarding the downstream divisions is the caller's job.
/// Reductions are sequential with f64 accumulators so the result does not
/// depend on any parallel reduction order.
pub fn compute_statistics(cube: &RasterCube) -> CubeStatistics {
    let total = cube.samples_per_plane() * 3;
    if total == 0 {
        return CubeStatistics {
            min: 0.0,
            median: 0.0,
            mean: 0.0,
            mean_abs_deviation: 0.0,
        };
    }

    let mut min = f32::MAX;
    let mut sum = 0.0f64;
    for plane in cube.planes.iter() {
        for &value in plane {
            min = min.min(value);
            sum += value as f64;
        }
    }
    let mean = (sum / total as f64) as f32;

    let mut abs_dev_sum = 0.0f64;
    for plane in cube.planes.iter() {
        for &value in plane {
            abs_dev_sum += (value - mean).abs() as f64;
        }
    }
    let mean_abs_deviation = (abs_dev_sum / total as f64) as f32;

    let mut pooled: Vec<f32> = Vec::with_capacity(total);
    for plane in cube.planes.iter() {
        pooled.extend_from_slice(plane);
    }

    CubeStatistics {
        min,
        median: compute_median(&mut pooled),
        mean,
        mean_abs_deviation,
    }
}

/// Compute the median of a slice using partial sorting.
fn compute_median(values: &mut [f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }

    let len = values.len();
    let mid = len / 2;

    if len % 2 == 0 {
        values.select_nth_unstable_by(mid - 1, |a, b| {
            a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
        });
        let lower = values[mid - 1];
        values.select_nth_unstable_by(mid, |a, b| {
            a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
        });
        let upper = values[mid];
        (lower + upper) / 2.0
    } else {
        values.select_nth_unstable_by(mid, |a, b| {
            a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal)
        });
        values[mid]
    }
}
