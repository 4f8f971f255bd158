//! Statistics-driven channel normalization
//!
//! Derives a blackpoint baseline and noise-floor estimate from the pooled
//! cube statistics, then rebalances the OIII and SII planes against the
//! reference plane. The green color-cast suppressor (SCNR) lives here too.

use crate::error::ProcessError;
use crate::stats::CubeStatistics;
use rayon::prelude::*;

/// Converts mean absolute deviation to a standard-deviation estimate for a
/// normal distribution.
const ADEV_TO_SIGMA: f32 = 1.2533;

/// Denominators below this magnitude are treated as degenerate.
const DEGENERACY_EPSILON: f32 = 1e-6;

/// Scalar terms shared by the per-channel normalization
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct NormalizationTerms {
    /// Black-level reference: `min + blackpoint * (median - min)`
    pub baseline: f32,

    /// Noise-floor estimate: `adev / 1.2533 + mean - baseline`
    pub noise_floor: f32,

    /// Per-channel ratio `noise_floor / baseline`, broadcast uniformly
    /// because statistics are pooled across planes
    pub ratio: f32,
}

/// Derive the baseline, noise floor, and ratio from pooled statistics.
///
/// Near-constant images collapse the denominators the stretch and rescale
/// formulas divide by; those cases surface as [`ProcessError::Degenerate`]
/// instead of propagating NaN/Inf into the output.
pub fn derive_terms(
    stats: &CubeStatistics,
    blackpoint: f32,
) -> Result<NormalizationTerms, ProcessError> {
    let baseline = stats.min + blackpoint * (stats.median - stats.min);

    if !baseline.is_finite() || baseline.abs() < DEGENERACY_EPSILON {
        return Err(ProcessError::Degenerate {
            stage: "channel normalization",
            detail: format!("baseline m = {} is unusable as a divisor", baseline),
        });
    }

    if (1.0 - baseline).abs() < DEGENERACY_EPSILON {
        return Err(ProcessError::Degenerate {
            stage: "channel normalization",
            detail: format!("baseline m = {} collapses the (1 - m) rescale", baseline),
        });
    }

    let noise_floor = stats.mean_abs_deviation / ADEV_TO_SIGMA + stats.mean - baseline;
    if !noise_floor.is_finite() {
        return Err(ProcessError::Degenerate {
            stage: "channel normalization",
            detail: format!("noise floor e0 = {} is not finite", noise_floor),
        });
    }

    let ratio = noise_floor / baseline;
    if !ratio.is_finite() {
        return Err(ProcessError::Degenerate {
            stage: "channel normalization",
            detail: format!("ratio a0 = {} is not finite", ratio),
        });
    }

    Ok(NormalizationTerms {
        baseline,
        noise_floor,
        ratio,
    })
}

/// Stretch value for one channel against the reference channel's ratio,
/// divided by the channel's boost factor.
///
/// Statistics are pooled, so callers pass the same ratio for both
/// arguments today; the formula keeps them distinct as specified.
pub fn stretch_factor(
    ratio: f32,
    reference_ratio: f32,
    boost: f32,
) -> Result<f32, ProcessError> {
    let denominator = ratio - 2.0 * ratio * reference_ratio + reference_ratio;
    if denominator.abs() < DEGENERACY_EPSILON {
        return Err(ProcessError::Degenerate {
            stage: "channel normalization",
            detail: format!(
                "stretch denominator {} for ratio {} vanished",
                denominator, ratio
            ),
        });
    }

    let stretch = ratio * (1.0 - reference_ratio) / denominator / boost;
    if !stretch.is_finite() {
        return Err(ProcessError::Degenerate {
            stage: "channel normalization",
            detail: format!("stretch {} is not finite", stretch),
        });
    }

    Ok(stretch)
}

/// Normalize one plane against the baseline with a precomputed stretch.
///
/// `local` rescales the plane above the baseline; the combination keeps
/// values below the baseline compressed toward the stretch level.
pub fn normalize_plane(plane: &[f32], baseline: f32, stretch: f32) -> Vec<f32> {
    let m = baseline;
    plane
        .par_iter()
        .map(|&v| {
            let local = ((v - m) / (1.0 - m)).clamp(0.0, 1.0);
            1.0 - (1.0 - stretch) * (1.0 - local) * (1.0 - v.min(m))
        })
        .collect()
}

/// Selective color noise reduction for the green plane.
///
/// The green channel is pulled down to the lesser of the normalized OIII
/// value and the average of the reference and normalized SII planes.
pub fn scnr_green(reference: &[f32], oiii_norm: &[f32], sii_norm: &[f32]) -> Vec<f32> {
    reference
        .par_iter()
        .zip(sii_norm.par_iter())
        .zip(oiii_norm.par_iter())
        .map(|((&r, &s), &g)| ((r + s) / 2.0).min(g))
        .collect()
}
