//! Composite processing pipeline
//!
//! One linear sequence of pure plane-to-plane transforms: statistics,
//! channel normalization, optional SCNR, the LAB round trip with lightness
//! substitution, mode compositing, and highlight/brightness post-processing.
//! Every stage is deterministic given its inputs and options.

use crate::color;
use crate::decoders::RasterCube;
use crate::error::ProcessError;
use crate::models::{ChannelRole, LightnessSource, OutputMode, ProcessOptions};
use crate::normalize;
use crate::stats;
use rayon::prelude::*;

/// Result of the processing pipeline
pub struct CompositeImage {
    /// Plane width in pixels
    pub width: u32,

    /// Plane height in pixels
    pub height: u32,

    /// Post-processed output planes in R, G, B order
    pub planes: [Vec<f32>; 3],
}

/// Execute the full composite pipeline on a decoded cube.
pub fn process_cube(
    cube: &RasterCube,
    options: &ProcessOptions,
) -> Result<CompositeImage, ProcessError> {
    // Stage 1: pooled statistics
    let statistics = stats::compute_statistics(cube);
    if options.debug {
        eprintln!(
            "[DEBUG] Statistics - min: {:.6}, median: {:.6}, mean: {:.6}, adev: {:.6}",
            statistics.min, statistics.median, statistics.mean, statistics.mean_abs_deviation
        );
    }

    // Stage 2: normalization of the OIII and SII planes
    let terms = normalize::derive_terms(&statistics, options.blackpoint)?;
    if options.debug {
        eprintln!(
            "[DEBUG] Baseline m: {:.6}, noise floor e0: {:.6}, ratio a0: {:.6}",
            terms.baseline, terms.noise_floor, terms.ratio
        );
    }

    // Each plane combines its own stretch value; the boosts are the only
    // difference while statistics stay pooled.
    let oiii_stretch = normalize::stretch_factor(terms.ratio, terms.ratio, options.oiii_boost)?;
    let sii_stretch = normalize::stretch_factor(terms.ratio, terms.ratio, options.sii_boost)?;

    let reference = cube.plane(ChannelRole::Reference);
    let oiii_norm =
        normalize::normalize_plane(cube.plane(ChannelRole::Oiii), terms.baseline, oiii_stretch);
    let sii_norm =
        normalize::normalize_plane(cube.plane(ChannelRole::Sii), terms.baseline, sii_stretch);

    if options.debug {
        let (min, max, mean) = plane_stats(&oiii_norm);
        eprintln!(
            "[DEBUG] OIII normalized (stretch {:.4}) - min: {:.6}, max: {:.6}, mean: {:.6}",
            oiii_stretch, min, max, mean
        );
        let (min, max, mean) = plane_stats(&sii_norm);
        eprintln!(
            "[DEBUG] SII normalized (stretch {:.4}) - min: {:.6}, max: {:.6}, mean: {:.6}",
            sii_stretch, min, max, mean
        );
    }

    // Stage 3: optional green color-cast suppression
    let green = if options.scnr {
        normalize::scnr_green(reference, &oiii_norm, &sii_norm)
    } else {
        oiii_norm
    };

    // Stages 4-7: the LAB round trip feeds the non-linear output; the
    // linear output is the pre-gamma triplet as-is. Planes are selected
    // directly by mode, never by comparing pixel values.
    let mut planes = match options.mode {
        OutputMode::Linear => [reference.to_vec(), green, sii_norm],
        OutputMode::NonLinear => {
            let lab = color::forward_transform(reference, &green, &sii_norm);
            let y2 = select_lightness(&lab.l, cube, options.lightness);
            let (r, g, b) = color::inverse_transform(&y2, &lab.a, &lab.b);

            if options.debug {
                let (min, max, mean) = plane_stats(&g);
                eprintln!(
                    "[DEBUG] After LAB round trip (G) - min: {:.6}, max: {:.6}, mean: {:.6}",
                    min, max, mean
                );
            }

            [r, g, b]
        }
    };

    // Stage 8: highlight reduction, brightness, recovery clip
    for plane in planes.iter_mut() {
        post_process(plane, options);
    }

    if options.debug {
        for (plane, name) in planes.iter().zip(["R", "G", "B"]) {
            let (min, max, mean) = plane_stats(plane);
            eprintln!(
                "[DEBUG] Output {} - min: {:.6}, max: {:.6}, mean: {:.6}",
                name, min, max, mean
            );
        }
    }

    Ok(CompositeImage {
        width: cube.width,
        height: cube.height,
        planes,
    })
}

/// Substitute the normalized lightness plane.
///
/// `derived_l` is the L plane from the forward transform; the selected
/// source replaces `(L+16)/116` wholesale, chroma is untouched.
fn select_lightness(derived_l: &[f32], cube: &RasterCube, source: LightnessSource) -> Vec<f32> {
    match source {
        LightnessSource::Derived => derived_l.par_iter().map(|&l| (l + 16.0) / 116.0).collect(),
        LightnessSource::CieFromSource => {
            let r = cube.plane(ChannelRole::Reference);
            let g = cube.plane(ChannelRole::Oiii);
            let b = cube.plane(ChannelRole::Sii);
            r.par_iter()
                .zip(g.par_iter())
                .zip(b.par_iter())
                .map(|((&r, &g), &b)| color::lab_f(color::luminance(r, g, b)))
                .collect()
        }
        LightnessSource::Reference => rescale_lightness(cube.plane(ChannelRole::Reference)),
        LightnessSource::Sii => rescale_lightness(cube.plane(ChannelRole::Sii)),
        LightnessSource::Oiii => rescale_lightness(cube.plane(ChannelRole::Oiii)),
    }
}

/// Map a raw plane onto the normalized lightness scale.
fn rescale_lightness(plane: &[f32]) -> Vec<f32> {
    plane.par_iter().map(|&c| (c + 0.16) / 1.16).collect()
}

/// Highlight reduction, brightness scaling, and the recovery ceiling clip.
fn post_process(plane: &mut [f32], options: &ProcessOptions) {
    let reduction = 1.0 - 0.5 / options.hl_reduction;
    let scale = 0.5 / options.brightness;
    let ceiling = options.hl_recover;

    plane.par_iter_mut().for_each(|e| {
        let reduced = reduction * *e * *e + *e * (1.0 - *e);
        *e = (scale * reduced).clamp(0.0, ceiling);
    });
}

/// Compute min, max, and mean statistics for debug output
fn plane_stats(plane: &[f32]) -> (f32, f32, f32) {
    if plane.is_empty() {
        return (0.0, 0.0, 0.0);
    }

    let mut min = f32::MAX;
    let mut max = f32::MIN;
    let mut sum = 0.0f64;

    for &value in plane {
        min = min.min(value);
        max = max.max(value);
        sum += value as f64;
    }

    (min, max, (sum / plane.len() as f64) as f32)
}
