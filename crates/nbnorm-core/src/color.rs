//! Color transformations
//!
//! The sRGB gamma pair, the fixed D50 RGB <-> XYZ matrices, and the LAB
//! helper pair used by the perceptual round trip. The matrices are part of
//! the pipeline definition and are not configurable.

use rayon::prelude::*;

/// RGB to XYZ matrix (D50)
const RGB_TO_XYZ: [[f32; 3]; 3] = [
    [0.4360747, 0.3850649, 0.1430804],
    [0.2225045, 0.7168786, 0.0606169],
    [0.0139322, 0.0971045, 0.7141733],
];

/// XYZ to RGB matrix (D50)
const XYZ_TO_RGB: [[f32; 3]; 3] = [
    [3.1338561, -1.6168667, -0.4906146],
    [-0.9787684, 1.9161415, 0.0334540],
    [0.0719453, -0.2289914, 1.4052427],
];

/// LAB domain threshold (~(6/29)^3)
const LAB_EPSILON: f32 = 0.008856;
const LAB_KAPPA: f32 = 7.787;
const LAB_OFFSET: f32 = 16.0 / 116.0;

/// Remove display gamma, taking a channel to its perceptual-linear form.
#[inline]
pub fn srgb_decode(c: f32) -> f32 {
    if c > 0.04045 {
        ((c + 0.055) / 1.055).powf(2.4)
    } else {
        c / 12.92
    }
}

/// Reapply display gamma after reconstruction.
#[inline]
pub fn srgb_encode(c: f32) -> f32 {
    if c > 0.0031308 {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    } else {
        12.92 * c
    }
}

/// LAB f(t) function
#[inline]
pub fn lab_f(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t.cbrt()
    } else {
        LAB_KAPPA * t + LAB_OFFSET
    }
}

/// LAB f^-1(t) inverse function
#[inline]
pub fn lab_f_inv(t: f32) -> f32 {
    if t > LAB_EPSILON {
        t * t * t
    } else {
        (t - LAB_OFFSET) / LAB_KAPPA
    }
}

/// Convert gamma-decoded RGB to XYZ (D50)
#[inline]
pub fn rgb_to_xyz(r: f32, g: f32, b: f32) -> (f32, f32, f32) {
    let x = RGB_TO_XYZ[0][0] * r + RGB_TO_XYZ[0][1] * g + RGB_TO_XYZ[0][2] * b;
    let y = RGB_TO_XYZ[1][0] * r + RGB_TO_XYZ[1][1] * g + RGB_TO_XYZ[1][2] * b;
    let z = RGB_TO_XYZ[2][0] * r + RGB_TO_XYZ[2][1] * g + RGB_TO_XYZ[2][2] * b;
    (x, y, z)
}

/// Convert XYZ back to gamma-decoded RGB (D50)
#[inline]
pub fn xyz_to_rgb(x: f32, y: f32, z: f32) -> (f32, f32, f32) {
    let r = XYZ_TO_RGB[0][0] * x + XYZ_TO_RGB[0][1] * y + XYZ_TO_RGB[0][2] * z;
    let g = XYZ_TO_RGB[1][0] * x + XYZ_TO_RGB[1][1] * y + XYZ_TO_RGB[1][2] * z;
    let b = XYZ_TO_RGB[2][0] * x + XYZ_TO_RGB[2][1] * y + XYZ_TO_RGB[2][2] * z;
    (r, g, b)
}

/// Luminance of a raw pixel, the Y row of the forward matrix.
#[inline]
pub fn luminance(r: f32, g: f32, b: f32) -> f32 {
    RGB_TO_XYZ[1][0] * r + RGB_TO_XYZ[1][1] * g + RGB_TO_XYZ[1][2] * b
}

/// LAB planes derived from a forward transform
#[derive(Debug, Clone)]
pub struct LabPlanes {
    /// Lightness plane (L)
    pub l: Vec<f32>,

    /// Green-red chroma plane (a)
    pub a: Vec<f32>,

    /// Blue-yellow chroma plane (b)
    pub b: Vec<f32>,
}

/// Forward transform: linear triplet planes -> gamma -> XYZ -> LAB.
///
/// All three planes must be the same length.
pub fn forward_transform(r: &[f32], g: &[f32], b: &[f32]) -> LabPlanes {
    let lab: Vec<(f32, f32, f32)> = r
        .par_iter()
        .zip(g.par_iter())
        .zip(b.par_iter())
        .map(|((&r, &g), &b)| {
            let (x, y, z) = rgb_to_xyz(srgb_decode(r), srgb_decode(g), srgb_decode(b));
            let (fx, fy, fz) = (lab_f(x), lab_f(y), lab_f(z));
            (
                116.0 * fy - 16.0,
                500.0 * (fx - fy),
                200.0 * (fy - fz),
            )
        })
        .collect();

    let mut planes = LabPlanes {
        l: Vec::with_capacity(lab.len()),
        a: Vec::with_capacity(lab.len()),
        b: Vec::with_capacity(lab.len()),
    };
    for (l, a, b) in lab {
        planes.l.push(l);
        planes.a.push(a);
        planes.b.push(b);
    }
    planes
}

/// Inverse transform: substituted lightness plus original chroma -> XYZ ->
/// gamma-compressed RGB planes.
///
/// `y2` is the (possibly substituted) normalized lightness, `(L+16)/116`
/// when no substitution took place.
pub fn inverse_transform(y2: &[f32], a: &[f32], b: &[f32]) -> (Vec<f32>, Vec<f32>, Vec<f32>) {
    let rgb: Vec<(f32, f32, f32)> = y2
        .par_iter()
        .zip(a.par_iter())
        .zip(b.par_iter())
        .map(|((&y2, &a), &b)| {
            let x2 = a / 500.0 + y2;
            let z2 = y2 - b / 200.0;
            let (r, g, b) = xyz_to_rgb(lab_f_inv(x2), lab_f_inv(y2), lab_f_inv(z2));
            (srgb_encode(r), srgb_encode(g), srgb_encode(b))
        })
        .collect();

    let mut r_plane = Vec::with_capacity(rgb.len());
    let mut g_plane = Vec::with_capacity(rgb.len());
    let mut b_plane = Vec::with_capacity(rgb.len());
    for (r, g, b) in rgb {
        r_plane.push(r);
        g_plane.push(g);
        b_plane.push(b);
    }
    (r_plane, g_plane, b_plane)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_srgb_gamma_roundtrip() {
        for i in 1..100 {
            let x = i as f32 / 100.0;
            let roundtrip = srgb_encode(srgb_decode(x));
            assert!(
                (x - roundtrip).abs() < 1e-5,
                "gamma roundtrip mismatch for {}: {}",
                x,
                roundtrip
            );
        }
    }

    #[test]
    fn test_lab_f_roundtrip() {
        for i in 1..100 {
            let t = i as f32 / 100.0;
            let roundtrip = lab_f_inv(lab_f(t));
            assert!(
                (t - roundtrip).abs() < 1e-4,
                "lab f roundtrip mismatch for {}: {}",
                t,
                roundtrip
            );
        }
        // Below the threshold the linear branch must also invert.
        let t = 0.004;
        assert!((t - lab_f_inv(lab_f(t))).abs() < 1e-5);
    }

    #[test]
    fn test_matrices_are_mutual_inverses() {
        let cases = [
            (0.8, 0.4, 0.2),
            (0.1, 0.9, 0.3),
            (0.5, 0.5, 0.5),
            (1.0, 0.0, 0.0),
        ];

        for (r, g, b) in cases {
            let (x, y, z) = rgb_to_xyz(r, g, b);
            let (r2, g2, b2) = xyz_to_rgb(x, y, z);
            assert!((r - r2).abs() < 1e-4, "R mismatch: {} vs {}", r, r2);
            assert!((g - g2).abs() < 1e-4, "G mismatch: {} vs {}", g, g2);
            assert!((b - b2).abs() < 1e-4, "B mismatch: {} vs {}", b, b2);
        }
    }

    #[test]
    fn test_forward_transform_lightness_tracks_input() {
        // The Y row of the matrix sums to 1.0, so mid-gray input must land
        // near the CIE mid-gray lightness, and L must grow with the input.
        let lab = forward_transform(&[0.2, 0.5, 0.8], &[0.2, 0.5, 0.8], &[0.2, 0.5, 0.8]);

        assert!(lab.l[1] > 50.0 && lab.l[1] < 57.0, "mid-gray L: {}", lab.l[1]);
        assert!(lab.l[0] < lab.l[1] && lab.l[1] < lab.l[2]);
    }

    #[test]
    fn test_forward_inverse_roundtrip_planes() {
        let r = vec![0.8f32, 0.2, 0.5, 0.9];
        let g = vec![0.3f32, 0.6, 0.5, 0.1];
        let b = vec![0.1f32, 0.4, 0.5, 0.7];

        let lab = forward_transform(&r, &g, &b);
        let y2: Vec<f32> = lab.l.iter().map(|&l| (l + 16.0) / 116.0).collect();
        let (r2, g2, b2) = inverse_transform(&y2, &lab.a, &lab.b);

        for i in 0..4 {
            assert!((r[i] - r2[i]).abs() < 1e-3, "R mismatch at {}", i);
            assert!((g[i] - g2[i]).abs() < 1e-3, "G mismatch at {}", i);
            assert!((b[i] - b2[i]).abs() < 1e-3, "B mismatch at {}", i);
        }
    }
}
