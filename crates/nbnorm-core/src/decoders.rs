//! FITS decoding into a three-plane raster cube
//!
//! The input container holds one primary data array of shape (3, H, W);
//! no header fields are interpreted beyond the raw array. Integer samples
//! are promoted to f32 on load.

use crate::error::ProcessError;
use crate::models::ChannelRole;
use fitrs::{Fits, FitsData};
use std::path::Path;

/// Three-plane floating point cube, the immutable source of a run.
///
/// Planes are stored row-major, `height * width` samples each, in the
/// fixed role order reference / OIII / SII. Stages derive new buffers and
/// never mutate the source in place.
#[derive(Debug, Clone)]
pub struct RasterCube {
    /// Plane width in pixels
    pub width: u32,

    /// Plane height in pixels
    pub height: u32,

    /// The three planes, indexed by [`ChannelRole`]
    pub planes: [Vec<f32>; 3],
}

impl RasterCube {
    /// Number of samples in one plane.
    pub fn samples_per_plane(&self) -> usize {
        (self.width as usize) * (self.height as usize)
    }

    /// Borrow the plane for a given role.
    pub fn plane(&self, role: ChannelRole) -> &[f32] {
        &self.planes[role.index()]
    }
}

/// Decode an input image from a file path
pub fn decode_image<P: AsRef<Path>>(path: P) -> Result<RasterCube, ProcessError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ProcessError::Input(format!(
            "input file does not exist: {}",
            path.display()
        )));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .ok_or_else(|| ProcessError::Input("no file extension found".to_string()))?;

    match extension.as_str() {
        "fit" | "fits" | "fts" => decode_fits(path),
        _ => Err(ProcessError::Input(format!(
            "unsupported file format: {}",
            extension
        ))),
    }
}

/// Decode the primary HDU of a FITS file into a cube.
fn decode_fits(path: &Path) -> Result<RasterCube, ProcessError> {
    let fits = Fits::open(path)
        .map_err(|e| ProcessError::Input(format!("failed to open FITS file: {}", e)))?;

    let hdu = fits
        .get(0)
        .ok_or_else(|| ProcessError::Input("FITS file has no primary HDU".to_string()))?;

    let data = hdu.read_data();
    let (shape, samples): (Vec<usize>, Vec<f32>) = match &data {
        FitsData::FloatingPoint32(array) => (array.shape.clone(), array.data.clone()),
        FitsData::FloatingPoint64(array) => (
            array.shape.clone(),
            array.data.iter().map(|&v| v as f32).collect(),
        ),
        // BLANK sentinels decode as None; map them to 0.0 rather than NaN
        // so the statistics stage stays finite.
        FitsData::IntegersI32(array) => (
            array.shape.clone(),
            array
                .data
                .iter()
                .map(|v| v.map(|x| x as f32).unwrap_or(0.0))
                .collect(),
        ),
        FitsData::IntegersU32(array) => (
            array.shape.clone(),
            array
                .data
                .iter()
                .map(|v| v.map(|x| x as f32).unwrap_or(0.0))
                .collect(),
        ),
        FitsData::Characters(_) => {
            return Err(ProcessError::Input(
                "primary HDU holds character data, not an image array".to_string(),
            ));
        }
    };

    cube_from_samples(&shape, samples)
}

/// Assemble a cube from a primary array in FITS axis order.
///
/// FITS stores the fastest-varying axis first, so a (3, H, W) cube arrives
/// with shape [W, H, 3] and one full plane after another in the buffer.
fn cube_from_samples(shape: &[usize], samples: Vec<f32>) -> Result<RasterCube, ProcessError> {
    if shape.len() != 3 {
        return Err(ProcessError::Shape(format!(
            "{}-dimensional array",
            shape.len()
        )));
    }

    let (width, height, planes) = (shape[0], shape[1], shape[2]);
    if planes != 3 {
        return Err(ProcessError::Shape(format!("{} planes", planes)));
    }

    let plane_len = width * height;
    if samples.len() != plane_len * 3 {
        return Err(ProcessError::Input(format!(
            "primary array holds {} samples, expected {}",
            samples.len(),
            plane_len * 3
        )));
    }

    let mut iter = samples.into_iter();
    let mut take_plane = || -> Vec<f32> { iter.by_ref().take(plane_len).collect() };
    let reference = take_plane();
    let oiii = take_plane();
    let sii = take_plane();

    Ok(RasterCube {
        width: width as u32,
        height: height as u32,
        planes: [reference, oiii, sii],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_missing_file() {
        let result = decode_image("/nonexistent/path/image.fits");
        assert!(matches!(result, Err(ProcessError::Input(_))));
    }

    #[test]
    fn test_decode_unsupported_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.tiff");
        std::fs::write(&path, b"not an image").unwrap();

        let result = decode_image(&path);
        assert!(matches!(result, Err(ProcessError::Input(_))));
    }

    #[test]
    fn test_cube_from_samples_valid_shape() {
        let samples: Vec<f32> = (0..24).map(|i| i as f32).collect();
        let cube = cube_from_samples(&[4, 2, 3], samples).unwrap();

        assert_eq!(cube.width, 4);
        assert_eq!(cube.height, 2);
        assert_eq!(cube.samples_per_plane(), 8);
        // First plane is the first 8 samples, in order.
        assert_eq!(cube.plane(ChannelRole::Reference)[0], 0.0);
        assert_eq!(cube.plane(ChannelRole::Oiii)[0], 8.0);
        assert_eq!(cube.plane(ChannelRole::Sii)[7], 23.0);
    }

    #[test]
    fn test_cube_from_samples_wrong_plane_count() {
        let samples = vec![0.0; 32];
        let result = cube_from_samples(&[4, 2, 4], samples);
        assert!(matches!(result, Err(ProcessError::Shape(_))));
    }

    #[test]
    fn test_cube_from_samples_wrong_rank() {
        let samples = vec![0.0; 8];
        let result = cube_from_samples(&[4, 2], samples);
        assert!(matches!(result, Err(ProcessError::Shape(_))));
    }

    #[test]
    fn test_decode_fits_roundtrip() {
        use fitrs::Hdu;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cube.fits");

        let data: Vec<f32> = (0..24).map(|i| i as f32 / 24.0).collect();
        let hdu = Hdu::new(&[4, 2, 3], data);
        Fits::create(&path, hdu).unwrap();

        let cube = decode_image(&path).unwrap();
        assert_eq!(cube.width, 4);
        assert_eq!(cube.height, 2);
        assert!((cube.plane(ChannelRole::Reference)[0] - 0.0).abs() < 1e-6);
        assert!((cube.plane(ChannelRole::Sii)[7] - 23.0 / 24.0).abs() < 1e-6);
    }
}
