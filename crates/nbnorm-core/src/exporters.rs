//! FITS exporters for the composite output
//!
//! Either one combined (H, W, 3) container or three single-plane
//! containers with a channel suffix inserted before the extension.
//! Destinations are always overwritten; callers only reach this module
//! after the whole pipeline has succeeded.

use crate::error::ProcessError;
use crate::pipeline::CompositeImage;
use fitrs::{Fits, Hdu};
use std::path::{Path, PathBuf};

/// Suffixes for the split-channel output, in plane order.
const CHANNEL_SUFFIXES: [&str; 3] = ["_r", "_g", "_b"];

/// Write the composite as one combined multi-channel FITS file.
///
/// FITS axes are fastest-first, so the (H, W, 3) output is declared as
/// [3, W, H] with the channel index varying fastest.
pub fn export_combined<P: AsRef<Path>>(
    image: &CompositeImage,
    path: P,
) -> Result<(), ProcessError> {
    let path = path.as_ref();
    let samples = image.planes[0].len();

    let mut interleaved: Vec<f32> = Vec::with_capacity(samples * 3);
    for i in 0..samples {
        interleaved.push(image.planes[0][i]);
        interleaved.push(image.planes[1][i]);
        interleaved.push(image.planes[2][i]);
    }

    let shape = [3, image.width as usize, image.height as usize];
    write_fits(path, &shape, interleaved)
}

/// Write each post-processed plane as an independent single-plane file.
///
/// Returns the derived output paths in R, G, B order.
pub fn export_channels<P: AsRef<Path>>(
    image: &CompositeImage,
    path: P,
) -> Result<Vec<PathBuf>, ProcessError> {
    let path = path.as_ref();
    let shape = [image.width as usize, image.height as usize];

    let mut written = Vec::with_capacity(3);
    for (plane, suffix) in image.planes.iter().zip(CHANNEL_SUFFIXES) {
        let channel_path = channel_output_path(path, suffix);
        write_fits(&channel_path, &shape, plane.clone())?;
        written.push(channel_path);
    }

    Ok(written)
}

/// Derive a per-channel filename by inserting a suffix before the
/// extension: `out.fits` -> `out_r.fits`.
pub fn channel_output_path(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");

    let file_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext),
        None => format!("{}{}", stem, suffix),
    };

    path.with_file_name(file_name)
}

fn write_fits(path: &Path, shape: &[usize], data: Vec<f32>) -> Result<(), ProcessError> {
    // fitrs does not truncate an existing file on create.
    if path.exists() {
        std::fs::remove_file(path).map_err(|e| {
            ProcessError::Output(format!(
                "failed to overwrite {}: {}",
                path.display(),
                e
            ))
        })?;
    }

    let hdu = Hdu::new(shape, data);
    Fits::create(path, hdu)
        .map_err(|e| ProcessError::Output(format!("failed to write {}: {}", path.display(), e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fitrs::FitsData;
    use tempfile::tempdir;

    fn test_image() -> CompositeImage {
        let ramp = |offset: f32| -> Vec<f32> {
            (0..8).map(|i| offset + i as f32 / 16.0).collect()
        };
        CompositeImage {
            width: 4,
            height: 2,
            planes: [ramp(0.1), ramp(0.2), ramp(0.3)],
        }
    }

    fn read_f32_samples(path: &Path) -> (Vec<usize>, Vec<f32>) {
        let fits = Fits::open(path).unwrap();
        let hdu = fits.get(0).unwrap();
        let data = hdu.read_data();
        match &data {
            FitsData::FloatingPoint32(array) => (array.shape.clone(), array.data.clone()),
            other => panic!("unexpected sample type: {:?}", other),
        }
    }

    #[test]
    fn test_channel_output_path_suffixes() {
        let path = Path::new("/tmp/out/composite.fits");
        assert_eq!(
            channel_output_path(path, "_r"),
            PathBuf::from("/tmp/out/composite_r.fits")
        );

        let bare = Path::new("composite");
        assert_eq!(channel_output_path(bare, "_g"), PathBuf::from("composite_g"));
    }

    #[test]
    fn test_export_combined_layout() {
        let image = test_image();
        let dir = tempdir().unwrap();
        let path = dir.path().join("combined.fits");

        export_combined(&image, &path).unwrap();

        let (shape, samples) = read_f32_samples(&path);
        assert_eq!(shape, vec![3, 4, 2]);
        // Channel index varies fastest.
        assert!((samples[0] - image.planes[0][0]).abs() < 1e-6);
        assert!((samples[1] - image.planes[1][0]).abs() < 1e-6);
        assert!((samples[2] - image.planes[2][0]).abs() < 1e-6);
        assert!((samples[3] - image.planes[0][1]).abs() < 1e-6);
    }

    #[test]
    fn test_channel_outputs_reassemble_to_combined() {
        let image = test_image();
        let dir = tempdir().unwrap();

        let combined_path = dir.path().join("out.fits");
        export_combined(&image, &combined_path).unwrap();
        let (_, combined) = read_f32_samples(&combined_path);

        let written = export_channels(&image, dir.path().join("out.fits")).unwrap();
        assert_eq!(written.len(), 3);
        assert!(written[0].ends_with("out_r.fits"));

        let mut reassembled = vec![0.0f32; combined.len()];
        for (channel, path) in written.iter().enumerate() {
            let (shape, samples) = read_f32_samples(path);
            assert_eq!(shape, vec![4, 2]);
            for (i, &v) in samples.iter().enumerate() {
                reassembled[i * 3 + channel] = v;
            }
        }

        for (a, b) in combined.iter().zip(reassembled.iter()) {
            assert!((a - b).abs() < 1e-6, "reassembled output diverged");
        }
    }

    #[test]
    fn test_export_overwrites_existing_file() {
        let image = test_image();
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.fits");

        std::fs::write(&path, b"stale contents").unwrap();
        export_combined(&image, &path).unwrap();

        let (shape, _) = read_f32_samples(&path);
        assert_eq!(shape, vec![3, 4, 2]);
    }

    #[test]
    fn test_export_to_unwritable_destination() {
        let image = test_image();
        let result = export_combined(&image, "/nonexistent/dir/out.fits");
        assert!(matches!(result, Err(ProcessError::Output(_))));
    }
}
