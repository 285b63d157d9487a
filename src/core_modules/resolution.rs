// THEORY:
// The `resolution` module is the serial pre-pass of the batch. Histogram charts
// are only comparable when they are computed from images of the same size, so
// before any worker starts the whole batch is scanned once and a single target
// resolution is chosen. The value is computed exactly once and then shared
// read-only with every task.
//
// The running minimum is replaced only when an image is smaller-or-equal in
// BOTH dimensions at once. This is not a per-axis minimum: an image that is
// narrower but taller leaves the target untouched.

use crate::error::{VisionError, VisionResult};
use std::path::PathBuf;

/// A width/height pair in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Folds one more observed size into the running target.
    pub fn fold(self, observed: Resolution) -> Resolution {
        if self.width == 0 && self.height == 0 {
            return observed;
        }
        if self.width >= observed.width && self.height >= observed.height {
            observed
        } else {
            self
        }
    }
}

/// Computes the normalization target from already known sizes.
pub fn lowest_resolution<I>(sizes: I) -> Resolution
where
    I: IntoIterator<Item = Resolution>,
{
    sizes.into_iter().fold(Resolution::default(), Resolution::fold)
}

/// Opens every image once and computes the normalization target.
/// Any image whose header cannot be read aborts the batch.
pub fn normalize_batch(paths: &[PathBuf]) -> VisionResult<Resolution> {
    let mut target = Resolution::default();
    for path in paths {
        let (width, height) =
            image::image_dimensions(path).map_err(|e| VisionError::image(path, e))?;
        target = target.fold(Resolution::new(width, height));
    }
    tracing::debug!(width = target.width, height = target.height, "Normalization target");
    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};
    use tempfile::tempdir;

    #[test]
    fn both_dimensions_must_shrink_together() {
        let sizes = [
            Resolution::new(100, 80),
            Resolution::new(50, 200),
            Resolution::new(100, 50),
        ];
        assert_eq!(lowest_resolution(sizes), Resolution::new(100, 50));
    }

    #[test]
    fn smaller_in_both_replaces() {
        let sizes = [Resolution::new(100, 80), Resolution::new(40, 30)];
        assert_eq!(lowest_resolution(sizes), Resolution::new(40, 30));
    }

    #[test]
    fn first_image_sets_the_baseline() {
        let sizes = [Resolution::new(50, 200), Resolution::new(100, 80)];
        assert_eq!(lowest_resolution(sizes), Resolution::new(50, 200));
    }

    #[test]
    fn empty_batch_is_zero() {
        assert_eq!(lowest_resolution(Vec::new()), Resolution::default());
        assert!(Resolution::default().is_empty());
    }

    #[test]
    fn normalize_reads_files() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.png");
        let b = dir.path().join("b.png");
        GrayImage::from_pixel(30, 20, Luma([10])).save(&a).unwrap();
        GrayImage::from_pixel(12, 8, Luma([10])).save(&b).unwrap();

        let target = normalize_batch(&[a, b]).unwrap();
        assert_eq!(target, Resolution::new(12, 8));
    }

    #[test]
    fn unreadable_image_is_fatal() {
        let dir = tempdir().unwrap();
        let bad = dir.path().join("broken.png");
        std::fs::write(&bad, b"not an image").unwrap();
        assert!(matches!(
            normalize_batch(&[bad]),
            Err(VisionError::Image { .. })
        ));
    }
}
