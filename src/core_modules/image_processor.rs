// THEORY:
// The `ImageProcessor` is the unit of work handed to every worker. It takes one
// photograph from disk to a `BatchResult` and writes the two per-image
// artifacts (annotated copy and histogram chart) on the way.
//
// Key architectural principles:
// 1.  **Self-contained tasks**: A processor only reads batch-wide values that
//     were fixed before fan-out (radius, label, normalization target, canvas).
//     It shares no mutable state with other tasks, so any number of them can run
//     side by side.
// 2.  **Analysis before output**: The record is computed from the image alone.
//     Failing to write an artifact is logged but does not invalidate the
//     analysis that was already done.
// 3.  **Decode errors are task errors**: A photograph that cannot be decoded
//     makes this task fail; the orchestrator records it and keeps going.

use crate::config::BatchConfig;
use crate::core_modules::brightest_spot::{blur, brightest_location, classify_side, to_grayscale};
use crate::core_modules::eye_record::{BatchResult, EyeImageRecord};
use crate::core_modules::file_operations::{directory_label, file_name_of};
use crate::core_modules::histogram::{HistogramMode, render_histogram};
use crate::core_modules::resolution::Resolution;
use crate::error::{VisionError, VisionResult};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, GrayImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_circle_mut;
use std::path::{Path, PathBuf};

pub const HISTOGRAM_PREFIX: &str = "histogram_";
const MARKER_COLOR: Rgb<u8> = Rgb([0, 0, 255]);
const MARKER_THICKNESS: i32 = 2;

/// Per-image worker. Cheap to clone; every task gets its own copy.
#[derive(Debug, Clone)]
pub struct ImageProcessor {
    radius: u32,
    directory_label: String,
    output_dir: PathBuf,
    target: Resolution,
    histogram_width: u32,
    histogram_height: u32,
    histogram_mode: HistogramMode,
}

impl ImageProcessor {
    pub fn new(config: &BatchConfig, target: Resolution) -> Self {
        let folder = config.input_folder.to_string_lossy();
        Self {
            radius: config.radius,
            directory_label: directory_label(&folder, config.label_delimiter, config.label_depth),
            output_dir: config.output_folder(),
            target,
            histogram_width: config.histogram_width,
            histogram_height: config.histogram_height,
            histogram_mode: config.histogram_mode,
        }
    }

    pub fn directory_label(&self) -> &str {
        &self.directory_label
    }

    /// Runs the full per-image analysis for `path`.
    pub fn process(&self, path: &Path) -> VisionResult<BatchResult> {
        tracing::info!("Path: {}", path.display());
        let file_name = file_name_of(path);

        let source = image::open(path).map_err(|e| VisionError::image(path, e))?;
        let gray = to_grayscale(&source);
        let (width, height) = gray.dimensions();
        if width == 0 || height == 0 {
            return Err(VisionError::EmptyImage(path.to_path_buf()));
        }

        let blurred = blur(&gray, self.radius);
        let spot = brightest_location(&blurred).ok_or_else(|| VisionError::EmptyImage(path.to_path_buf()))?;
        tracing::info!(file = %file_name, x = spot.x, y = spot.y, "Brightest spot location");

        let side = classify_side(spot.x, width);

        let annotated = self.annotate(&source, spot.x, spot.y);
        self.write_artifact(&annotated, &file_name);

        let chart_source = self.chart_source(source, blurred);
        let histogram = render_histogram(
            &chart_source,
            self.histogram_width,
            self.histogram_height,
            self.histogram_mode,
        );
        self.write_artifact(&histogram, &format!("{HISTOGRAM_PREFIX}{file_name}"));

        let record = EyeImageRecord::new(self.directory_label.clone(), file_name, side, width, height);
        Ok(BatchResult { record, histogram })
    }

    /// Draws the marker circle on an RGB copy of the original photograph.
    fn annotate(&self, source: &DynamicImage, x: u32, y: u32) -> RgbImage {
        let mut canvas = source.to_rgb8();
        let center = (x as i32, y as i32);
        let radius = self.radius as i32;
        for offset in 0..MARKER_THICKNESS {
            draw_hollow_circle_mut(&mut canvas, center, radius + offset, MARKER_COLOR);
        }
        canvas
    }

    /// The image the chart is computed from, resized to the batch target.
    /// Grayscale charts use the blurred luma; color charts use the decoded photograph.
    fn chart_source(&self, source: DynamicImage, blurred: GrayImage) -> DynamicImage {
        let image = match self.histogram_mode {
            HistogramMode::Grayscale => DynamicImage::ImageLuma8(blurred),
            HistogramMode::Color => source,
        };
        if self.target.is_empty() || image.dimensions() == (self.target.width, self.target.height) {
            return image;
        }
        image.resize_exact(self.target.width, self.target.height, FilterType::Triangle)
    }

    fn write_artifact(&self, image: &RgbImage, file_name: &str) {
        let path = self.output_dir.join(file_name);
        if let Err(e) = image.save(&path) {
            tracing::warn!("Failed to write {}: {}", path.display(), e);
        }
    }
}
