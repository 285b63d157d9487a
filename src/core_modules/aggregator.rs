// THEORY:
// The `aggregator` is the only place where results from different tasks meet.
// Tasks finish in whatever order the scheduler picks; the aggregator erases that
// order by sorting on file name, which becomes the canonical order of both the
// stacked histogram chart and the JSON summary.
//
// It takes ownership of every `BatchResult`. The histogram buffers are moved
// into the combined chart and dropped with it.

use crate::core_modules::eye_record::{BatchResult, EyeImageRecord};
use image::{GenericImage, RgbImage};

pub const COMBINED_HISTOGRAM_STEM: &str = "histogram_all";

/// The ordered outcome of one batch.
#[derive(Debug)]
pub struct Aggregate {
    pub records: Vec<EyeImageRecord>,
    /// `None` when there was nothing to stack.
    pub combined_histogram: Option<RgbImage>,
}

/// Sorts results by file name (ascending, byte-wise).
pub fn sort_results(results: &mut [BatchResult]) {
    results.sort_by(|a, b| a.record.file_name.cmp(&b.record.file_name));
}

/// Stacks images top to bottom. All images must share one width.
pub fn vertical_concat(images: &[RgbImage]) -> Option<RgbImage> {
    let width = images.first()?.width();
    if images.iter().any(|image| image.width() != width) {
        tracing::error!("Cannot stack histograms of different widths");
        return None;
    }
    let height = images.iter().map(|image| image.height()).sum();

    let mut stacked = RgbImage::new(width, height);
    let mut offset = 0;
    for image in images {
        if let Err(e) = stacked.copy_from(image, 0, offset) {
            tracing::error!("Failed to stack histogram at row {}: {}", offset, e);
            return None;
        }
        offset += image.height();
    }
    Some(stacked)
}

/// Orders the results and builds the combined chart and the summary records.
pub fn aggregate(mut results: Vec<BatchResult>) -> Aggregate {
    sort_results(&mut results);

    let (records, histograms): (Vec<_>, Vec<_>) = results
        .into_iter()
        .map(|result| (result.record, result.histogram))
        .unzip();

    Aggregate {
        records,
        combined_histogram: vertical_concat(&histograms),
    }
}

/// File name of the combined chart, e.g. `histogram_all.png`.
pub fn combined_histogram_name(extension: &str) -> String {
    format!("{COMBINED_HISTOGRAM_STEM}{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::eye_record::EyeSide;
    use image::Rgb;

    fn result(name: &str, shade: u8) -> BatchResult {
        BatchResult {
            record: EyeImageRecord::new("c/d".to_string(), name.to_string(), EyeSide::Left, 4, 2),
            histogram: RgbImage::from_pixel(4, 2, Rgb([shade, shade, shade])),
        }
    }

    #[test]
    fn results_are_sorted_by_name() {
        let aggregate = aggregate(vec![result("b.png", 2), result("a.png", 1), result("c.png", 3)]);
        let names: Vec<&str> = aggregate.records.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png", "c.png"]);
    }

    #[test]
    fn combined_chart_follows_sorted_order() {
        let aggregate = aggregate(vec![result("c.png", 3), result("a.png", 1), result("b.png", 2)]);
        let combined = aggregate.combined_histogram.unwrap();
        assert_eq!(combined.dimensions(), (4, 6));
        assert_eq!(combined.get_pixel(0, 0).0[0], 1);
        assert_eq!(combined.get_pixel(0, 2).0[0], 2);
        assert_eq!(combined.get_pixel(0, 5).0[0], 3);
    }

    #[test]
    fn sort_is_byte_wise() {
        let aggregate = aggregate(vec![result("a10.png", 0), result("B.png", 0), result("a2.png", 0)]);
        let names: Vec<&str> = aggregate.records.iter().map(|r| r.file_name.as_str()).collect();
        assert_eq!(names, vec!["B.png", "a10.png", "a2.png"]);
    }

    #[test]
    fn nothing_to_stack() {
        let aggregate = aggregate(Vec::new());
        assert!(aggregate.records.is_empty());
        assert!(aggregate.combined_histogram.is_none());
    }

    #[test]
    fn mismatched_widths_are_refused() {
        let images = vec![RgbImage::new(4, 2), RgbImage::new(5, 2)];
        assert!(vertical_concat(&images).is_none());
    }

    #[test]
    fn combined_name_uses_extension() {
        assert_eq!(combined_histogram_name(".jpg"), "histogram_all.jpg");
    }
}
