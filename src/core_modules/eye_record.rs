// THEORY:
// The `eye_record` module holds the data that leaves a per-image task. It is a
// set of "dumb" containers with no behaviour beyond construction and
// serialization:
//
// 1.  **EyeSide**: the three-way classification outcome. There is no unknown
//     state; every processed image lands in exactly one bucket.
// 2.  **EyeImageRecord**: the machine-readable result for one image. Its JSON
//     shape (`dir`, `name`, `side`, `phase`, `histogram`, `size`) is the public
//     contract of `result.json`.
// 3.  **BatchResult**: an `EyeImageRecord` paired with its rendered histogram.
//     A task owns it until the aggregator takes it over and consumes the image.

use image::RgbImage;
use serde::{Deserialize, Serialize};

/// Placeholder exposure phase written for every record.
pub const UNSET_PHASE: i32 = -1;

/// Which side of the face an eye photograph belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EyeSide {
    #[serde(rename = "l")]
    Left,
    #[serde(rename = "r")]
    Right,
    #[serde(rename = "u")]
    Upper,
}

/// The analysis result for one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EyeImageRecord {
    /// Label derived from the input folder path.
    #[serde(rename = "dir")]
    pub directory_label: String,
    /// Base file name, no path.
    #[serde(rename = "name")]
    pub file_name: String,
    pub side: EyeSide,
    pub phase: i32,
    /// Reserved per-bin data, always empty for now.
    #[serde(rename = "histogram")]
    pub histogram_values: Vec<f64>,
    /// `[width, height]` of the grayscale image before any resize.
    #[serde(rename = "size")]
    pub dimensions: [u32; 2],
}

impl EyeImageRecord {
    pub fn new(directory_label: String, file_name: String, side: EyeSide, width: u32, height: u32) -> Self {
        Self {
            directory_label,
            file_name,
            side,
            phase: UNSET_PHASE,
            histogram_values: Vec::new(),
            dimensions: [width, height],
        }
    }
}

/// One record plus the histogram chart rendered for it.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub record: EyeImageRecord,
    pub histogram: RgbImage,
}

/// A task that produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFailure {
    pub file_name: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_serializes_with_short_keys() {
        let record = EyeImageRecord::new(
            "d_0ccf/2016-03-03".to_string(),
            "eye_01.png".to_string(),
            EyeSide::Upper,
            640,
            480,
        );
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            r#"{"dir":"d_0ccf/2016-03-03","name":"eye_01.png","side":"u","phase":-1,"histogram":[],"size":[640,480]}"#
        );
    }

    #[test]
    fn sides_use_single_letter_codes() {
        assert_eq!(serde_json::to_string(&EyeSide::Left).unwrap(), r#""l""#);
        assert_eq!(serde_json::to_string(&EyeSide::Right).unwrap(), r#""r""#);
        let parsed: EyeSide = serde_json::from_str(r#""u""#).unwrap();
        assert_eq!(parsed, EyeSide::Upper);
    }
}
