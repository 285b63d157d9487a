// THEORY:
// `BatchConfig` carries every fully-resolved parameter of one batch run. The
// engine never parses flags or files for these values; callers build the struct
// (usually from `Default`) and adjust the fields they care about. `validate` is
// the single gate that turns caller contract violations into setup errors
// before any image is touched.

use crate::core_modules::histogram::HistogramMode;
use crate::error::{VisionError, VisionResult};
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_RADIUS: u32 = 61;
const DEFAULT_WORKER_COUNT: usize = 16;
const DEFAULT_HISTOGRAM_SIZE: u32 = 1200;

/// Configuration for one `BatchPipeline` run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Gaussian kernel size used before locating the brightest spot. Must be odd.
    /// Also the radius of the marker circle drawn on the annotated copy.
    pub radius: u32,
    /// Folder holding the input images. Results land in `<input_folder>/result`.
    pub input_folder: PathBuf,
    /// Delimiter used when deriving the directory label from `input_folder`.
    pub label_delimiter: char,
    /// How many trailing path segments make up the directory label.
    pub label_depth: usize,
    /// Files whose name ends with any of these suffixes are skipped.
    pub excluded_extensions: Vec<String>,
    /// Requested worker count. Clamped to the batch size; 0 means one per CPU.
    pub worker_count: usize,
    pub histogram_width: u32,
    pub histogram_height: u32,
    pub histogram_mode: HistogramMode,
    /// Upper bound on the wait for all workers. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            input_folder: PathBuf::new(),
            label_delimiter: '/',
            label_depth: 2,
            excluded_extensions: vec![".xml".to_string()],
            worker_count: DEFAULT_WORKER_COUNT,
            histogram_width: DEFAULT_HISTOGRAM_SIZE,
            histogram_height: DEFAULT_HISTOGRAM_SIZE,
            histogram_mode: HistogramMode::Grayscale,
            timeout: None,
        }
    }
}

impl BatchConfig {
    pub fn new(input_folder: impl Into<PathBuf>) -> Self {
        Self {
            input_folder: input_folder.into(),
            ..Self::default()
        }
    }

    // Sets the blur radius, this will override the default configuration.
    pub fn with_radius(mut self, radius: u32) -> Self {
        self.radius = radius;
        self
    }

    // Sets how the directory label is cut out of the input folder path.
    pub fn with_label(mut self, delimiter: char, depth: usize) -> Self {
        self.label_delimiter = delimiter;
        self.label_depth = depth;
        self
    }

    pub fn with_excluded_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded_extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_worker_count(mut self, worker_count: usize) -> Self {
        self.worker_count = worker_count;
        self
    }

    pub fn with_histogram_size(mut self, width: u32, height: u32) -> Self {
        self.histogram_width = width;
        self.histogram_height = height;
        self
    }

    pub fn with_histogram_mode(mut self, mode: HistogramMode) -> Self {
        self.histogram_mode = mode;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Rejects parameters the engine cannot honour. Even radii fail fast
    /// instead of being rounded up.
    pub fn validate(&self) -> VisionResult<()> {
        if self.radius == 0 || self.radius % 2 == 0 {
            return Err(VisionError::InvalidConfig(format!(
                "blur radius must be a positive odd number, got {}",
                self.radius
            )));
        }
        if self.histogram_width == 0 || self.histogram_height == 0 {
            return Err(VisionError::InvalidConfig(format!(
                "histogram canvas must be non-empty, got {}x{}",
                self.histogram_width, self.histogram_height
            )));
        }
        if self.label_depth == 0 {
            return Err(VisionError::InvalidConfig(
                "label depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// The worker count after resolving 0 to the CPU count and clamping to the batch size.
    pub fn effective_workers(&self, file_count: usize) -> usize {
        let requested = if self.worker_count == 0 {
            num_cpus::get().max(1)
        } else {
            self.worker_count
        };
        requested.min(file_count)
    }

    pub fn output_folder(&self) -> PathBuf {
        self.input_folder.join("result")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_reference_run() {
        let config = BatchConfig::default();
        assert_eq!(config.radius, 61);
        assert_eq!(config.label_delimiter, '/');
        assert_eq!(config.label_depth, 2);
        assert_eq!(config.excluded_extensions, vec![".xml".to_string()]);
        assert_eq!(config.worker_count, 16);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn even_and_zero_radius_are_rejected() {
        assert!(BatchConfig::default().with_radius(4).validate().is_err());
        assert!(BatchConfig::default().with_radius(0).validate().is_err());
        assert!(BatchConfig::default().with_radius(1).validate().is_ok());
    }

    #[test]
    fn empty_canvas_is_rejected() {
        let config = BatchConfig::default().with_histogram_size(0, 100);
        assert!(matches!(config.validate(), Err(VisionError::InvalidConfig(_))));
    }

    #[test]
    fn workers_are_clamped_to_batch_size() {
        let config = BatchConfig::default().with_worker_count(16);
        assert_eq!(config.effective_workers(3), 3);
        assert_eq!(config.effective_workers(40), 16);
        assert_eq!(config.effective_workers(0), 0);
    }

    #[test]
    fn zero_workers_resolve_to_cpu_count() {
        let config = BatchConfig::default().with_worker_count(0);
        assert!(config.effective_workers(1_000) >= 1);
    }

    #[test]
    fn output_folder_is_nested_in_input() {
        let config = BatchConfig::new("/data/eyes");
        assert_eq!(config.output_folder(), PathBuf::from("/data/eyes/result"));
    }
}
