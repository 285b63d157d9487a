// THEORY:
// This file is the main entry point for the `eyes_recognition` library crate.
// It exposes `BatchPipeline` and its associated data structures (`BatchConfig`,
// `BatchReport`, `EyeImageRecord`, ...) as the high-level interface of the
// engine. The per-stage modules live under `core_modules` and stay usable on
// their own, but a caller that just wants a folder analysed only needs the
// re-exports below.

pub mod config;
pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use config::BatchConfig;
pub use core_modules::eye_record::{BatchResult, EyeImageRecord, EyeSide, TaskFailure};
pub use core_modules::histogram::HistogramMode;
pub use core_modules::resolution::Resolution;
pub use error::{VisionError, VisionResult};
pub use pipeline::{BatchPipeline, BatchReport};
