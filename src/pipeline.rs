// THEORY:
// The `pipeline` module is the top-level API of the engine. `BatchPipeline`
// turns one folder of eye photographs into annotated copies, histogram charts,
// one stacked chart and a `result.json` summary.
//
// The run is a two-phase pipeline:
// 1.  **Serial setup**: list the batch, compute the shared normalization target
//     and create the result folder. Any failure here aborts the run before a
//     single worker starts.
// 2.  **Parallel fan-out**: one job per file on a bounded `WorkerPool`. Each job
//     returns its own result through a handle; the pipeline joins all handles,
//     then hands the successes to the aggregator and keeps the failures in the
//     report.
//
// The join waits indefinitely by default. A `CancellationToken` and an optional
// timeout from the config can cut it short.

use crate::config::BatchConfig;
use crate::core_modules::aggregator::{aggregate, combined_histogram_name};
use crate::core_modules::eye_record::{BatchResult, EyeImageRecord, TaskFailure};
use crate::core_modules::file_operations::{
    create_directory, extension_of, file_name_of, list_image_files, save_summary,
};
use crate::core_modules::image_processor::ImageProcessor;
use crate::core_modules::resolution::{Resolution, normalize_batch};
use crate::error::{VisionError, VisionResult};
use crate::parallel_pipeline::{TaskHandle, WorkerPool};
use futures::future::join_all;
use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What a finished batch produced.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Records in file-name order, exactly as written to `result.json`.
    pub records: Vec<EyeImageRecord>,
    /// Files that produced no record, in file-name order.
    pub failures: Vec<TaskFailure>,
    /// The result folder, `None` when the batch was empty.
    pub output_dir: Option<PathBuf>,
    pub normalized: Resolution,
}

impl BatchReport {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty() && self.failures.is_empty()
    }
}

/// The main batch engine.
pub struct BatchPipeline {
    config: BatchConfig,
}

impl BatchPipeline {
    pub fn new(config: BatchConfig) -> VisionResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BatchConfig {
        &self.config
    }

    /// Runs the batch and waits for every image, however long it takes
    /// (unless the config sets a timeout).
    pub async fn run(&self) -> VisionResult<BatchReport> {
        self.run_with_cancel(CancellationToken::new()).await
    }

    /// Like `run`, but stops early when `cancel` fires or the configured timeout
    /// elapses. Images already being processed when that happens finish in the
    /// background, so their annotated copies and histogram charts may still
    /// appear in `result/` after this returns. `result.json` and the combined
    /// chart are never written on an early return.
    pub async fn run_with_cancel(&self, cancel: CancellationToken) -> VisionResult<BatchReport> {
        // Stage 1: Listing
        let files = list_image_files(&self.config.input_folder, &self.config.excluded_extensions)?;
        if files.is_empty() {
            tracing::info!("No images found in {}", self.config.input_folder.display());
            return Ok(BatchReport::empty());
        }

        // Stage 2: Normalization pre-pass
        let scan = files.clone();
        let normalized = tokio::task::spawn_blocking(move || normalize_batch(&scan))
            .await
            .map_err(|e| VisionError::TaskPanicked(e.to_string()))??;

        // Stage 3: Output folder and pool sizing
        let output_dir = self.config.output_folder();
        if let Err(e) = create_directory(&output_dir) {
            tracing::error!("Failed to create result folder: {}", e);
            return Err(e);
        }
        let workers = self.config.effective_workers(files.len());
        tracing::info!(files = files.len(), workers, "Starting batch");

        // Stage 4: Fan-out and join
        let processor = ImageProcessor::new(&self.config, normalized);
        let pool = WorkerPool::new(workers, move |path: PathBuf| processor.process(&path));
        let outcomes = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(VisionError::Cancelled),
            joined = within(self.config.timeout, submit_and_join(&pool, &files)) => joined,
        };
        let outcomes = match outcomes {
            Ok(outcomes) => outcomes,
            Err(e) => {
                tracing::error!("Batch stopped early: {}", e);
                pool.abort();
                return Err(e);
            }
        };
        pool.shutdown().await;

        // Stage 5: Aggregation and output
        let (results, failures) = partition_outcomes(&files, outcomes);
        let aggregate = aggregate(results);

        if let Some(combined) = &aggregate.combined_histogram {
            let path = output_dir.join(combined_histogram_name(&extension_of(&files[0])));
            if let Err(e) = combined.save(&path) {
                tracing::warn!("Failed to write {}: {}", path.display(), e);
            }
        }
        save_summary(&aggregate.records, &output_dir)?;

        Ok(BatchReport {
            records: aggregate.records,
            failures,
            output_dir: Some(output_dir),
            normalized,
        })
    }
}

async fn submit_and_join(
    pool: &WorkerPool<PathBuf, BatchResult>,
    files: &[PathBuf],
) -> Vec<VisionResult<BatchResult>> {
    let mut handles = Vec::with_capacity(files.len());
    for path in files {
        handles.push(pool.submit(path.clone()).await);
    }
    join_all(handles.into_iter().map(TaskHandle::join)).await
}

async fn within<F: Future>(limit: Option<Duration>, future: F) -> VisionResult<F::Output> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, future)
            .await
            .map_err(|_| VisionError::TimedOut(limit)),
        None => Ok(future.await),
    }
}

fn partition_outcomes(
    files: &[PathBuf],
    outcomes: Vec<VisionResult<BatchResult>>,
) -> (Vec<BatchResult>, Vec<TaskFailure>) {
    let mut results = Vec::with_capacity(outcomes.len());
    let mut failures = Vec::new();

    for (path, outcome) in files.iter().zip(outcomes) {
        match outcome {
            Ok(result) => results.push(result),
            Err(e) => {
                tracing::error!("Failed to process {}: {}", path.display(), e);
                failures.push(TaskFailure {
                    file_name: file_name_of(path),
                    reason: e.to_string(),
                });
            }
        }
    }

    failures.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    (results, failures)
}
