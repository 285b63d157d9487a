// Example runner for the `eyes_recognition` library.
// Analyses one folder with the default parameters.

use eyes_recognition::{BatchConfig, BatchPipeline, VisionError};
use tracing::Level;

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

#[tokio::main]
async fn main() -> Result<(), VisionError> {
    init_logging();

    let Some(folder) = std::env::args().nth(1) else {
        println!("Usage: eyes_recognition <image_folder>");
        return Ok(());
    };

    let pipeline = BatchPipeline::new(BatchConfig::new(folder))?;
    tracing::info!(
        "Analysing {} with {} workers",
        pipeline.config().input_folder.display(),
        pipeline.config().worker_count
    );
    let report = pipeline.run().await?;

    tracing::info!(
        processed = report.records.len(),
        failed = report.failures.len(),
        "Batch finished"
    );
    for failure in &report.failures {
        tracing::warn!("{}: {}", failure.file_name, failure.reason);
    }
    Ok(())
}
