pub mod aggregator;
pub mod brightest_spot;
pub mod eye_record;
pub mod file_operations;
pub mod histogram;
pub mod image_processor;
pub mod resolution;
