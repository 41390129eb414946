pub mod photo_discovery;
pub mod threaded_extraction_executor;
