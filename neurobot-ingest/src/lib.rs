//! Training pipeline for NeuroBot — turns uploaded files, URLs, FAQ pairs
//! and free text into stored knowledge fragments.

pub mod extract;
pub mod fetch;
pub mod pipeline;

pub use extract::{detect_source_type, extract_file_text};
pub use fetch::PageFetcher;
pub use pipeline::{BatchFile, BatchReport, TrainingPipeline};
