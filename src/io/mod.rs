//! IO modules - output of generated datasets
//!
//! - `dataset_writer` - CSV datasets and the JSON run summary

pub mod dataset_writer;

// Re-export commonly used types
pub use dataset_writer::{write_csv_to, DatasetWriter};
