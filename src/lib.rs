pub mod aggregate;
pub mod charts;
pub mod config;
pub mod dataset;
pub mod error;
pub mod features;
pub mod report;

use std::path::Path;

use crate::aggregate::Summary;
use crate::dataset::Dataset;
use crate::error::LoadError;
use crate::features::GameRow;

/// Output of the load, derive and aggregate stages for one dataset.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub dataset: Dataset,
    pub rows: Vec<GameRow>,
    pub summary: Summary,
}

pub fn analyze(path: &Path, top_limit: usize) -> Result<Analysis, LoadError> {
    let dataset = dataset::load_dataset(path)?;
    let rows = features::derive_rows(&dataset.rows);
    let summary = Summary::compute(&rows, top_limit);
    Ok(Analysis {
        dataset,
        rows,
        summary,
    })
}
