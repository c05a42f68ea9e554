use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to open workbook {}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("workbook {} has no worksheets", .0.display())]
    NoSheets(PathBuf),

    #[error("worksheet '{sheet}' has no header row (expected banner on row 1, header on row 2)")]
    MissingHeader { sheet: String },

    #[error("worksheet '{sheet}' is missing required columns: {}", .missing.join(", "))]
    MissingColumns { sheet: String, missing: Vec<String> },
}
