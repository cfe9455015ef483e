use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("line {line}: cannot parse {field} from {value:?}")]
    Parse {
        line: u64,
        field: &'static str,
        value: String,
    },

    #[error("no customer records in {}; nothing to report for an empty window", path.display())]
    EmptyDataset { path: PathBuf },

    #[error("chart rendering failed: {0}")]
    Chart(String),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReportError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReportError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReportError>;
