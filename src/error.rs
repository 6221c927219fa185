use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChronicleError {
    #[error("malformed record: field `{field}` holds unparseable date {value:?}")]
    MalformedRecord { field: &'static str, value: String },

    #[error("failed to read {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, ChronicleError>;
