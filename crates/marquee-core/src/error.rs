// crates/marquee-core/src/error.rs

use std::path::PathBuf;

use marquee_parser::LiteralError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("cannot access {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not valid CSV: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: polars::error::PolarsError,
    },

    #[error("column '{column}' row {row} is not a literal list of records: {source}")]
    FieldParse {
        column: String,
        row: usize,
        #[source]
        source: LiteralError,
    },

    #[error("{stage} requires column '{column}', which is not present")]
    SchemaAssumption { column: String, stage: &'static str },

    #[error("no profile registered as '{0}'")]
    UnknownProfile(String),

    #[error("invalid profile configuration: {0}")]
    ProfileConfig(String),

    #[error("Polars operation failed: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
