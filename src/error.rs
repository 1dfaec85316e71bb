use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrateError {
    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Missing required value in column '{column}' at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("Malformed name '{raw}': no usable tokens after stripping authorship")]
    MalformedName { raw: String },

    #[error("Reference source {source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("API request error: {0}")]
    ApiRequestError(reqwest::Error),

    #[error("API returned an error status: {status} for query: {query}")]
    ApiStatusError {
        status: reqwest::StatusCode,
        query: String,
    },

    #[error("Failed to decode API JSON response: {0}")]
    ApiJsonDecodeError(reqwest::Error),

    #[error("Reference table {path} has no ScientificName column")]
    MissingNameColumn { path: String },
}

pub type Result<T> = std::result::Result<T, CrateError>;
