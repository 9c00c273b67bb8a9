use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load settings: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source {source_name} could not produce seed URLs: {reason}")]
    Seed { source_name: String, reason: String },
    #[error("source {source_name} failed to parse {url}: {reason}")]
    Parse {
        source_name: String,
        url: String,
        reason: String,
    },
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error while exporting: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error while exporting: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ValidateError {
    #[error("could not read CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing columns: {0:?}")]
    MissingColumns(Vec<String>),
}
