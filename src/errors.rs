use thiserror::Error;

#[derive(Error, Debug)]
pub enum BardragError {
    #[error("Dataset load error: {0}")]
    DatasetLoad(String),

    #[error("Dataset is empty: no topics loaded")]
    EmptyDataset,

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation unavailable: {0}")]
    GenerationUnavailable(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BardragError>;
