use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Checkpoint could not be read or does not match the generator layout.
    #[error("failed to load model '{}': {source}", .path.display())]
    ModelLoad {
        path: PathBuf,
        source: tch::TchError,
    },

    /// Embedding archive could not be read.
    #[error("failed to load embeddings '{}': {source}", .path.display())]
    EmbeddingLoad {
        path: PathBuf,
        source: tch::TchError,
    },

    #[error("invalid embedding table '{}': {reason}", .path.display())]
    InvalidEmbeddingTable { path: PathBuf, reason: String },

    /// More base samples requested than the table holds.
    #[error("requested {requested} embeddings but the table only holds {population}")]
    InsufficientEmbeddings { requested: usize, population: usize },

    #[error("the fix_embeddings sampler requires --embedding-file")]
    MissingEmbeddingFile,

    #[error("invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("tensor error: {0}")]
    Torch(#[from] tch::TchError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &'static str,
) -> Error {
    Error::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason,
    }
}
