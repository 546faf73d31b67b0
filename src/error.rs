//! Errors raised while reading or writing circuit files.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FileError {
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{path}' is not a valid circuit file: {source}")]
    Deserialize {
        path: String,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("Failed to encode circuit: {0}")]
    Serialize(#[from] ron::Error),
}

impl FileError {
    pub fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}
