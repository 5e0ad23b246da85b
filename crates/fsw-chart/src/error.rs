use std::path::PathBuf;

pub type ChartResult<T> = Result<T, ChartError>;

#[derive(thiserror::Error, Debug)]
pub enum ChartError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to render chart '{title}' to {path}: {message}")]
    Render {
        title: String,
        path: PathBuf,
        message: String,
    },

    #[error("Invalid chart request: {what}")]
    InvalidRequest { what: String },
}
