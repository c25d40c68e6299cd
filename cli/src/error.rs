use std::fmt::Display;
use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("File error `{path}`: {error}")]
    File { path: PathBuf, error: io::Error },
    #[error("Could not deserialize {kind} from `{path}`: {error}")]
    Deserialize {
        path: String,
        kind: &'static str,
        error: serde_json::Error,
    },
    #[error("Could not read the usage CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("Not enough data points: found {found} rows, expected at least {minimum}")]
    NotEnoughRows { found: usize, minimum: usize },
    #[error("Timestamps must be in chronological order (row {row} goes backwards)")]
    OutOfOrder { row: usize },
    #[error("Invalid sampling interval: expected 1 hour between readings, found {minutes} minutes")]
    UnexpectedInterval { minutes: i64 },
    #[error("Invalid month `{0}`, expected the format YYYY-MM")]
    MonthFormat(String),
    #[error("Could not serialize the report: {0}")]
    Serialize(serde_json::Error),
    #[error("{0}")]
    Model(#[from] power_tariffs::Error),
}

impl Error {
    pub fn file(path: PathBuf, error: io::Error) -> Self {
        Self::File { path, error }
    }

    pub fn deserialize(path: impl Display, kind: &'static str, error: serde_json::Error) -> Self {
        Self::Deserialize {
            path: path.to_string(),
            kind,
            error,
        }
    }
}
