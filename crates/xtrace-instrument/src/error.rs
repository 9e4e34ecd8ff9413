use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum InstrumentError {
    #[error("failed to read program {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("element name `{name}` on line {line} contains the marker delimiter `|`")]
    DelimiterInName { line: usize, name: String },

    #[error("invalid marker sentinel `{sentinel}`: {message}")]
    InvalidSentinel { sentinel: String, message: String },
}

impl InstrumentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
