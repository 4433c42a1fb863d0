use std::error::Error as StdError;

use thiserror::Error;

use crate::emission::Domain;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-wide error type.
///
/// Configuration and input-validation failures get their own variants so callers can match on
/// them; I/O and serialization failures are boxed into `Other`.
#[derive(Debug, Error)]
pub enum Error {
    /// Beam width or expand width is zero.
    #[error("invalid {name}: {value} (must be at least 1)")]
    InvalidWidth { name: &'static str, value: usize },

    /// The configured blank index does not address a column of the emission matrix.
    #[error("blank index {blank} out of range for {classes} classes")]
    BlankOutOfRange { blank: usize, classes: usize },

    /// Label table size and emission column count disagree.
    #[error("alphabet has {expected} classes but emission matrix has {got} columns")]
    AlphabetMismatch { expected: usize, got: usize },

    /// Emission rows are ragged or the matrix has no columns.
    #[error("invalid emission shape: {0}")]
    InvalidShape(String),

    #[error("duplicate label {0:?} in label table")]
    DuplicateLabel(String),

    #[error("empty label at position {0} in label table")]
    EmptyLabel(usize),

    /// NaN, `+inf`, or a value outside the declared input domain.
    #[error("invalid {domain} value {value} at row {row}, column {col}")]
    InvalidValue {
        row: usize,
        col: usize,
        value: f32,
        domain: Domain,
    },

    /// A decoded index has no symbol in the label table.
    #[error("label index {0} has no symbol in the label table")]
    UnknownIndex(usize),

    /// A failure while handling one utterance of an evaluation run.
    #[error("utterance '{file}': {source}")]
    Utterance {
        file: String,
        #[source]
        source: Box<Error>,
    },

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Attach the utterance `file` to `err`. Already-attributed errors are returned as-is.
    pub(crate) fn in_utterance(file: &str, err: Error) -> Self {
        match err {
            Self::Utterance { .. } => err,
            other => Self::Utterance {
                file: file.to_string(),
                source: Box::new(other),
            },
        }
    }

    /// The underlying error, with any utterance context stripped.
    pub fn root(&self) -> &Error {
        match self {
            Self::Utterance { source, .. } => source.root(),
            other => other,
        }
    }

    /// Whether this error stems from invalid configuration rather than bad input data.
    ///
    /// Malformed emission matrices (`InvalidShape`, `InvalidValue`) are input data and only
    /// fail the utterance they belong to.
    pub fn is_config(&self) -> bool {
        matches!(
            self.root(),
            Self::InvalidWidth { .. }
                | Self::BlankOutOfRange { .. }
                | Self::AlphabetMismatch { .. }
                | Self::DuplicateLabel(_)
                | Self::EmptyLabel(_)
        )
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<ndarray::ShapeError> for Error {
    fn from(err: ndarray::ShapeError) -> Self {
        Self::InvalidShape(err.to_string())
    }
}
