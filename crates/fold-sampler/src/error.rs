/// Errors raised while slicing frames or building folds.
#[derive(Debug, thiserror::Error)]
pub enum SamplerError {
    /// Positional access past the end of a frame list.
    #[error("Index {index} out of range for {len} frames")]
    IndexOutOfRange { index: usize, len: usize },

    /// A frame list has no frames to anchor a row index on.
    #[error("No {0} frames to anchor the row index on")]
    EmptyFrames(&'static str),

    /// The anchoring frame exists positionally but is absent.
    #[error("{list} frame {index} is absent")]
    MissingFrame { list: &'static str, index: usize },

    /// A split selected a row key the frame does not contain.
    #[error("Row key {0} not found in frame index")]
    UnknownKey(String),

    /// A frame index lists the same row key twice.
    #[error("Duplicate row key {0} in frame index")]
    DuplicateKey(String),

    /// Index, columns and values disagree on shape.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// A splitter or fold function was configured with unusable values.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, SamplerError>;
