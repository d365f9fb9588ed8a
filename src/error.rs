use thiserror::Error;

/// Which indexed collection an out-of-range access targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Axis,
    Level,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IndexKind::Axis => f.write_str("axis"),
            IndexKind::Level => f.write_str("level"),
        }
    }
}

#[derive(Error, Debug)]
pub enum LadderError {
    #[error("{kind} index {index} out of range (len {len})")]
    IndexOutOfRange {
        kind: IndexKind,
        index: usize,
        len: usize,
    },

    #[error("Invalid config snapshot: {0}")]
    InvalidSnapshot(#[from] serde_json::Error),

    #[error("Style error: {0}")]
    Style(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl LadderError {
    pub(crate) fn axis(index: usize, len: usize) -> Self {
        LadderError::IndexOutOfRange {
            kind: IndexKind::Axis,
            index,
            len,
        }
    }

    pub(crate) fn level(index: usize, len: usize) -> Self {
        LadderError::IndexOutOfRange {
            kind: IndexKind::Level,
            index,
            len,
        }
    }
}

pub type Result<T, E = LadderError> = std::result::Result<T, E>;
