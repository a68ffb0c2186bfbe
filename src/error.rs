use std::fmt::{self, Display, Formatter};

/// Failure to resolve a file in the current index.
///
/// Both variants mean the caller holds a path or id from before the last
/// scan (or never part of it); the index itself is fine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The path was not mapped by the last scan.
    NotFound(String),

    /// The id is not a currently valid record id.
    OutOfRange {
        id:  usize,
        len: usize,
    },
}

impl Display for LookupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(path) => write!(f, "file not in index: {path}"),
            Self::OutOfRange { id, len } => {
                write!(f, "record id {id} out of range (index holds {len} files)")
            }
        }
    }
}

impl std::error::Error for LookupError {}
