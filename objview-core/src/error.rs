/// Errors produced while loading an OBJ model
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Which attribute array a face index points into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    Vertex,
    TexCoord,
    Normal,
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => write!(f, "vertex"),
            Self::TexCoord => write!(f, "texture coordinate"),
            Self::Normal => write!(f, "normal"),
        }
    }
}

/// Failure of a single load attempt. Line numbers are 1-based.
#[derive(Debug, Error)]
pub enum ObjError {
    #[error("couldn't open \"{}\"", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read OBJ data: {0}")]
    Io(#[from] io::Error),

    #[error("no vertex found")]
    NoVertices,

    #[error("contradiction between collected info: {0}")]
    InconsistentAttributes(String),

    #[error("line {line}: error reading vertex data")]
    MalformedVertex { line: usize },

    #[error("line {line}: error reading texture coordinates")]
    MalformedTexCoord { line: usize },

    #[error("line {line}: error reading normal vector")]
    MalformedNormal { line: usize },

    #[error("line {line}: a face must have at least 3 vertices, found {corners}")]
    DegenerateFace { line: usize, corners: usize },

    #[error("line {line}: malformed face entry \"{entry}\"")]
    MalformedFace { line: usize, entry: String },

    #[error("line {line}: {kind} index {index} is out of range (count {count})")]
    IndexOutOfRange {
        line: usize,
        kind: IndexKind,
        index: i64,
        count: usize,
    },

    #[error("{what} count changed between passes: {first} then {second}")]
    PassMismatch {
        what: &'static str,
        first: usize,
        second: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_line_numbers() {
        let err = ObjError::DegenerateFace { line: 7, corners: 2 };
        assert_eq!(
            err.to_string(),
            "line 7: a face must have at least 3 vertices, found 2"
        );

        let err = ObjError::IndexOutOfRange {
            line: 3,
            kind: IndexKind::Normal,
            index: 9,
            count: 4,
        };
        assert!(err.to_string().contains("normal index 9"));
    }
}
