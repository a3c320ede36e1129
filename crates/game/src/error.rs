//! Error types for asset loading.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Error type for mesh loading.
///
/// A failed load never touches the scene it was loading into.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("cannot read {}: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl LoadError {
    pub(crate) fn file_not_found(path: &Path, source: io::Error) -> Self {
        Self::FileNotFound {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Line-level details, if this is a parse error.
    pub fn parse_error(&self) -> Option<&ParseError> {
        match self {
            Self::Parse(err) => Some(err),
            Self::FileNotFound { .. } => None,
        }
    }
}

/// A parse failure with its location.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{}:{line}: {kind}", .file.display())]
pub struct ParseError {
    /// File being parsed (OBJ or MTL).
    pub file: PathBuf,
    /// 1-based line number.
    pub line: usize,
    /// What went wrong.
    pub kind: ParseErrorKind,
}

impl ParseError {
    pub fn new(file: impl Into<PathBuf>, line: usize, kind: ParseErrorKind) -> Self {
        Self {
            file: file.into(),
            line,
            kind,
        }
    }
}

/// Reasons a line can fail to parse.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseErrorKind {
    #[error("`{directive}` before any `newmtl`")]
    MalformedHeader { directive: String },

    #[error("malformed `{directive}` directive: `{line}`")]
    MalformedDirective { directive: String, line: String },

    #[error("malformed face vertex `{token}`")]
    MalformedFaceToken { token: String },

    #[error("face vertex `{token}` references {pool} {index}, but only {len} are defined")]
    UnresolvedVertexReference {
        token: String,
        pool: PoolKind,
        index: usize,
        len: usize,
    },

    #[error("unknown material `{name}`")]
    UnknownMaterial { name: String },

    #[error("face has {count} vertices, need at least 3")]
    TooFewFaceVertices { count: usize },
}

impl ParseErrorKind {
    /// Whether lenient parsing skips the line instead of failing.
    ///
    /// These are the lines the text format itself tolerates: short
    /// coordinate lists, directives missing their argument, and faces too
    /// small to form a triangle.
    pub fn is_skippable(&self) -> bool {
        matches!(
            self,
            Self::MalformedDirective { .. } | Self::TooFewFaceVertices { .. }
        )
    }
}

/// Which raw vertex list a face token indexes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolKind {
    Position,
    Texcoord,
    Normal,
}

impl fmt::Display for PoolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Position => "position",
            Self::Texcoord => "texcoord",
            Self::Normal => "normal",
        })
    }
}

/// Error type for texture loading.
#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("cannot read texture {}: {source}", .path.display())]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("bad texture header in {}: {reason}", .path.display())]
    MalformedHeader { path: PathBuf, reason: String },

    #[error("cannot decode texture {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}
