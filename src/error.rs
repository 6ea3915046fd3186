//! Error types shared by the view, history and session layers

use std::path::PathBuf;

use crate::session::ViewId;

/// Failure reported by a rendering engine
#[derive(Debug, thiserror::Error)]
pub enum EngineFault {
    #[cfg(feature = "pdf")]
    #[error("PDF engine: {0}")]
    Pdf(#[from] mupdf::error::Error),

    #[error("{detail}")]
    Generic { detail: String },
}

impl EngineFault {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic { detail: msg.into() }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BrowseError {
    #[error("cannot open {path}: {source}")]
    DocumentOpen {
        path: String,
        #[source]
        source: EngineFault,
    },

    #[error("cannot render page {}: {source}", page + 1)]
    RenderFailure {
        page: usize,
        #[source]
        source: EngineFault,
    },

    #[error("zoom must be a positive number, got {0}")]
    InvalidZoom(f32),

    #[error("history file {} is corrupt: {source}", path.display())]
    ConfigCorrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("history file {}: {source}", path.display())]
    HistoryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("view {0:?} is not open")]
    UnknownView(ViewId),

    #[error("no file to view")]
    NoDocument,
}

impl BrowseError {
    pub fn document_open(path: impl Into<String>, source: EngineFault) -> Self {
        Self::DocumentOpen {
            path: path.into(),
            source,
        }
    }

    /// Whether a running session can keep going after this error.
    ///
    /// `UnknownView` means the front end and the session disagree about which
    /// views exist and `NoDocument` only happens at startup, so both end the run.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::UnknownView(_) | Self::NoDocument)
    }
}

pub type Result<T> = std::result::Result<T, BrowseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_failure_reports_one_based_page() {
        let err = BrowseError::RenderFailure {
            page: 4,
            source: EngineFault::generic("bad xref"),
        };
        assert_eq!(err.to_string(), "cannot render page 5: bad xref");
    }

    #[test]
    fn unknown_view_is_fatal() {
        assert!(!BrowseError::UnknownView(ViewId::new(3)).is_recoverable());
        assert!(BrowseError::InvalidZoom(0.0).is_recoverable());
        assert!(
            BrowseError::document_open("a.pdf", EngineFault::generic("missing")).is_recoverable()
        );
    }
}
