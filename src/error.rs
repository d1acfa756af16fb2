//! Error types for keyword localization.
//!
//! Only document extraction can fail. Matching-stage anomalies (a keyword
//! that never occurs, a match offset that cannot be mapped back onto the
//! line's runs) are ordinary outcomes and never surface here.

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Alias kept for callers that think of every failure as an extraction failure.
pub type ExtractionError = Error;

/// Error types that can occur while extracting text positions or searching.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The byte stream could not be opened or parsed as a PDF
    #[error("Corrupt document: {0}")]
    CorruptDocument(String),

    /// The document requires a password or an encryption scheme we cannot handle
    #[error("Document requires unsupported decryption")]
    UnsupportedEncryption,

    /// A single page failed to parse; under fail-fast this aborts the whole extraction
    #[error("Failed to parse page {page}: {reason}")]
    PageParseFailure {
        /// 1-indexed page number
        page: usize,
        /// Reason reported by the parser
        reason: String,
    },

    /// Search options are out of range
    #[error("Invalid search options: {0}")]
    InvalidOptions(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Page number for page-level failures.
    pub fn page(&self) -> Option<usize> {
        match self {
            Error::PageParseFailure { page, .. } => Some(*page),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corrupt_document_error() {
        let err = Error::CorruptDocument("missing xref".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Corrupt document"));
        assert!(msg.contains("missing xref"));
    }

    #[test]
    fn test_page_parse_failure_error() {
        let err = Error::PageParseFailure {
            page: 2,
            reason: "bad content stream".to_string(),
        };
        let msg = format!("{}", err);
        assert!(msg.contains("page 2"));
        assert!(msg.contains("bad content stream"));
        assert_eq!(err.page(), Some(2));
    }

    #[test]
    fn test_unsupported_encryption_has_no_page() {
        assert_eq!(Error::UnsupportedEncryption.page(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
