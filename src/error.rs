//! Error types shared by the report engine.
//!
//! A report run is aborted when the database session is lost, when a row set
//! is paired with a column style of the wrong arity, or when the output sink
//! fails. Everything else (a missing counter, an unreadable host file, an
//! absent sys view) is handled locally by the component that hits it.

/// Errors surfaced by the report engine.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Database connectivity error: {0}")]
    Connectivity(#[source] sqlx::Error),

    #[error("Query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error(
        "Section '{title}': row {row} has {row_arity} values but {style_arity} column styles are declared"
    )]
    StyleArityMismatch {
        title: String,
        row: usize,
        row_arity: usize,
        style_arity: usize,
    },

    #[error("Invalid column style '{0}': expected 'label,align' or 'label,width,align'")]
    InvalidStyle(String),

    #[error("Column style positions must be contiguous from 1, missing position {0}")]
    InvalidStyleIndex(usize),

    #[error("Failed to write report output: {0}")]
    Io(#[from] std::io::Error),
}

/// Server-side statement errors (an absent view, a bad column) only break
/// the section that issued them; transport and protocol failures mean the
/// session is gone.
impl From<sqlx::Error> for ReportError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(_)
            | sqlx::Error::RowNotFound
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnIndexOutOfBounds { .. }
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::Decode(_)
            | sqlx::Error::TypeNotFound { .. } => ReportError::Query(err),
            other => ReportError::Connectivity(other),
        }
    }
}

impl ReportError {
    /// Whether this error should abort the entire report run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ReportError::Connectivity(_) | ReportError::StyleArityMismatch { .. } | ReportError::Io(_)
        )
    }
}

/// A counter required by a derived metric is absent from a snapshot, or
/// present but not an unsigned integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Counter '{counter}' is missing or not numeric in the {sequence} snapshot")]
pub struct MissingCounterError {
    pub counter: String,
    pub sequence: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_mismatch_message() {
        let err = ReportError::StyleArityMismatch {
            title: "Connect Count".to_string(),
            row: 1,
            row_arity: 4,
            style_arity: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("Connect Count"));
        assert!(msg.contains("4 values"));
        assert!(msg.contains("3 column styles"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_style_errors_are_not_fatal_at_render_time() {
        assert!(!ReportError::InvalidStyle("x".into()).is_fatal());
        assert!(!ReportError::InvalidStyleIndex(2).is_fatal());
    }

    #[test]
    fn test_sqlx_error_classification() {
        let query = ReportError::from(sqlx::Error::RowNotFound);
        assert!(matches!(query, ReportError::Query(_)));
        assert!(!query.is_fatal());

        let lost = ReportError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(lost, ReportError::Connectivity(_)));
        assert!(lost.is_fatal());

        let io = ReportError::from(sqlx::Error::Io(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "reset",
        )));
        assert!(io.is_fatal());
    }

    #[test]
    fn test_missing_counter_message() {
        let err = MissingCounterError {
            counter: "Questions".to_string(),
            sequence: "first",
        };
        assert_eq!(
            err.to_string(),
            "Counter 'Questions' is missing or not numeric in the first snapshot"
        );
    }
}
