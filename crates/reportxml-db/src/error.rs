//! Error types for the definition database and resolver

use reportxml_core::{NodeType, ParseError, SchemaViolation};

/// Errors from definition resolution
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No definition registered under this id
    #[error("definition not found: {id}")]
    NotFound { id: String },

    /// Depth budget ran out before this id could be resolved
    #[error("depth budget exhausted while resolving {id}")]
    DepthExhausted { id: String },

    /// Resolved definition cannot be turned into a report
    #[error("definition {id} resolves to <{found}>, expected <incident> or <state>")]
    Unsupported { id: String, found: NodeType },

    /// Assembling the result tree broke the schema
    #[error("schema violation: {0}")]
    Schema(#[from] SchemaViolation),
}

impl ResolveError {
    /// True for both a missing id and an exhausted budget
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::DepthExhausted { .. })
    }
}

/// Errors while importing into the database
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatabaseError {
    /// Source text is not a valid report
    #[error("cannot import report: {0}")]
    Parse(#[from] ParseError),
}

/// Result type alias for resolution
pub type ResolveResult<T> = Result<T, ResolveError>;
