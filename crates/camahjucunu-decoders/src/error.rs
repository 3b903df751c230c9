use camahjucunu_bnf::{GrammarError, ParseReport};

/// Unified failure type for the decoding pipelines.
///
/// No partial results: a decode either yields the full typed value or one of
/// these.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error(transparent)]
    Grammar(#[from] GrammarError),
    #[error(transparent)]
    Parse(#[from] Box<ParseReport>),
    /// Structural assumption violated while projecting the tree, or a failed
    /// table/row/field lookup.
    #[error("{0}")]
    Structure(String),
}

impl From<ParseReport> for DecodeError {
    fn from(report: ParseReport) -> Self {
        DecodeError::Parse(Box::new(report))
    }
}

impl DecodeError {
    pub(crate) fn structure(message: impl Into<String>) -> Self {
        DecodeError::Structure(message.into())
    }
}
