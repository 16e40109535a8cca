use thiserror::Error;

/// Errors internal helpers can surface to a caller or to a collaborator
/// implementing [`crate::object_graph::ObjectGraph`].
///
/// `search_tables` itself never returns this: every situation it describes
/// is absorbed by the best-effort policy and downgraded to "skip this
/// subtree, keep walking".
#[derive(Debug, Error)]
pub enum TableError {
    #[error("object graph returned an unexpected object shape: {0}")]
    UnexpectedObject(String),

    #[error("structure tree recursion exceeded the configured depth limit ({0})")]
    DepthExceeded(usize),

    #[error("content stream collaborator was asked to tokenize a non-stream object")]
    NotAContentStream,
}

pub type Result<T> = std::result::Result<T, TableError>;
