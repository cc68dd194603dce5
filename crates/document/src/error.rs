use crate::leaf::LeafId;
use thiserror::Error;

/// Result type for document operations
pub type Result<T> = std::result::Result<T, DocumentError>;

/// Errors raised while building or addressing a document tree
#[derive(Error, Debug, PartialEq, Eq)]
pub enum DocumentError {
    /// `close()` was called with only the root element open
    #[error("Unbalanced close: no open element besides the root")]
    UnbalancedClose,

    /// A selection anchor refers to a leaf the tree does not contain
    #[error("Unknown leaf: {0}")]
    UnknownLeaf(LeafId),
}
