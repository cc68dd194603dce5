//! # Sidechat Document
//!
//! Read-only view of a rendered, hierarchical document as an ordered sequence of
//! text-bearing leaves.
//!
//! ## Architecture
//!
//! ```text
//! Host document (DOM, outline file, synthetic tree)
//!     │
//!     └──> TreeCursor (trait)
//!            ├─> parent / previous siblings / next siblings
//!            ├─> leaves under a subtree (document order)
//!            └─> leaf ∩ SelectionRange
//! ```
//!
//! [`DocumentTree`] is the in-memory adapter. It backs the tests, the CLI, and any host
//! that can hand over a snapshot of its document.
//!
//! ## Example
//!
//! ```rust
//! use sidechat_document::{DocumentTree, TreeCursor};
//!
//! let tree = DocumentTree::from_outline("# Intro\nThe quick brown fox\njumps over the dog\n");
//! let selection = tree.find("brown").unwrap();
//! let node = tree.node_for_selection(&selection).unwrap();
//! assert_eq!(tree.leaves(&node).len(), 1);
//! ```

mod cursor;
mod error;
mod leaf;
mod selection;
mod tree;
mod words;

pub use cursor::TreeCursor;
pub use error::{DocumentError, Result};
pub use leaf::{LeafId, TextLeaf};
pub use selection::{SelectionRange, TextPosition};
pub use tree::{DocumentBuilder, DocumentTree, NodeId};
pub use words::{count_words, join_leaves, leaves_word_count};
