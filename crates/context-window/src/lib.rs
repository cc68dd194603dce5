//! # Sidechat Context Window
//!
//! Derives the "surrounding context" for a user selection: the widest symmetric run of
//! text leaves around the selection whose word count fits a budget.
//!
//! ## Architecture
//!
//! ```text
//! SelectionRange + TreeCursor
//!     │
//!     ├──> Widening
//!     │    ├─> leaves of the node nearest the selection
//!     │    ├─> + preceding / following siblings
//!     │    └─> climb to the parent while under budget (bounded by max_climb_depth)
//!     │
//!     └──> Radius search
//!          ├─> pivot = middle leaf intersecting the selection
//!          ├─> binary search over symmetric radius n
//!          └─> largest n with words(window) <= budget (else pivot alone)
//! ```
//!
//! Only the final level's leaf sequence is searched. A narrower level that fit more
//! words is discarded once the finder climbs past it, so the result is maximal within
//! that final level, not across all levels.
//!
//! ## Example
//!
//! ```rust
//! use sidechat_context_window::{ContextWindowFinder, FinderConfig};
//! use sidechat_document::DocumentTree;
//!
//! let tree = DocumentTree::from_outline("The\nquick\nbrown\nfox\njumps\n");
//! let selection = tree.find("brown").unwrap();
//!
//! let finder = ContextWindowFinder::new(FinderConfig::with_budget(3)).unwrap();
//! let window = finder.find(&tree, &selection);
//! assert_eq!(window.text, "quick brown fox");
//! assert_eq!(window.radius, 1);
//! ```

mod config;
mod error;
mod finder;
mod window;

pub use config::FinderConfig;
pub use error::{ContextWindowError, Result};
pub use finder::{search_radius, widen, ContextWindowFinder};
pub use window::ContextWindow;
