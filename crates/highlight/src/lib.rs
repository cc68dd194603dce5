//! # Sidechat Highlight
//!
//! Three shared highlight buckets and the state transitions every panel goes through.
//!
//! ## Architecture
//!
//! ```text
//! HighlightCoordinator
//!     ├─ Selected     (≤ 1 handle: the focused panel's selection)
//!     ├─ NonSelected  (selections of unfocused / collapsed panels)
//!     ├─ Context      (surrounding leaves of the focused panel, minus its selection)
//!     │
//!     └──> HighlightBackend::sync(role, ranges)   ← host paints the ranges
//! ```
//!
//! Panels never touch the buckets directly. They hold a [`HandleId`] issued by the
//! coordinator, and the coordinator is owned by the session that owns the panels.

mod backend;
mod bucket;
mod coordinator;
mod error;

pub use backend::{HighlightBackend, HighlightRole, NullBackend, RecordingBackend};
pub use bucket::HighlightBucket;
pub use coordinator::{HandleId, HighlightCoordinator, HighlightSnapshot};
pub use error::{HighlightError, Result};
