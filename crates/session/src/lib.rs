//! # Sidechat Session
//!
//! Floating chat panels anchored to document selections.
//!
//! ## Architecture
//!
//! ```text
//! Session
//!     ├─ SessionConfig          (budget, climb depth, show-context, model)
//!     ├─ ContextWindowFinder    (surrounding context per selection)
//!     ├─ HighlightCoordinator   (selected / non-selected / context buckets)
//!     └─ WidgetRegistry         (live panels, focus, front-to-back order)
//!           └─ WidgetInstance
//!                 ├─ HandleId into the coordinator
//!                 ├─ ContextWindow
//!                 └─ Conversation (transcript + in-flight flag)
//!
//! submit() ──> ChatRequest ──> ChatTransport (async, external)
//!                                  └─ TransportEvent ──> Session::deliver()
//! ```
//!
//! Everything except the transport runs on the caller's thread. `bring_to_front` in the
//! registry is the only path that changes which handle is selected.
//!
//! ## Example
//!
//! ```rust
//! use sidechat_document::DocumentTree;
//! use sidechat_highlight::RecordingBackend;
//! use sidechat_session::{Session, SessionConfig};
//!
//! let tree = DocumentTree::from_outline("# Notes\nThe quick brown fox\njumps over the dog\n");
//! let mut session = Session::new(SessionConfig::default(), RecordingBackend::new()).unwrap();
//!
//! let selection = tree.find("brown fox").unwrap();
//! let id = session.open_widget(&tree, selection).unwrap();
//! assert_eq!(session.focused(), Some(id));
//! ```

mod config;
mod conversation;
mod error;
mod instance;
mod prompt;
mod registry;
mod session;
mod transport;

pub use config::SessionConfig;
pub use conversation::{ChatMessage, ChatRole, Conversation};
pub use error::{Result, SessionError};
pub use instance::{Layer, WidgetId, WidgetInstance, WidgetState};
pub use prompt::{render_system_context, DEFAULT_SYSTEM_PROMPT};
pub use registry::WidgetRegistry;
pub use session::Session;
pub use transport::{
    dispatch, ChatRequest, ChatTransport, FragmentSink, ScriptedTransport, TransportEvent,
    TransportEventKind,
};
