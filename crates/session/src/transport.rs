use crate::conversation::ChatMessage;
use crate::instance::WidgetId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// Everything the external transport needs for one reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Originating panel; replies are addressed back to it
    pub widget: WidgetId,
    pub conversation_id: String,
    pub model: String,
    pub prompt: String,
    pub system_context: String,
    pub max_tokens: usize,
    /// Earlier turns of this conversation
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum TransportEventKind {
    Fragment(String),
    Completed,
    Failed(String),
}

/// A transport event addressed to one panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportEvent {
    pub widget: WidgetId,
    pub kind: TransportEventKind,
}

/// Send side handed to a transport while it streams one reply
#[derive(Debug, Clone)]
pub struct FragmentSink {
    widget: WidgetId,
    events: UnboundedSender<TransportEvent>,
}

impl FragmentSink {
    pub fn new(widget: WidgetId, events: UnboundedSender<TransportEvent>) -> Self {
        Self { widget, events }
    }

    /// Forward one content fragment. Returns false once the session stopped listening.
    pub fn fragment(&self, text: impl Into<String>) -> bool {
        self.emit(TransportEventKind::Fragment(text.into()))
    }

    fn emit(&self, kind: TransportEventKind) -> bool {
        self.events
            .send(TransportEvent {
                widget: self.widget,
                kind,
            })
            .is_ok()
    }
}

/// Language-model backend.
///
/// Implementations push fragments into `sink` and return once the reply is complete.
/// The terminal event (completed or failed) is emitted by [`dispatch`] from the result,
/// so exactly one of them follows the fragments.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn stream(&self, request: &ChatRequest, sink: &FragmentSink) -> anyhow::Result<()>;
}

/// Run `request` on the tokio runtime, forwarding its events into `events`
pub fn dispatch<T>(
    transport: Arc<T>,
    request: ChatRequest,
    events: UnboundedSender<TransportEvent>,
) -> JoinHandle<()>
where
    T: ChatTransport + ?Sized + 'static,
{
    tokio::spawn(async move {
        let sink = FragmentSink::new(request.widget, events);
        let terminal = match transport.stream(&request, &sink).await {
            Ok(()) => TransportEventKind::Completed,
            Err(err) => {
                log::warn!("Transport failed for {}: {err:#}", request.widget);
                TransportEventKind::Failed(format!("{err:#}"))
            }
        };
        if !sink.emit(terminal) {
            log::debug!("Session gone before {} finished", request.widget);
        }
    })
}

/// Replays canned fragments; optionally fails after them
#[derive(Debug, Clone, Default)]
pub struct ScriptedTransport {
    fragments: Vec<String>,
    failure: Option<String>,
}

impl ScriptedTransport {
    pub fn new<I, S>(fragments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fragments: fragments.into_iter().map(Into::into).collect(),
            failure: None,
        }
    }

    #[must_use]
    pub fn failing_with(mut self, message: impl Into<String>) -> Self {
        self.failure = Some(message.into());
        self
    }
}

#[async_trait]
impl ChatTransport for ScriptedTransport {
    async fn stream(&self, _request: &ChatRequest, sink: &FragmentSink) -> anyhow::Result<()> {
        for fragment in &self.fragments {
            if !sink.fragment(fragment.clone()) {
                break;
            }
            tokio::task::yield_now().await;
        }
        match &self.failure {
            Some(message) => Err(anyhow::anyhow!("{message}")),
            None => Ok(()),
        }
    }
}
