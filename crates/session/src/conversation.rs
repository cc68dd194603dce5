use crate::instance::WidgetId;
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    User,
    Assistant,
    /// Terminal transport failure shown inline in the panel
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Transcript and request gate of one panel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    id: String,
    transcript: Vec<ChatMessage>,
    in_flight: bool,
    /// The last transcript entry is the reply currently streaming in
    reply_open: bool,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            transcript: Vec::new(),
            in_flight: false,
            reply_open: false,
        }
    }

    /// Fresh conversation with a random opaque id
    pub fn start(widget: WidgetId) -> Self {
        Self::new(new_conversation_id(widget))
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Record the user's prompt and take the in-flight slot.
    ///
    /// Returns false, changing nothing, if a request is already outstanding.
    pub fn begin(&mut self, prompt: &str) -> bool {
        if self.in_flight {
            return false;
        }
        self.transcript.push(ChatMessage::new(ChatRole::User, prompt));
        self.in_flight = true;
        self.reply_open = false;
        true
    }

    pub fn push_fragment(&mut self, fragment: &str) {
        if !self.in_flight {
            log::warn!("Dropping fragment for idle conversation {}", self.id);
            return;
        }
        if self.reply_open {
            if let Some(last) = self.transcript.last_mut() {
                last.content.push_str(fragment);
                return;
            }
        }
        self.transcript
            .push(ChatMessage::new(ChatRole::Assistant, fragment));
        self.reply_open = true;
    }

    pub fn complete(&mut self) {
        self.in_flight = false;
        self.reply_open = false;
    }

    /// Append the failure to the transcript and free the slot for a retry
    pub fn fail(&mut self, message: &str) {
        self.transcript
            .push(ChatMessage::new(ChatRole::Error, message));
        self.in_flight = false;
        self.reply_open = false;
    }

    /// Release the in-flight slot without touching the transcript
    pub fn cancel(&mut self) {
        self.in_flight = false;
        self.reply_open = false;
    }

    /// Messages sent before the newest user prompt, errors excluded
    pub fn history(&self) -> Vec<ChatMessage> {
        let end = self
            .transcript
            .iter()
            .rposition(|m| m.role == ChatRole::User)
            .unwrap_or(self.transcript.len());
        self.transcript[..end]
            .iter()
            .filter(|m| m.role != ChatRole::Error)
            .cloned()
            .collect()
    }
}

fn new_conversation_id(widget: WidgetId) -> String {
    let mut bytes = [0u8; 8];
    match getrandom::getrandom(&mut bytes) {
        Ok(()) => {
            let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
            format!("conv-{hex}")
        }
        Err(err) => {
            log::warn!("No OS randomness for conversation id ({err}), using clock");
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos())
                .unwrap_or(0);
            format!("conv-{}-{nanos:x}", widget.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn second_begin_while_in_flight_is_ignored() {
        let mut conv = Conversation::new("c1");
        assert!(conv.begin("first"));
        assert!(!conv.begin("second"));
        assert_eq!(conv.transcript().len(), 1);
        assert!(conv.is_in_flight());
    }

    #[test]
    fn fragments_stream_into_one_reply() {
        let mut conv = Conversation::new("c1");
        conv.begin("question");
        conv.push_fragment("Hel");
        conv.push_fragment("lo");
        conv.complete();
        assert_eq!(
            conv.transcript(),
            &[
                ChatMessage::new(ChatRole::User, "question"),
                ChatMessage::new(ChatRole::Assistant, "Hello"),
            ]
        );
        assert!(!conv.is_in_flight());
    }

    #[test]
    fn failure_is_terminal_and_allows_retry() {
        let mut conv = Conversation::new("c1");
        conv.begin("question");
        conv.push_fragment("partial");
        conv.fail("connection reset");
        assert!(!conv.is_in_flight());
        assert_eq!(conv.transcript().last().unwrap().role, ChatRole::Error);
        assert!(conv.begin("again"));
    }

    #[test]
    fn fragments_after_completion_are_dropped() {
        let mut conv = Conversation::new("c1");
        conv.begin("q");
        conv.complete();
        conv.push_fragment("late");
        assert_eq!(conv.transcript().len(), 1);
    }

    #[test]
    fn history_excludes_newest_prompt_and_errors() {
        let mut conv = Conversation::new("c1");
        conv.begin("one");
        conv.push_fragment("answer one");
        conv.complete();
        conv.begin("two");
        conv.fail("boom");
        conv.begin("three");
        assert_eq!(
            conv.history(),
            vec![
                ChatMessage::new(ChatRole::User, "one"),
                ChatMessage::new(ChatRole::Assistant, "answer one"),
                ChatMessage::new(ChatRole::User, "two"),
            ]
        );
    }

    #[test]
    fn conversation_ids_are_distinct() {
        let a = Conversation::start(WidgetId(1));
        let b = Conversation::start(WidgetId(1));
        assert!(a.id().starts_with("conv-"));
        assert_ne!(a.id(), b.id());
    }
}
