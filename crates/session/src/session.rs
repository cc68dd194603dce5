use crate::config::SessionConfig;
use crate::conversation::Conversation;
use crate::error::{Result, SessionError};
use crate::instance::{Layer, WidgetId, WidgetInstance, WidgetState};
use crate::prompt::render_system_context;
use crate::registry::WidgetRegistry;
use crate::transport::{ChatRequest, TransportEvent, TransportEventKind};
use sidechat_context_window::{ContextWindow, ContextWindowFinder, FinderConfig};
use sidechat_document::{SelectionRange, TreeCursor};
use sidechat_highlight::{HighlightBackend, HighlightCoordinator, NullBackend};
use tokio::sync::mpsc::UnboundedReceiver;

/// Top-level owner of one page's panels.
///
/// Holds the configuration, the context finder, the highlight buckets and the panel
/// registry. Nothing here is global: two sessions never share highlight state.
pub struct Session<B: HighlightBackend> {
    config: SessionConfig,
    finder: ContextWindowFinder,
    highlights: HighlightCoordinator<B>,
    registry: WidgetRegistry,
}

impl Session<NullBackend> {
    /// Session for hosts without a highlighting mechanism; panels still work
    pub fn without_highlights(config: SessionConfig) -> Result<Self> {
        log::warn!("Highlighting unavailable, panels will not paint the document");
        Self::new(config, NullBackend)
    }
}

impl<B: HighlightBackend> Session<B> {
    /// Fails with a capability-missing error if `backend` cannot register a highlight role
    pub fn new(config: SessionConfig, backend: B) -> Result<Self> {
        config.validate()?;
        let finder = ContextWindowFinder::new(config.finder_config())?;
        let highlights = HighlightCoordinator::new(backend, config.show_context_highlights)?;
        log::debug!(
            "Session ready (budget {}, climb {}, context highlights {})",
            config.context_word_budget,
            config.max_climb_depth,
            config.show_context_highlights
        );
        Ok(Self {
            config,
            finder,
            highlights,
            registry: WidgetRegistry::new(),
        })
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn highlights(&self) -> &HighlightCoordinator<B> {
        &self.highlights
    }

    pub fn registry(&self) -> &WidgetRegistry {
        &self.registry
    }

    /// Live panels, back to front
    pub fn widgets(&self) -> impl Iterator<Item = &WidgetInstance> {
        self.registry.iter()
    }

    pub fn widget(&self, id: WidgetId) -> Option<&WidgetInstance> {
        self.registry.get(id)
    }

    pub fn focused(&self) -> Option<WidgetId> {
        self.registry.focused()
    }

    /// Context window for `selection` with the configured budget
    pub fn extract_context<C: TreeCursor>(
        &self,
        cursor: &C,
        selection: &SelectionRange,
    ) -> ContextWindow {
        self.finder.find(cursor, selection)
    }

    /// Context window for `selection` with an explicit word budget
    pub fn extract_context_with_budget<C: TreeCursor>(
        &self,
        cursor: &C,
        selection: &SelectionRange,
        word_budget: usize,
    ) -> Result<ContextWindow> {
        let finder = ContextWindowFinder::new(FinderConfig {
            word_budget,
            ..*self.finder.config()
        })?;
        Ok(finder.find(cursor, selection))
    }

    /// Register a panel for an already extracted window and focus it. The panel's text
    /// is read from `cursor` so it always matches `selection`.
    pub fn create_widget<C: TreeCursor>(
        &mut self,
        cursor: &C,
        selection: SelectionRange,
        context: ContextWindow,
    ) -> Result<WidgetId> {
        let id = self.registry.allocate_id();
        let handle = self.highlights.create_handle(selection);
        if context.is_empty() {
            log::debug!("{id} opens without surrounding context");
        }
        let instance = WidgetInstance {
            id,
            selection,
            selected_text: cursor.selection_text(&selection),
            context,
            handle,
            state: WidgetState::Expanded,
            layer: Layer::Base,
            conversation: Conversation::start(id),
        };
        self.registry.register(instance, &mut self.highlights)
    }

    /// Extract the context for `selection`, then create a panel for it
    pub fn open_widget<C: TreeCursor>(
        &mut self,
        cursor: &C,
        selection: SelectionRange,
    ) -> Result<WidgetId> {
        let window = self.extract_context(cursor, &selection);
        self.create_widget(cursor, selection, window)
    }

    /// Bring a panel to the front, expanding it if collapsed
    pub fn focus(&mut self, id: WidgetId) -> Result<()> {
        self.registry.bring_to_front(id, &mut self.highlights)
    }

    pub fn collapse(&mut self, id: WidgetId) -> Result<()> {
        self.registry.collapse(id, &mut self.highlights)
    }

    pub fn expand(&mut self, id: WidgetId) -> Result<()> {
        self.registry.expand(id, &mut self.highlights)
    }

    /// Terminate a panel; the remaining ones stay unselected until focused explicitly
    pub fn close(&mut self, id: WidgetId) -> Result<WidgetInstance> {
        self.registry.close(id, &mut self.highlights)
    }

    /// Click outside every panel
    pub fn blur_all(&mut self) -> Result<()> {
        self.registry.blur_all(&mut self.highlights)
    }

    /// Toggle context painting. Enabling re-applies the focused panel's context.
    pub fn set_show_context(&mut self, enabled: bool) -> Result<()> {
        self.config.show_context_highlights = enabled;
        self.highlights.set_show_context(enabled);
        if enabled {
            if let Some(widget) = self.focused().and_then(|id| self.registry.get(id)) {
                self.highlights
                    .set_context_ranges(widget.handle, &widget.context.leaves)?;
            }
        }
        Ok(())
    }

    /// Recompute a panel's window after the document changed
    pub fn refresh_context<C: TreeCursor>(&mut self, id: WidgetId, cursor: &C) -> Result<()> {
        let focused = self.focused() == Some(id);
        let widget = self
            .registry
            .get_mut(id)
            .ok_or(SessionError::UnknownWidget(id))?;
        widget.context = self.finder.find(cursor, &widget.selection);
        log::debug!(
            "Refreshed {id}: {} leaves, {} words",
            widget.context.len(),
            widget.context.word_count
        );
        if focused {
            self.highlights
                .set_context_ranges(widget.handle, &widget.context.leaves)?;
        }
        Ok(())
    }

    /// Start a request from panel `id`.
    ///
    /// Returns `Ok(None)` without queueing anything when the panel already has a request
    /// outstanding or the prompt is blank.
    pub fn submit(&mut self, id: WidgetId, prompt: &str) -> Result<Option<ChatRequest>> {
        let widget = self
            .registry
            .get_mut(id)
            .ok_or(SessionError::UnknownWidget(id))?;

        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Ok(None);
        }
        if !widget.conversation.begin(prompt) {
            log::debug!("{id} already has a request in flight, ignoring submit");
            return Ok(None);
        }

        let request = ChatRequest {
            widget: id,
            conversation_id: widget.conversation.id().to_string(),
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            system_context: render_system_context(
                &self.config.system_prompt,
                &widget.selected_text,
                &widget.context,
            ),
            max_tokens: self.config.max_response_tokens,
            history: widget.conversation.history(),
        };
        log::info!("Submitted prompt from {id}");
        Ok(Some(request))
    }

    /// Apply one transport event. Returns false when its panel is gone.
    pub fn deliver(&mut self, event: TransportEvent) -> bool {
        let Some(widget) = self.registry.get_mut(event.widget) else {
            log::debug!("Ignoring {:?} for closed {}", event.kind, event.widget);
            return false;
        };
        match event.kind {
            TransportEventKind::Fragment(text) => widget.conversation.push_fragment(&text),
            TransportEventKind::Completed => {
                widget.conversation.complete();
                log::debug!("Reply completed for {}", event.widget);
            }
            TransportEventKind::Failed(message) => {
                widget.conversation.fail(&message);
                log::warn!("Reply failed for {}: {message}", event.widget);
            }
        }
        true
    }

    /// Apply every event already queued on `events`; returns how many reached a panel
    pub fn pump(&mut self, events: &mut UnboundedReceiver<TransportEvent>) -> usize {
        let mut applied = 0;
        while let Ok(event) = events.try_recv() {
            if self.deliver(event) {
                applied += 1;
            }
        }
        applied
    }

    /// Apply events until panel `id` receives its terminal event or the channel closes
    pub async fn await_reply(
        &mut self,
        events: &mut UnboundedReceiver<TransportEvent>,
        id: WidgetId,
    ) {
        while let Some(event) = events.recv().await {
            let terminal = event.widget == id
                && matches!(
                    event.kind,
                    TransportEventKind::Completed | TransportEventKind::Failed(_)
                );
            self.deliver(event);
            if terminal {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sidechat_document::DocumentTree;
    use sidechat_highlight::RecordingBackend;

    fn tree() -> DocumentTree {
        DocumentTree::from_outline(
            "# Intro\nFirst line here\nSecond line there\n\n# Body\nThird line below\n",
        )
    }

    fn session() -> Session<RecordingBackend> {
        Session::new(SessionConfig::default(), RecordingBackend::new()).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = SessionConfig {
            context_word_budget: 0,
            ..Default::default()
        };
        let err = Session::new(config, RecordingBackend::new()).err().unwrap();
        assert!(matches!(err, SessionError::ContextWindow(_) | SessionError::InvalidConfig(_)));
    }

    #[test]
    fn new_widget_is_focused_and_painted() {
        let tree = tree();
        let mut session = session();
        let selection = tree.find("Second").unwrap();
        let id = session.open_widget(&tree, selection).unwrap();

        let widget = session.widget(id).unwrap();
        assert_eq!(widget.selected_text, "Second");
        assert_eq!(widget.layer, Layer::Top);
        assert!(session.highlights().is_selected(widget.handle));
        assert!(session.highlights().has_context(widget.handle));
    }

    #[test]
    fn explicit_budget_overrides_config() {
        let tree = tree();
        let session = session();
        let selection = tree.find("Second").unwrap();
        let window = session
            .extract_context_with_budget(&tree, &selection, 3)
            .unwrap();
        assert_eq!(window.text, "Second line there");
        assert!(session
            .extract_context_with_budget(&tree, &selection, 0)
            .is_err());
    }

    #[test]
    fn unknown_widget_is_an_error() {
        let mut session = session();
        assert!(matches!(
            session.focus(WidgetId(42)),
            Err(SessionError::UnknownWidget(WidgetId(42)))
        ));
        assert!(session.submit(WidgetId(42), "hi").is_err());
    }

    #[test]
    fn blank_prompt_is_not_submitted() {
        let tree = tree();
        let mut session = session();
        let id = session
            .open_widget(&tree, tree.find("Third").unwrap())
            .unwrap();
        assert_eq!(session.submit(id, "   ").unwrap(), None);
        assert!(!session.widget(id).unwrap().is_in_flight());
    }

    #[test]
    fn refresh_recomputes_window() {
        let tree = tree();
        let mut session = session();
        let selection = tree.find("Third").unwrap();
        let id = session
            .create_widget(&tree, selection, ContextWindow::empty())
            .unwrap();
        assert!(!session.highlights().has_context(session.widget(id).unwrap().handle));
        assert_eq!(session.widget(id).unwrap().selected_text, "Third");

        session.refresh_context(id, &tree).unwrap();
        let widget = session.widget(id).unwrap();
        assert!(!widget.context.is_empty());
        assert!(session.highlights().has_context(widget.handle));
    }
}
