use crate::error::{Result, SessionError};
use crate::instance::{Layer, WidgetId, WidgetInstance, WidgetState};
use sidechat_highlight::{HighlightBackend, HighlightCoordinator, HighlightError};

/// Live panels in back-to-front order; the last entry is the most recently focused.
///
/// Every focus change goes through [`WidgetRegistry::bring_to_front`], the only code
/// path that marks a handle selected.
#[derive(Debug, Default)]
pub struct WidgetRegistry {
    widgets: Vec<WidgetInstance>,
    next_id: u64,
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn allocate_id(&mut self) -> WidgetId {
        let id = WidgetId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Add a panel, then focus it. A panel whose handle the coordinator does not know is
    /// rejected before anything else changes.
    pub fn register<B: HighlightBackend>(
        &mut self,
        instance: WidgetInstance,
        highlights: &mut HighlightCoordinator<B>,
    ) -> Result<WidgetId> {
        if highlights.selection(instance.handle).is_none() {
            return Err(HighlightError::UnknownHandle(instance.handle).into());
        }
        let id = instance.id;
        self.widgets.push(instance);
        self.bring_to_front(id, highlights)?;
        log::info!("Opened {id} ({} live)", self.widgets.len());
        Ok(id)
    }

    pub fn get(&self, id: WidgetId) -> Option<&WidgetInstance> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: WidgetId) -> Option<&mut WidgetInstance> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.get(id).is_some()
    }

    /// Back-to-front
    pub fn iter(&self) -> impl Iterator<Item = &WidgetInstance> {
        self.widgets.iter()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// The expanded panel on the top layer, if any
    pub fn focused(&self) -> Option<WidgetId> {
        self.widgets
            .iter()
            .rev()
            .find(|w| w.layer == Layer::Top && w.is_expanded())
            .map(|w| w.id)
    }

    fn position(&self, id: WidgetId) -> Result<usize> {
        self.widgets
            .iter()
            .position(|w| w.id == id)
            .ok_or(SessionError::UnknownWidget(id))
    }

    /// Focus `id`: every other panel drops to the base layer and loses selection and
    /// context; `id` moves to the top layer, becomes selected and shows its context.
    pub fn bring_to_front<B: HighlightBackend>(
        &mut self,
        id: WidgetId,
        highlights: &mut HighlightCoordinator<B>,
    ) -> Result<()> {
        let idx = self.position(id)?;
        let target = self.widgets.remove(idx);
        self.widgets.push(target);

        let last = self.widgets.len() - 1;
        let (others, target) = self.widgets.split_at_mut(last);
        for other in others.iter_mut() {
            other.layer = Layer::Base;
            highlights.mark_as_non_selected(other.handle)?;
            highlights.clear_context_highlights(other.handle);
        }

        let target = &mut target[0];
        target.layer = Layer::Top;
        target.state = WidgetState::Expanded;
        highlights.mark_as_selected(target.handle)?;
        highlights.set_context_ranges(target.handle, &target.context.leaves)?;
        log::debug!("Focused {id}");
        Ok(())
    }

    /// Hide the panel behind its launcher icon; it stays registered
    pub fn collapse<B: HighlightBackend>(
        &mut self,
        id: WidgetId,
        highlights: &mut HighlightCoordinator<B>,
    ) -> Result<()> {
        let widget = self.get_mut(id).ok_or(SessionError::UnknownWidget(id))?;
        widget.state = WidgetState::Collapsed;
        widget.layer = Layer::Base;
        highlights.mark_as_non_selected(widget.handle)?;
        highlights.clear_context_highlights(widget.handle);
        log::info!("Collapsed {id}");
        Ok(())
    }

    /// Re-open a collapsed panel from its icon
    pub fn expand<B: HighlightBackend>(
        &mut self,
        id: WidgetId,
        highlights: &mut HighlightCoordinator<B>,
    ) -> Result<()> {
        self.bring_to_front(id, highlights)?;
        log::info!("Expanded {id}");
        Ok(())
    }

    /// Drop every panel to the base layer without selecting another one
    pub fn blur_all<B: HighlightBackend>(
        &mut self,
        highlights: &mut HighlightCoordinator<B>,
    ) -> Result<()> {
        for widget in &mut self.widgets {
            widget.layer = Layer::Base;
            highlights.mark_as_non_selected(widget.handle)?;
            highlights.clear_context_highlights(widget.handle);
        }
        Ok(())
    }

    /// Terminate the panel: release its handle and in-flight slot, then forget it.
    ///
    /// No other panel is re-selected.
    pub fn close<B: HighlightBackend>(
        &mut self,
        id: WidgetId,
        highlights: &mut HighlightCoordinator<B>,
    ) -> Result<WidgetInstance> {
        let idx = self.position(id)?;
        let mut widget = self.widgets.remove(idx);
        highlights.remove_handle(widget.handle);
        widget.conversation.cancel();
        log::info!("Closed {id} ({} live)", self.widgets.len());
        Ok(widget)
    }
}
