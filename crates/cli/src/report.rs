use serde::Serialize;
use sidechat_context_window::ContextWindow;
use sidechat_highlight::{HighlightBackend, HighlightSnapshot};
use sidechat_session::{ChatMessage, ChatRole, Session, WidgetInstance, WidgetState};

#[derive(Debug, Serialize)]
pub struct ContextOutput {
    pub selection: String,
    pub budget: usize,
    pub window: ContextWindow,
}

#[derive(Debug, Serialize)]
pub struct PanelRow {
    pub id: u64,
    pub selected_text: String,
    pub state: WidgetState,
    pub z_index: u32,
    pub in_flight: bool,
    pub context_words: usize,
}

impl From<&WidgetInstance> for PanelRow {
    fn from(widget: &WidgetInstance) -> Self {
        Self {
            id: widget.id.0,
            selected_text: widget.selected_text.clone(),
            state: widget.state,
            z_index: widget.layer.z_index(),
            in_flight: widget.is_in_flight(),
            context_words: widget.context.word_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PanelsOutput {
    pub panels: Vec<PanelRow>,
    pub focused: Option<u64>,
    pub highlights: HighlightSnapshot,
}

impl PanelsOutput {
    pub fn capture<B: HighlightBackend>(session: &Session<B>) -> Self {
        Self {
            panels: session.widgets().map(PanelRow::from).collect(),
            focused: session.focused().map(|id| id.0),
            highlights: session.highlights().snapshot(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AskOutput {
    pub conversation_id: String,
    pub system_context: String,
    pub transcript: Vec<ChatMessage>,
}

pub fn render_context(out: &ContextOutput) -> String {
    let window = &out.window;
    if window.is_empty() {
        return format!("No context found for '{}'\n", out.selection);
    }
    let mut text = format!(
        "{} words from {} leaves (budget {}, radius {}, climbed {})\n",
        window.word_count,
        window.len(),
        out.budget,
        window.radius,
        window.levels_climbed
    );
    if window.over_budget {
        text.push_str("warning: the selected leaf alone exceeds the budget\n");
    }
    text.push('\n');
    text.push_str(&window.text);
    text.push('\n');
    text
}

pub fn render_panels(out: &PanelsOutput) -> String {
    let mut text = String::new();
    if out.panels.is_empty() {
        text.push_str("No live panels\n");
    }
    for panel in &out.panels {
        let marker = if Some(panel.id) == out.focused { "*" } else { " " };
        text.push_str(&format!(
            "{marker} widget#{} [{}] z={} context={}w  {}\n",
            panel.id,
            format!("{:?}", panel.state).to_lowercase(),
            panel.z_index,
            panel.context_words,
            truncate_one_line(&panel.selected_text, 60),
        ));
    }

    let handles = |list: &[sidechat_highlight::HandleId]| {
        list.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    };
    text.push('\n');
    text.push_str(&format!("selected:     [{}]\n", handles(&out.highlights.selected)));
    text.push_str(&format!(
        "non-selected: [{}]\n",
        handles(&out.highlights.non_selected)
    ));
    for (handle, ranges) in &out.highlights.context {
        text.push_str(&format!("context:      {handle} ({} ranges)\n", ranges.len()));
    }
    text
}

pub fn render_transcript(out: &AskOutput) -> String {
    let mut text = format!("# {}\n", out.conversation_id);
    for message in &out.transcript {
        let who = match message.role {
            ChatRole::User => "you",
            ChatRole::Assistant => "assistant",
            ChatRole::Error => "error",
        };
        text.push_str(&format!("{who}> {}\n", message.content));
    }
    text
}

fn truncate_one_line(input: &str, max_chars: usize) -> String {
    let line = input.split_whitespace().collect::<Vec<_>>().join(" ");
    if line.chars().count() <= max_chars {
        return line;
    }
    let mut out: String = line.chars().take(max_chars.saturating_sub(3)).collect();
    out.push_str("...");
    out
}
