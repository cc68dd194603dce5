use sidechat_context_window::ContextWindow;

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a reading assistant. The user highlighted a passage \
in a document and is asking about it. Answer concisely and ground your answer in the passage.\n\n\
Highlighted passage:\n{selection}\n\n\
Surrounding context:\n{context}";

const NO_CONTEXT: &str = "(no surrounding context available)";

const SELECTION_SLOT: &str = "{selection}";
const CONTEXT_SLOT: &str = "{context}";

/// Fill the `{selection}` and `{context}` placeholders of `template`.
///
/// The template is scanned once, so placeholder-like text inside the substituted values
/// stays literal. An empty window grounds the conversation on the highlighted text alone.
pub fn render_system_context(template: &str, selected_text: &str, window: &ContextWindow) -> String {
    let context = if window.is_empty() {
        NO_CONTEXT
    } else {
        window.text.as_str()
    };
    let selection = selected_text.trim();

    let mut out = String::with_capacity(template.len() + selection.len() + context.len());
    let mut rest = template;
    loop {
        let next = [(SELECTION_SLOT, selection), (CONTEXT_SLOT, context)]
            .into_iter()
            .filter_map(|(slot, value)| rest.find(slot).map(|at| (at, slot, value)))
            .min_by_key(|(at, _, _)| *at);
        let Some((at, slot, value)) = next else {
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..at]);
        out.push_str(value);
        rest = &rest[at + slot.len()..];
    }
}
