use crate::leaf::TextLeaf;

/// Count words: maximal runs of non-whitespace characters
#[must_use]
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Join leaf texts with a single space, each trimmed; blank leaves are skipped
#[must_use]
pub fn join_leaves(leaves: &[TextLeaf]) -> String {
    leaves
        .iter()
        .filter(|leaf| !leaf.is_blank())
        .map(|leaf| leaf.text.trim())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Word count of the space-joined leaves.
///
/// Joining with whitespace never merges two tokens, so summing per leaf gives the same
/// answer as counting the joined string.
#[must_use]
pub fn leaves_word_count(leaves: &[TextLeaf]) -> usize {
    leaves.iter().map(TextLeaf::word_count).sum()
}
