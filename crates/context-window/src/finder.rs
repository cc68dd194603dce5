use crate::config::FinderConfig;
use crate::error::{ContextWindowError, Result};
use crate::window::ContextWindow;
use sidechat_document::{leaves_word_count, SelectionRange, TextLeaf, TreeCursor};

/// Budgeted context extraction around a selection
#[derive(Debug, Clone)]
pub struct ContextWindowFinder {
    config: FinderConfig,
}

impl ContextWindowFinder {
    /// Create a finder with a validated configuration
    pub fn new(config: FinderConfig) -> Result<Self> {
        config
            .validate()
            .map_err(ContextWindowError::invalid_config)?;
        Ok(Self { config })
    }

    #[must_use]
    pub const fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Compute the context window for `selection`.
    ///
    /// Returns an empty window when the selection does not touch any traversable leaf.
    pub fn find<C: TreeCursor>(&self, cursor: &C, selection: &SelectionRange) -> ContextWindow {
        let Some(start) = cursor.node_for_selection(selection) else {
            log::debug!("No node found for selection, context is empty");
            return ContextWindow::empty();
        };

        let (leaves, levels_climbed) = widen(
            cursor,
            start,
            self.config.word_budget,
            self.config.max_climb_depth,
        );

        let hits: Vec<usize> = leaves
            .iter()
            .enumerate()
            .filter(|(_, leaf)| cursor.intersects(leaf, selection))
            .map(|(idx, _)| idx)
            .collect();

        if hits.is_empty() {
            log::debug!(
                "Selection intersects none of {} candidate leaves, context is empty",
                leaves.len()
            );
            return ContextWindow::empty();
        }

        let pivot = hits[hits.len() / 2];
        let mut window = search_radius(leaves, pivot, self.config.word_budget);
        window.levels_climbed = levels_climbed;
        window
    }
}

/// Leaves of `node` with all preceding and following siblings' leaves around them
fn widen_level<C: TreeCursor>(cursor: &C, node: &C::Node) -> Vec<TextLeaf> {
    let mut leaves = Vec::new();
    for sibling in cursor.previous_siblings(node) {
        leaves.extend(cursor.leaves(&sibling));
    }
    leaves.extend(cursor.leaves(node));
    for sibling in cursor.next_siblings(node) {
        leaves.extend(cursor.leaves(&sibling));
    }
    leaves
}

/// Widen from `start`, climbing one ancestor at a time while the collected leaves stay
/// under `budget` and fewer than `max_climb` levels have been climbed.
///
/// Each climb replaces the previous leaf set. Returns the final set and the number of
/// levels climbed.
pub fn widen<C: TreeCursor>(
    cursor: &C,
    start: C::Node,
    budget: usize,
    max_climb: usize,
) -> (Vec<TextLeaf>, usize) {
    let mut node = start;
    let mut leaves = widen_level(cursor, &node);
    let mut climbed = 0;

    while climbed < max_climb && leaves_word_count(&leaves) < budget {
        let Some(parent) = cursor.parent(&node) else {
            break;
        };
        node = parent;
        leaves = widen_level(cursor, &node);
        climbed += 1;
        log::debug!(
            "Climbed to level {climbed}: {} leaves, {} words",
            leaves.len(),
            leaves_word_count(&leaves)
        );
    }

    (leaves, climbed)
}

/// Largest symmetric window around `pivot` whose word count fits `budget`.
///
/// Word count is non-decreasing in the radius for a fixed sequence, so the radius is
/// found by binary search. If the pivot alone exceeds the budget the window is the
/// pivot leaf by itself, flagged `over_budget`.
#[must_use]
pub fn search_radius(leaves: Vec<TextLeaf>, pivot: usize, budget: usize) -> ContextWindow {
    if leaves.is_empty() || pivot >= leaves.len() {
        return ContextWindow::empty();
    }

    let last = leaves.len() - 1;
    let mut prefix = Vec::with_capacity(leaves.len() + 1);
    prefix.push(0usize);
    for leaf in &leaves {
        let total = prefix.last().copied().unwrap_or(0) + leaf.word_count();
        prefix.push(total);
    }
    let bounds = |radius: usize| (pivot.saturating_sub(radius), (pivot + radius).min(last));
    let words = |radius: usize| {
        let (lo, hi) = bounds(radius);
        prefix[hi + 1] - prefix[lo]
    };

    let mut low = 0usize;
    let mut high = pivot.max(last - pivot);
    let mut best = None;
    while low <= high {
        let mid = low + (high - low) / 2;
        if words(mid) <= budget {
            best = Some(mid);
            low = mid + 1;
        } else if mid == 0 {
            break;
        } else {
            high = mid - 1;
        }
    }

    let pivot_id = leaves[pivot].id;
    match best {
        Some(radius) => {
            let (lo, hi) = bounds(radius);
            let count = words(radius);
            log::debug!("Context radius {radius}: {} leaves, {count} words", hi - lo + 1);
            let chosen = leaves.into_iter().skip(lo).take(hi - lo + 1).collect();
            ContextWindow::from_leaves(chosen, count, radius, pivot_id)
        }
        None => {
            let count = words(0);
            log::debug!("Pivot alone has {count} words (budget {budget}), using it anyway");
            let pivot_leaf = leaves.into_iter().nth(pivot).into_iter().collect();
            let mut window = ContextWindow::from_leaves(pivot_leaf, count, 0, pivot_id);
            window.over_budget = true;
            window
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sidechat_document::LeafId;

    fn leaves(texts: &[&str]) -> Vec<TextLeaf> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| TextLeaf::new(LeafId(i as u64), *t))
            .collect()
    }

    fn texts(window: &ContextWindow) -> Vec<&str> {
        window.leaves.iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn radius_search_scenario() {
        let window = search_radius(leaves(&["The", "quick", "brown", "fox", "jumps"]), 2, 3);
        assert_eq!(window.radius, 1);
        assert_eq!(texts(&window), vec!["quick", "brown", "fox"]);
        assert_eq!(window.word_count, 3);
        assert!(!window.over_budget);
    }

    #[test]
    fn prefers_largest_feasible_radius() {
        let seq = leaves(&["a", "b", "c", "d", "e", "f", "g"]);
        for budget in 1..=7 {
            let window = search_radius(seq.clone(), 3, budget);
            // Every radius r costs 2r+1 words here
            let expected = (budget - 1) / 2;
            assert_eq!(window.radius, expected, "budget {budget}");
            assert!(window.word_count <= budget);
        }
    }

    #[test]
    fn radius_clamps_at_sequence_edges() {
        let window = search_radius(leaves(&["one", "two", "three", "four"]), 0, 3);
        // radius 2 covers [0..=2]; radius 3 would cover all four
        assert_eq!(window.radius, 2);
        assert_eq!(texts(&window), vec!["one", "two", "three"]);
    }

    #[test]
    fn whole_sequence_when_budget_allows() {
        let window = search_radius(leaves(&["a b", "c", "d e f"]), 1, 100);
        assert_eq!(window.radius, 1);
        assert_eq!(window.word_count, 6);
        assert_eq!(window.text, "a b c d e f");
    }

    #[test]
    fn oversized_pivot_degrades_to_singleton() {
        let window = search_radius(leaves(&["x", "one two three four", "y"]), 1, 2);
        assert_eq!(texts(&window), vec!["one two three four"]);
        assert_eq!(window.radius, 0);
        assert_eq!(window.word_count, 4);
        assert!(window.over_budget);
        assert_eq!(window.pivot, Some(LeafId(1)));
    }

    #[test]
    fn empty_input_is_empty_window() {
        assert!(search_radius(Vec::new(), 0, 10).is_empty());
        assert!(search_radius(leaves(&["a"]), 3, 10).is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let err = ContextWindowFinder::new(FinderConfig::with_budget(0)).unwrap_err();
        assert!(matches!(err, ContextWindowError::InvalidConfig(_)));
    }
}
