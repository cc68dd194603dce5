use pretty_assertions::assert_eq;
use sidechat_document::{LeafId, SelectionRange, TextLeaf};
use sidechat_highlight::{
    HandleId, HighlightBackend, HighlightCoordinator, HighlightError, HighlightRole,
    RecordingBackend, Result,
};

/// A host without any highlighting mechanism
struct NoHighlightApi;

impl HighlightBackend for NoHighlightApi {
    fn register(&mut self, role: HighlightRole) -> Result<()> {
        Err(HighlightError::capability_missing(format!(
            "cannot register {}",
            role.style_name()
        )))
    }

    fn sync(&mut self, _role: HighlightRole, _ranges: &[SelectionRange]) {}
}

#[test]
fn construction_fails_without_capability() {
    let err = HighlightCoordinator::new(NoHighlightApi, true).err();
    assert_eq!(
        err,
        Some(HighlightError::CapabilityMissing(
            "cannot register sidechat-selected".to_string()
        ))
    );
}

#[test]
fn boxed_backends_are_backends() {
    let backend: Box<dyn HighlightBackend> = Box::new(RecordingBackend::new());
    let mut coord = HighlightCoordinator::new(backend, true).unwrap();
    let h = coord.create_handle(SelectionRange::within_leaf(LeafId(0), 0, 1));
    coord.mark_as_selected(h).unwrap();
    assert_eq!(coord.selected_handle(), Some(h));
}

#[test]
fn selected_never_exceeds_one_handle() {
    let mut coord = HighlightCoordinator::new(RecordingBackend::new(), true).unwrap();
    let handles: Vec<HandleId> = (0..5)
        .map(|i| coord.create_handle(SelectionRange::within_leaf(LeafId(i), 0, 1)))
        .collect();

    // Deterministic interleaving of every operation
    for step in 0..60usize {
        let h = handles[(step * 7 + 3) % handles.len()];
        match step % 5 {
            0 | 3 => coord.mark_as_selected(h).unwrap(),
            1 => coord.mark_as_non_selected(h).unwrap(),
            2 => coord
                .set_context_ranges(h, &[TextLeaf::new(LeafId(99), "context words")])
                .unwrap(),
            _ => coord.clear_context_highlights(h),
        }
        assert!(coord.bucket(HighlightRole::Selected).len() <= 1, "step {step}");
        assert!(coord.backend().painted(HighlightRole::Selected).len() <= 1);
    }
}

#[test]
fn selected_and_non_selected_stay_disjoint() {
    let mut coord = HighlightCoordinator::new(RecordingBackend::new(), true).unwrap();
    let a = coord.create_handle(SelectionRange::within_leaf(LeafId(0), 0, 1));
    let b = coord.create_handle(SelectionRange::within_leaf(LeafId(1), 0, 1));

    coord.mark_as_selected(a).unwrap();
    coord.mark_as_selected(b).unwrap();
    coord.mark_as_selected(a).unwrap();

    let snapshot = coord.snapshot();
    assert_eq!(snapshot.selected, vec![a]);
    assert_eq!(snapshot.non_selected, vec![b]);
}
