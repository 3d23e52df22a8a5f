//! Field reconciler: strict DOM-over-scanner priority per field.

use crate::types::{CandidateSet, FieldCandidate, FieldKind, FieldValues, Source};

/// Merge DOM values with scanner candidates.
///
/// Per field: the DOM value when non-empty, else the scanner's first
/// candidate, else empty. Values are never blended.
#[must_use]
pub fn reconcile(dom: &FieldValues, scan: &CandidateSet) -> FieldValues {
    let mut out = FieldValues::default();
    for kind in FieldKind::ALL {
        if let Some(chosen) = winner(kind, dom, scan) {
            out.set(kind, chosen.text);
        }
    }
    out
}

/// The candidate [`reconcile`] keeps for `kind`, if any.
#[must_use]
pub fn winner(kind: FieldKind, dom: &FieldValues, scan: &CandidateSet) -> Option<FieldCandidate> {
    let scanned = scan.first(kind);
    let dom_value = dom.get(kind);
    if dom_value.is_empty() {
        return scanned.cloned();
    }

    if let Some(other) = scanned.filter(|c| c.text != dom_value) {
        tracing::info!(field = %kind, dom = dom_value, scan = %other.text, "sources disagree; keeping dom value");
    }
    Some(FieldCandidate {
        kind,
        source: Source::Dom,
        text: dom_value.to_string(),
    })
}
