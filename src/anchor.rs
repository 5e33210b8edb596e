//! Anchor resolution: which DOM node does a TOC entry start at?
//!
//! Resolution is a fixed, priority-ordered list of [`AnchorStrategy`]
//! values. Each strategy is tried on its own and yields at most one node; the
//! slicer consumes the resulting candidate list and takes the first node no
//! earlier entry has claimed.

use crate::dom::{ArenaNodeId, Document};
use crate::path::normalize_fragment;

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// One way of locating an entry's start node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorStrategy {
    /// `id` equal to the fragment as written (EPUB ids are case-sensitive).
    ExactId,
    /// Legacy `<a name="...">` equal to the fragment as written.
    ExactName,
    /// `id` or `name` equal after decoding and lower-casing both sides.
    NormalizedIdOrName,
    /// The whole `<body>`, for the first entry of a resource.
    DocumentBody,
    /// The Nth heading, N being the entry's position within its resource.
    NthHeading,
    /// The Nth element child of `<body>`.
    NthBodyChild,
}

const FRAGMENT_STRATEGIES: &[AnchorStrategy] = &[
    AnchorStrategy::ExactId,
    AnchorStrategy::ExactName,
    AnchorStrategy::NormalizedIdOrName,
];

const FIRST_ENTRY_FALLBACKS: &[AnchorStrategy] = &[AnchorStrategy::DocumentBody];

const LATER_ENTRY_FALLBACKS: &[AnchorStrategy] =
    &[AnchorStrategy::NthHeading, AnchorStrategy::NthBodyChild];

/// What is known about an entry when resolving its anchor.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnchorQuery<'a> {
    /// Normalized fragment.
    pub fragment: Option<&'a str>,
    /// Fragment as written.
    pub fragment_original: Option<&'a str>,
    /// Index of the entry among the entries pointing at the same resource.
    pub position: usize,
}

impl AnchorStrategy {
    /// Apply this strategy alone.
    pub fn resolve(self, doc: &Document, query: &AnchorQuery<'_>) -> Option<ArenaNodeId> {
        let dom = doc.dom();
        match self {
            AnchorStrategy::ExactId => {
                let original = query.fragment_original?;
                dom.get_by_id(original).filter(|&id| doc.is_attached(id))
            }
            AnchorStrategy::ExactName => {
                let original = query.fragment_original?;
                doc.elements()
                    .find(|&id| dom.get_attr(id, "name") == Some(original))
            }
            AnchorStrategy::NormalizedIdOrName => {
                let fragment = query.fragment?;
                doc.elements().find(|&id| {
                    ["id", "name"].iter().any(|attr| {
                        dom.get_attr(id, attr)
                            .and_then(normalize_fragment)
                            .is_some_and(|value| value == fragment)
                    })
                })
            }
            AnchorStrategy::DocumentBody => Some(doc.content_root()),
            AnchorStrategy::NthHeading => doc
                .elements()
                .filter(|&id| {
                    dom.element_name(id)
                        .is_some_and(|name| HEADINGS.contains(&name.as_ref()))
                })
                .nth(query.position),
            AnchorStrategy::NthBodyChild => dom
                .element_children(doc.content_root())
                .nth(query.position),
        }
    }
}

/// All candidate start nodes for an entry, best first, without duplicates.
///
/// Fragment matches come first. Positional fallbacks are only consulted when
/// the entry has no fragment or nothing matched it.
pub fn anchor_candidates(
    doc: &Document,
    query: &AnchorQuery<'_>,
) -> Vec<(AnchorStrategy, ArenaNodeId)> {
    let mut candidates = Vec::new();
    collect(doc, query, FRAGMENT_STRATEGIES, &mut candidates);

    if candidates.is_empty() {
        let fallbacks = if query.position == 0 {
            FIRST_ENTRY_FALLBACKS
        } else {
            LATER_ENTRY_FALLBACKS
        };
        collect(doc, query, fallbacks, &mut candidates);
    }
    candidates
}

fn collect(
    doc: &Document,
    query: &AnchorQuery<'_>,
    strategies: &[AnchorStrategy],
    out: &mut Vec<(AnchorStrategy, ArenaNodeId)>,
) {
    for &strategy in strategies {
        if let Some(node) = strategy.resolve(doc, query)
            && !out.iter().any(|&(_, existing)| existing == node)
        {
            out.push((strategy, node));
        }
    }
}

/// The best start node for an entry, ignoring what other entries claimed.
pub fn resolve_anchor(doc: &Document, query: &AnchorQuery<'_>) -> Option<ArenaNodeId> {
    anchor_candidates(doc, query)
        .first()
        .map(|&(_, node)| node)
}
