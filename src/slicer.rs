//! Chapter slicing: carve one resource's DOM into per-entry HTML runs.
//!
//! Every TOC entry pointing at a resource gets a start node (see
//! [`crate::anchor`]). Start nodes are claimed in reading order so that two
//! entries naming the same anchor do not collide. Each slice is then the
//! document-order walk from its start node up to the next entry's start node.

use std::collections::HashSet;

use tracing::debug;

use crate::anchor::{AnchorQuery, anchor_candidates};
use crate::dom::{ArenaNodeId, Document, outer_html};
use crate::toc::TocNode;

/// The entries of one resource together with their resolved start nodes.
pub struct ResourceSlice<'a, 'b> {
    /// The parsed resource, or `None` if it could not be read.
    pub document: Option<&'a Document>,
    /// Entries pointing at this resource, sorted by `order`.
    pub nodes: Vec<&'a TocNode<'b>>,
    /// Start node per entry; same length as `nodes`.
    pub start_nodes: Vec<Option<ArenaNodeId>>,
}

impl<'a, 'b> ResourceSlice<'a, 'b> {
    pub fn new(document: Option<&'a Document>, mut nodes: Vec<&'a TocNode<'b>>) -> Self {
        nodes.sort_by_key(|node| node.order);

        let start_nodes = match document {
            Some(doc) => {
                let queries: Vec<_> = nodes
                    .iter()
                    .enumerate()
                    .map(|(position, node)| AnchorQuery {
                        fragment: node.fragment.as_deref(),
                        fragment_original: node.fragment_original.as_deref(),
                        position,
                    })
                    .collect();
                assign_anchors(doc, &queries)
            }
            None => vec![None; nodes.len()],
        };

        Self {
            document,
            nodes,
            start_nodes,
        }
    }

    /// Raw HTML per entry. `None` where the entry needs a placeholder.
    pub fn slices(&self) -> Vec<Option<String>> {
        let Some(doc) = self.document else {
            return vec![None; self.nodes.len()];
        };

        let slices: Vec<_> = (0..self.start_nodes.len())
            .map(|i| {
                let start = self.start_nodes[i]?;
                let stop = stop_anchor(doc, &self.start_nodes, i);
                Some(slice_html(doc, start, stop)).filter(|html| !html.trim().is_empty())
            })
            .collect();

        debug!(
            entries = self.nodes.len(),
            resolved = self.start_nodes.iter().flatten().count(),
            sliced = slices.iter().flatten().count(),
            "Sliced resource"
        );
        slices
    }
}

/// Resolve a start node per query, never handing the same node out twice.
///
/// Queries are processed in order. Each takes the first unclaimed candidate;
/// a claimed candidate is skipped forward past its subtree until an unclaimed
/// node turns up.
pub fn assign_anchors(doc: &Document, queries: &[AnchorQuery<'_>]) -> Vec<Option<ArenaNodeId>> {
    let dom = doc.dom();
    let mut claimed: HashSet<ArenaNodeId> = HashSet::new();

    queries
        .iter()
        .map(|query| {
            let chosen = anchor_candidates(doc, query)
                .into_iter()
                .find_map(|(_, candidate)| {
                    let mut current = Some(candidate);
                    while let Some(node) = current {
                        if !claimed.contains(&node) {
                            return Some(node);
                        }
                        current = dom.next_after_subtree(node);
                    }
                    None
                });
            if let Some(node) = chosen {
                claimed.insert(node);
            }
            chosen
        })
        .collect()
}

/// The start node that ends slice `index`: the nearest start node of any
/// other entry that lies after this one in document order.
///
/// TOC order is not consulted, so an entry pointing back into the document
/// still stops at the next anchor instead of running over its neighbours.
pub fn stop_anchor(
    doc: &Document,
    start_nodes: &[Option<ArenaNodeId>],
    index: usize,
) -> Option<ArenaNodeId> {
    let start = start_nodes.get(index).copied().flatten()?;
    start_nodes
        .iter()
        .enumerate()
        .filter(|&(i, _)| i != index)
        .filter_map(|(_, node)| *node)
        .filter(|&next| doc.precedes(start, next))
        .min_by_key(|&next| doc.position(next))
}

/// Concatenated `outerHTML` of the nodes from `start` (inclusive) to `stop`
/// (exclusive) in document order, or to the end of the document.
///
/// A node that contains `stop` is entered rather than emitted, so the stop
/// node and everything after it stay out of this slice.
pub fn slice_html(doc: &Document, start: ArenaNodeId, stop: Option<ArenaNodeId>) -> String {
    let dom = doc.dom();
    let mut html = String::new();
    let mut current = Some(start);

    while let Some(node) = current {
        if Some(node) == stop {
            break;
        }
        if let Some(stop) = stop
            && doc.contains(node, stop)
        {
            current = dom
                .get(node)
                .map(|n| n.first_child)
                .filter(|child| child.is_some())
                .or_else(|| dom.next_after_subtree(node));
            continue;
        }
        html.push_str(&outer_html(dom, node));
        current = dom.next_after_subtree(node);
    }
    html
}
