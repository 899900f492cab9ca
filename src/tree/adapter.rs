//! The seam between concrete tree types and the compact encodings.
//!
//! Any tree that can be walked breadth first and report how many children
//! each node has can be encoded. [`NaryTree`](super::NaryTree) and
//! [`GraphTree`](super::GraphTree) implement it here; other tree crates only
//! need the one method.

/// One node as seen during a breadth-first walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreadthFirstNode<'a, V> {
    pub value: &'a V,
    pub child_count: usize,
}

/// A tree that can be visited breadth first.
///
/// Children must be visited in a stable order; that order becomes the
/// sibling order of the encoding.
pub trait TreeAdapter {
    type Value;

    /// Every node, root first, level by level.
    fn breadth_first(&self) -> impl Iterator<Item = BreadthFirstNode<'_, Self::Value>>;
}
