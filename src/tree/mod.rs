//! Compact, pointer-free tree encodings.
//!
//! [`SmallMemoryTree`] stores a tree as two flat columns in breadth-first
//! order: the node values and, for every node, the running total of child
//! counts up to and including that node. The children of any node are then
//! a contiguous slice of the value column, which is all a path lookup needs.
//!
//! For the tree
//!
//! ```text
//!         0
//!       /   \
//!      1     2
//!     / \   / \
//!    3   4 5   6
//!               \
//!                7
//! ```
//!
//! the columns are `values = [0, 1, 2, 3, 4, 5, 6, 7]` and
//! `children_offset_ends = [2, 4, 6, 6, 6, 6, 7, 7]`.
//!
//! [`lots_of_children`] holds a second layout that stores the shape as a
//! bitmap, for trees whose nodes are wide. [`flat`] keeps the whole tree in
//! one vector of the value type, with markers for child and empty slots.

pub mod adapter;
pub mod error;
pub mod flat;
pub mod graph;
pub mod lots_of_children;
pub mod nary;
pub mod offset;

pub use adapter::{BreadthFirstNode, TreeAdapter};
pub use error::ApiError;
pub use flat::{FlatSlot, FlatTree};
pub use graph::{generate_graph, GraphTree};
pub use lots_of_children::{SmallMemoryTreeLotsOfChildren, SmallMemoryTreeLotsOfChildrenData};
pub use nary::{NaryTree, Node};
pub use offset::ChildrenOffsetEnd;

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A read-only tree in two breadth-first columns.
///
/// `O` is the integer type of the offset column. Use the narrowest type
/// that can hold the number of nodes minus one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawSmallMemoryTree<V, O>")]
pub struct SmallMemoryTree<V, O: ChildrenOffsetEnd = u64> {
    values: Vec<V>,
    children_offset_ends: Vec<O>,
}

#[derive(Deserialize)]
struct RawSmallMemoryTree<V, O> {
    values: Vec<V>,
    children_offset_ends: Vec<O>,
}

impl<V, O: ChildrenOffsetEnd> TryFrom<RawSmallMemoryTree<V, O>> for SmallMemoryTree<V, O> {
    type Error = ApiError;

    fn try_from(raw: RawSmallMemoryTree<V, O>) -> Result<Self, Self::Error> {
        SmallMemoryTree::from_parts(raw.values, raw.children_offset_ends)
    }
}

impl<V, O: ChildrenOffsetEnd> Default for SmallMemoryTree<V, O> {
    fn default() -> Self {
        SmallMemoryTree {
            values: Vec::new(),
            children_offset_ends: Vec::new(),
        }
    }
}

impl<V, O: ChildrenOffsetEnd> SmallMemoryTree<V, O> {
    /// Encode any tree that can be walked breadth first.
    pub fn from_adapter<A>(adapter: &A) -> Result<Self, ApiError>
    where
        A: TreeAdapter<Value = V>,
        V: Clone,
    {
        let mut values = Vec::new();
        let mut children_offset_ends = Vec::new();
        let mut children_sum = 0u64;

        for node in adapter.breadth_first() {
            values.push(node.value.clone());
            children_sum += node.child_count as u64;
            children_offset_ends.push(O::from_u64(children_sum).ok_or(ApiError::OffsetOverflow)?);
        }

        values.shrink_to_fit();
        children_offset_ends.shrink_to_fit();

        tracing::debug!(nodes = values.len(), "encoded tree");

        Ok(SmallMemoryTree {
            values,
            children_offset_ends,
        })
    }

    /// Assemble a tree from previously extracted columns.
    pub fn from_parts(values: Vec<V>, children_offset_ends: Vec<O>) -> Result<Self, ApiError> {
        if values.len() != children_offset_ends.len() {
            return Err(ApiError::Malformed(format!(
                "{} values but {} offsets",
                values.len(),
                children_offset_ends.len()
            )));
        }

        if let Some(window) = children_offset_ends
            .windows(2)
            .position(|pair| pair[0] > pair[1])
        {
            return Err(ApiError::Malformed(format!(
                "offsets decrease after node {window}"
            )));
        }

        // every node after the root needs its parent earlier in the column
        for index in 1..children_offset_ends.len() {
            if children_offset_ends[index - 1].to_u64() < index as u64 {
                return Err(ApiError::Malformed(format!(
                    "node {index} has no parent before it"
                )));
            }
        }

        if let Some(last) = children_offset_ends.last() {
            let expected = (children_offset_ends.len() - 1) as u64;
            if last.to_u64() != expected {
                return Err(ApiError::Malformed(format!(
                    "offsets account for {} children, expected {expected}",
                    last.to_u64()
                )));
            }
        }

        Ok(SmallMemoryTree {
            values,
            children_offset_ends,
        })
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }

    pub fn children_offset_ends(&self) -> &[O] {
        &self.children_offset_ends
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of children of the node at breadth-first `index`.
    pub fn children_count(&self, index: usize) -> Result<u64, ApiError> {
        let end = self
            .children_offset_ends
            .get(index)
            .ok_or(ApiError::OutOfRange)?
            .to_u64();
        match index {
            0 => Ok(end),
            _ => Ok(end - self.children_offset_ends[index - 1].to_u64()),
        }
    }

    /// Breadth-first index range of the children of the node at `index`.
    pub fn children_range(&self, index: usize) -> Result<Range<usize>, ApiError> {
        let count = self.children_count(index)?;
        let end = self.children_offset_ends[index].to_u64() + 1;
        let begin = end - count;
        let begin = usize::try_from(begin).map_err(|_| ApiError::OutOfRange)?;
        let end = usize::try_from(end).map_err(|_| ApiError::OutOfRange)?;
        Ok(begin..end)
    }

    /// Values of the children of the node at `index`.
    pub fn children(&self, index: usize) -> Result<&[V], ApiError> {
        let range = self.children_range(index)?;
        self.values.get(range).ok_or(ApiError::OutOfRange)
    }

    /// Children of the node reached by following `path` from the root.
    ///
    /// `path[0]` must be the root value; each following value is matched
    /// against the children of the previous match, first match wins.
    /// A leaf at the end of the path yields an empty vector.
    pub fn calc_children_for_path(&self, path: &[V]) -> Result<Vec<V>, ApiError>
    where
        V: Clone + PartialEq,
    {
        self.children_for_path_with(path, |siblings, value| {
            siblings.iter().position(|sibling| sibling == value)
        })
    }

    /// Like [`calc_children_for_path`](Self::calc_children_for_path) but
    /// uses binary search among siblings. Siblings must be sorted.
    pub fn calc_children_for_path_sorted(&self, path: &[V]) -> Result<Vec<V>, ApiError>
    where
        V: Clone + Ord,
    {
        self.children_for_path_with(path, |siblings, value| {
            let index = siblings.partition_point(|sibling| sibling < value);
            (siblings.get(index) == Some(value)).then_some(index)
        })
    }

    fn children_for_path_with<F>(&self, path: &[V], find: F) -> Result<Vec<V>, ApiError>
    where
        V: Clone,
        F: Fn(&[V], &V) -> Option<usize>,
    {
        if path.is_empty() {
            return Err(ApiError::EmptyPath);
        }

        let mut candidates = Some(0..self.values.len().min(1));
        for value in path {
            let range = candidates.take().ok_or(ApiError::PathTooLong)?;
            let siblings = self.values.get(range.clone()).ok_or(ApiError::OutOfRange)?;
            let offset = find(siblings, value).ok_or(ApiError::PathDoesNotMatch)?;
            let children = self.children_range(range.start + offset)?;
            if !children.is_empty() {
                candidates = Some(children);
            }
        }

        match candidates {
            Some(range) => Ok(self.values.get(range).ok_or(ApiError::OutOfRange)?.to_vec()),
            None => Ok(Vec::new()),
        }
    }

    /// Rebuild the pointer-based tree.
    pub fn to_nary_tree(&self) -> NaryTree<V>
    where
        V: Clone,
    {
        let mut built: Vec<Option<Node<V>>> =
            self.values.iter().cloned().map(|v| Some(Node::new(v))).collect();

        // children always sit after their parent, so walking backwards
        // finishes every subtree before it is attached
        for index in (0..self.values.len()).rev() {
            let Ok(range) = self.children_range(index) else {
                continue;
            };
            let children: Vec<Node<V>> = range
                .filter_map(|child| built.get_mut(child).and_then(Option::take))
                .collect();
            if let Some(Some(node)) = built.get_mut(index) {
                node.children = children;
            }
        }

        match built.into_iter().next().flatten() {
            Some(root) => NaryTree::from_root(root),
            None => NaryTree::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_tree;

    fn sample() -> SmallMemoryTree<i32> {
        SmallMemoryTree::from_adapter(&sample_tree()).unwrap()
    }

    #[test]
    fn test_columns() {
        let smt = sample();
        assert_eq!(smt.values(), &[0, 1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(smt.children_offset_ends(), &[2, 4, 6, 6, 6, 6, 7, 7]);
    }

    #[test]
    fn test_root_only() {
        let smt = SmallMemoryTree::<i32>::from_adapter(&NaryTree::with_root(0)).unwrap();
        assert_eq!(smt.values(), &[0]);
        assert_eq!(smt.children_offset_ends(), &[0]);
        assert_eq!(smt.calc_children_for_path(&[0]).unwrap(), Vec::<i32>::new());
    }

    #[test]
    fn test_children_count() {
        let smt = sample();
        assert_eq!(smt.children_count(0), Ok(2));
        assert_eq!(smt.children_count(2), Ok(2));
        assert_eq!(smt.children_count(3), Ok(0));
        assert_eq!(smt.children_count(6), Ok(1));
        assert_eq!(smt.children_count(8), Err(ApiError::OutOfRange));
    }

    #[test]
    fn test_children_range() {
        let smt = sample();
        assert_eq!(smt.children_range(0), Ok(1..3));
        assert_eq!(smt.children_range(1), Ok(3..5));
        assert_eq!(smt.children_range(6), Ok(7..8));
        assert_eq!(smt.children_range(7), Ok(8..8));
        assert_eq!(smt.children(2).unwrap(), &[5, 6]);
    }

    #[test]
    fn test_calc_children_for_path() {
        let smt = sample();
        assert_eq!(smt.calc_children_for_path(&[0]).unwrap(), vec![1, 2]);
        assert_eq!(smt.calc_children_for_path(&[0, 2]).unwrap(), vec![5, 6]);
        assert_eq!(smt.calc_children_for_path(&[0, 2, 6]).unwrap(), vec![7]);
        assert!(smt.calc_children_for_path(&[0, 2, 6, 7]).unwrap().is_empty());
    }

    #[test]
    fn test_calc_children_for_path_errors() {
        let smt = sample();
        assert_eq!(smt.calc_children_for_path(&[]), Err(ApiError::EmptyPath));
        assert_eq!(smt.calc_children_for_path(&[42]), Err(ApiError::PathDoesNotMatch));
        assert_eq!(smt.calc_children_for_path(&[0, 3]), Err(ApiError::PathDoesNotMatch));
        assert_eq!(
            smt.calc_children_for_path(&[0, 2, 6, 7, 8]),
            Err(ApiError::PathTooLong)
        );
    }

    #[test]
    fn test_siblings_with_equal_values() {
        let mut root = Node::new(0);
        let first = root.push(1);
        first.push(3);
        first.push(4);
        let second = root.push(2);
        second.push(3);
        second.push(4).push(69);
        let smt = SmallMemoryTree::<i32>::from_adapter(&NaryTree::from_root(root)).unwrap();

        assert!(smt.calc_children_for_path(&[0, 1, 4]).unwrap().is_empty());
        assert_eq!(smt.calc_children_for_path(&[0, 2, 4]).unwrap(), vec![69]);
    }

    #[test]
    fn test_sorted_lookup_matches_linear() {
        let mut tree = NaryTree::with_root(0u64);
        let root = tree.root_mut().unwrap();
        for i in 0..100 {
            root.push(i);
        }
        root.child_mut(99).unwrap().push(1000);
        let smt = SmallMemoryTree::<u64, u8>::from_adapter(&tree).unwrap();

        assert_eq!(
            smt.calc_children_for_path_sorted(&[0, 99]).unwrap(),
            smt.calc_children_for_path(&[0, 99]).unwrap()
        );
        assert_eq!(smt.calc_children_for_path_sorted(&[0, 99]).unwrap(), vec![1000]);
        assert_eq!(
            smt.calc_children_for_path_sorted(&[0, 100]),
            Err(ApiError::PathDoesNotMatch)
        );
    }

    #[test]
    fn test_offset_overflow() {
        let mut tree = NaryTree::with_root(0u32);
        let root = tree.root_mut().unwrap();
        for i in 0..300 {
            root.push(i);
        }
        assert_eq!(
            SmallMemoryTree::<u32, u8>::from_adapter(&tree),
            Err(ApiError::OffsetOverflow)
        );
        assert!(SmallMemoryTree::<u32, u16>::from_adapter(&tree).is_ok());
    }

    #[test]
    fn test_empty_tree_lookup() {
        let smt = SmallMemoryTree::<i32>::from_adapter(&NaryTree::new()).unwrap();
        assert!(smt.is_empty());
        assert_eq!(smt.calc_children_for_path(&[0]), Err(ApiError::PathDoesNotMatch));
    }

    #[test]
    fn test_to_nary_tree() {
        let tree = sample_tree();
        let smt = SmallMemoryTree::<i32>::from_adapter(&tree).unwrap();
        assert_eq!(smt.to_nary_tree(), tree);

        let empty = SmallMemoryTree::<i32>::default();
        assert!(empty.to_nary_tree().is_empty());
    }

    #[test]
    fn test_from_parts_validation() {
        assert!(SmallMemoryTree::<i32>::from_parts(vec![0, 1], vec![1, 1]).is_ok());
        assert!(matches!(
            SmallMemoryTree::<i32>::from_parts(vec![0, 1], vec![1]),
            Err(ApiError::Malformed(_))
        ));
        assert!(matches!(
            SmallMemoryTree::<i32>::from_parts(vec![0, 1, 2], vec![2, 1, 2]),
            Err(ApiError::Malformed(_))
        ));
        assert!(matches!(
            SmallMemoryTree::<i32>::from_parts(vec![0, 1], vec![0, 1]),
            Err(ApiError::Malformed(_))
        ));
        assert!(matches!(
            SmallMemoryTree::<i32>::from_parts(vec![0, 1], vec![1, 2]),
            Err(ApiError::Malformed(_))
        ));
    }

    #[test]
    fn test_serde_validates() {
        let smt = sample();
        let json = serde_json::to_string(&smt).unwrap();
        let parsed: SmallMemoryTree<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, smt);

        let broken = r#"{"values":[0,1],"children_offset_ends":[0,1]}"#;
        assert!(serde_json::from_str::<SmallMemoryTree<i32>>(broken).is_err());
    }
}
