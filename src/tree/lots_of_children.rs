//! Bitmap layout for trees with wide nodes.
//!
//! The shape is kept as a `Vec<bool>`: one slot for the root, then
//! `max_children` slots for every node in breadth-first order, `true` where
//! a child exists. Children fill their parent's slots from the left. The
//! values live in a separate breadth-first column.
//!
//! Slots are grouped into levels; `levels[i]` is the exclusive end of level
//! `i` inside the bitmap and `values_per_level[i]` the number of values in
//! levels `0..=i`.

use serde::{Deserialize, Serialize};

use super::adapter::TreeAdapter;
use super::error::ApiError;
use super::nary::{NaryTree, Node};

/// The stored part of the bitmap layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmallMemoryTreeLotsOfChildrenData<V> {
    pub hierarchy: Vec<bool>,
    pub data: Vec<V>,
    pub max_children: usize,
}

impl<V: Clone> SmallMemoryTreeLotsOfChildrenData<V> {
    pub fn from_adapter<A>(adapter: &A) -> Self
    where
        A: TreeAdapter<Value = V>,
    {
        let nodes: Vec<_> = adapter.breadth_first().collect();
        let max_children = nodes.iter().map(|n| n.child_count).max().unwrap_or(0);

        let mut hierarchy = Vec::with_capacity(1 + nodes.len() * max_children);
        let mut data = Vec::with_capacity(nodes.len());
        if !nodes.is_empty() {
            hierarchy.push(true);
        }
        for node in &nodes {
            data.push(node.value.clone());
            hierarchy.extend((0..max_children).map(|slot| slot < node.child_count));
        }

        SmallMemoryTreeLotsOfChildrenData {
            hierarchy,
            data,
            max_children,
        }
    }
}

/// Bitmap layout plus the level index needed for lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmallMemoryTreeLotsOfChildren<V> {
    inner: SmallMemoryTreeLotsOfChildrenData<V>,
    levels: Vec<usize>,
    values_per_level: Vec<usize>,
}

impl<V> SmallMemoryTreeLotsOfChildren<V> {
    /// Check the stored parts and derive the level index.
    pub fn new(inner: SmallMemoryTreeLotsOfChildrenData<V>) -> Result<Self, ApiError> {
        let present = inner.hierarchy.iter().filter(|slot| **slot).count();
        if present != inner.data.len() {
            return Err(ApiError::Malformed(format!(
                "hierarchy marks {present} nodes but {} values are stored",
                inner.data.len()
            )));
        }
        if !inner.data.is_empty() {
            let expected = 1 + inner.data.len() * inner.max_children;
            if inner.hierarchy.len() != expected || !inner.hierarchy[0] {
                return Err(ApiError::Malformed(format!(
                    "hierarchy has {} slots, expected {expected} starting with the root",
                    inner.hierarchy.len()
                )));
            }
        }

        let levels = calculate_levels(&inner.hierarchy, inner.max_children);
        if levels.last().copied().unwrap_or(0) != inner.hierarchy.len() {
            return Err(ApiError::Malformed(
                "hierarchy does not split into levels".to_string(),
            ));
        }
        let values_per_level = calculate_values_per_level(&inner.hierarchy, &levels);

        Ok(SmallMemoryTreeLotsOfChildren {
            inner,
            levels,
            values_per_level,
        })
    }

    pub fn from_adapter<A>(adapter: &A) -> Result<Self, ApiError>
    where
        A: TreeAdapter<Value = V>,
        V: Clone,
    {
        Self::new(SmallMemoryTreeLotsOfChildrenData::from_adapter(adapter))
    }

    pub fn data(&self) -> &SmallMemoryTreeLotsOfChildrenData<V> {
        &self.inner
    }

    pub fn into_data(self) -> SmallMemoryTreeLotsOfChildrenData<V> {
        self.inner
    }

    pub fn hierarchy(&self) -> &[bool] {
        &self.inner.hierarchy
    }

    pub fn values(&self) -> &[V] {
        &self.inner.data
    }

    pub fn max_children(&self) -> usize {
        self.inner.max_children
    }

    pub fn levels(&self) -> &[usize] {
        &self.levels
    }

    pub fn values_per_level(&self) -> &[usize] {
        &self.values_per_level
    }

    /// Every slot of `level`, with the value where a node exists.
    pub fn level_with_optional_values(&self, level: usize) -> Result<Vec<Option<&V>>, ApiError> {
        if level >= self.levels.len() {
            return Err(ApiError::OutOfRange);
        }
        if level == 0 {
            return Ok(vec![self.inner.data.first()]);
        }
        let begin = self.levels[level - 1];
        Ok(self.slots_with_values(level, begin, self.levels[level]))
    }

    /// The `max_children` slots owned by the `node`-th node of level
    /// `level - 1`. Level 0 has a single slot, the root.
    pub fn children_with_optional_values(
        &self,
        level: usize,
        node: usize,
    ) -> Result<Vec<Option<&V>>, ApiError> {
        if level >= self.levels.len() {
            return Err(ApiError::OutOfRange);
        }
        if level == 0 {
            return match node {
                0 => Ok(vec![self.inner.data.first()]),
                _ => Err(ApiError::OutOfRange),
            };
        }

        let max_children = self.inner.max_children;
        let (begin, end) = node
            .checked_mul(max_children)
            .and_then(|offset| offset.checked_add(self.levels[level - 1]))
            .and_then(|begin| Some((begin, begin.checked_add(max_children)?)))
            .ok_or(ApiError::OutOfRange)?;
        if end > self.levels[level] {
            return Err(ApiError::OutOfRange);
        }
        Ok(self.slots_with_values(level, begin, end))
    }

    fn slots_with_values(&self, level: usize, begin: usize, end: usize) -> Vec<Option<&V>> {
        let level_begin = self.levels[level - 1];
        let mut value_index = self.values_per_level[level - 1]
            + self.inner.hierarchy[level_begin..begin]
                .iter()
                .filter(|slot| **slot)
                .count();

        self.inner.hierarchy[begin..end]
            .iter()
            .map(|present| {
                present.then(|| {
                    let value = &self.inner.data[value_index];
                    value_index += 1;
                    value
                })
            })
            .collect()
    }

    /// Children of the node reached by following `path` from the root.
    ///
    /// `None` for an empty path, a wrong root, a value that is not a child
    /// of the previous match, or a path that continues below a leaf.
    pub fn children_by_path(&self, path: &[V]) -> Option<Vec<V>>
    where
        V: Clone + PartialEq,
    {
        let (first, rest) = path.split_first()?;
        if self.inner.data.first()? != first {
            return None;
        }

        let max_children = self.inner.max_children;
        let mut level = 0;
        let mut node = 0;
        for value in rest {
            let children = self.children_with_optional_values(level + 1, node).ok()?;
            let slot = children.iter().position(|child| *child == Some(value))?;

            let level_begin = self.levels[level];
            let slot_index = level_begin + node * max_children + slot;
            node = self.inner.hierarchy[level_begin..slot_index]
                .iter()
                .filter(|present| **present)
                .count();
            level += 1;
        }

        if level + 1 >= self.levels.len() {
            return Some(Vec::new());
        }
        let children = self.children_with_optional_values(level + 1, node).ok()?;
        Some(children.into_iter().flatten().cloned().collect())
    }

    /// Rebuild the pointer-based tree.
    pub fn to_nary_tree(&self) -> NaryTree<V>
    where
        V: Clone,
    {
        let data = &self.inner.data;
        let max_children = self.inner.max_children;

        // node k owns the slots 1 + k * max_children .. 1 + (k + 1) * max_children
        let mut child_begin = 1;
        let mut child_ranges = Vec::with_capacity(data.len());
        for node in 0..data.len() {
            let slots_begin = 1 + node * max_children;
            let count = self.inner.hierarchy[slots_begin..slots_begin + max_children]
                .iter()
                .filter(|present| **present)
                .count();
            child_ranges.push(child_begin..child_begin + count);
            child_begin += count;
        }

        let mut built: Vec<Option<Node<V>>> =
            data.iter().cloned().map(|v| Some(Node::new(v))).collect();
        for (index, range) in child_ranges.into_iter().enumerate().rev() {
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

/// Exclusive end of every level inside `hierarchy`.
pub fn calculate_levels(hierarchy: &[bool], max_children: usize) -> Vec<usize> {
    if hierarchy.is_empty() {
        return Vec::new();
    }

    let mut levels = vec![1];
    let mut begin = 0;
    loop {
        let end = levels[levels.len() - 1];
        let parents = hierarchy[begin..end].iter().filter(|slot| **slot).count();
        let width = parents * max_children;
        if width == 0 || end + width > hierarchy.len() {
            break;
        }
        levels.push(end + width);
        begin = end;
    }
    levels
}

/// Inclusive prefix sum of present slots per level.
pub fn calculate_values_per_level(hierarchy: &[bool], levels: &[usize]) -> Vec<usize> {
    let mut begin = 0;
    let mut total = 0;
    levels
        .iter()
        .map(|&end| {
            total += hierarchy[begin..end].iter().filter(|slot| **slot).count();
            begin = end;
            total
        })
        .collect()
}
