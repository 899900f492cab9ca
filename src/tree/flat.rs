//! Marker layout: the whole tree in one vector of the value type.
//!
//! Every node takes a record of `max_children + 1` slots, records in
//! breadth-first order. The first slot holds the value, then one slot per
//! child holding the offset of that child's record, then `marker_for_empty`
//! up to `max_children`. For the tree `0 -> [1, 2]` with empty marker `255`:
//!
//! ```text
//! [0, 3, 6,  1, 255, 255,  2, 255, 255]
//! ```
//!
//! Child slots are produced from `marker_for_child` by
//! [`FlatSlot::with_index`], so a value type that carries more than an
//! index keeps the rest of the marker. The last record is always a leaf,
//! which is how `max_children` is read back from the slots alone.

use serde::{Deserialize, Serialize};

use super::adapter::TreeAdapter;
use super::error::ApiError;
use super::nary::{NaryTree, Node};

/// A value type that can also hold record offsets.
pub trait FlatSlot: Clone + PartialEq {
    /// This slot with its offset part set to `index`, `None` if it does not fit.
    fn with_index(&self, index: usize) -> Option<Self>;

    /// The offset stored in a child slot.
    fn index(&self) -> Option<usize>;
}

macro_rules! impl_flat_slot {
    ($($ty:ty),*) => {
        $(
            impl FlatSlot for $ty {
                #[inline]
                fn with_index(&self, index: usize) -> Option<Self> {
                    <$ty>::try_from(index).ok()
                }

                #[inline]
                fn index(&self) -> Option<usize> {
                    usize::try_from(*self).ok()
                }
            }
        )*
    };
}

impl_flat_slot!(u8, u16, u32, u64, usize, i8, i16, i32, i64);

impl<A: FlatSlot, B: Clone + PartialEq> FlatSlot for (A, B) {
    fn with_index(&self, index: usize) -> Option<Self> {
        Some((self.0.with_index(index)?, self.1.clone()))
    }

    fn index(&self) -> Option<usize> {
        self.0.index()
    }
}

/// A tree stored as fixed-size records in a single vector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "RawFlatTree<V>",
    bound(deserialize = "V: FlatSlot + Deserialize<'de>")
)]
pub struct FlatTree<V> {
    slots: Vec<V>,
    marker_for_empty: V,
    #[serde(skip_serializing)]
    max_children: usize,
}

#[derive(Deserialize)]
struct RawFlatTree<V> {
    slots: Vec<V>,
    marker_for_empty: V,
}

impl<V: FlatSlot> TryFrom<RawFlatTree<V>> for FlatTree<V> {
    type Error = ApiError;

    fn try_from(raw: RawFlatTree<V>) -> Result<Self, Self::Error> {
        FlatTree::from_slots(raw.slots, raw.marker_for_empty)
    }
}

impl<V: FlatSlot> FlatTree<V> {
    /// Encode a tree whose values are stored as they are.
    ///
    /// No value may equal either marker.
    pub fn from_adapter<A>(adapter: &A, marker_for_empty: V, marker_for_child: V) -> Result<Self, ApiError>
    where
        A: TreeAdapter<Value = V>,
    {
        Self::from_adapter_with(adapter, marker_for_empty, marker_for_child, V::clone)
    }

    /// Encode a tree, turning every node value into a slot with `node_to_data`.
    pub fn from_adapter_with<A, F>(
        adapter: &A,
        marker_for_empty: V,
        marker_for_child: V,
        node_to_data: F,
    ) -> Result<Self, ApiError>
    where
        A: TreeAdapter,
        F: Fn(&A::Value) -> V,
    {
        let nodes: Vec<_> = adapter.breadth_first().collect();
        let max_children = nodes.iter().map(|n| n.child_count).max().unwrap_or(0);
        let record = max_children + 1;

        let mut slots = Vec::with_capacity(nodes.len() * record);
        let mut next_child = 1usize;
        for node in &nodes {
            let value = node_to_data(node.value);
            if value == marker_for_empty || value == marker_for_child {
                return Err(ApiError::ValueIsMarker);
            }
            slots.push(value);

            for _ in 0..node.child_count {
                let slot = next_child
                    .checked_mul(record)
                    .and_then(|offset| marker_for_child.with_index(offset))
                    .filter(|slot| *slot != marker_for_empty)
                    .ok_or(ApiError::OffsetOverflow)?;
                slots.push(slot);
                next_child += 1;
            }
            slots.extend(
                std::iter::repeat(marker_for_empty.clone()).take(max_children - node.child_count),
            );
        }

        tracing::debug!(nodes = nodes.len(), max_children, "encoded tree with markers");

        Ok(FlatTree {
            slots,
            marker_for_empty,
            max_children,
        })
    }

    /// Check slots produced by an earlier encoding.
    pub fn from_slots(slots: Vec<V>, marker_for_empty: V) -> Result<Self, ApiError> {
        let max_children = slots
            .iter()
            .rev()
            .take_while(|slot| **slot == marker_for_empty)
            .count();
        let record = max_children + 1;
        if slots.len() % record != 0 {
            return Err(ApiError::Malformed(format!(
                "{} slots do not split into records of {record}",
                slots.len()
            )));
        }

        let mut next_child = 1usize;
        for (node, chunk) in slots.chunks(record).enumerate() {
            if chunk[0] == marker_for_empty {
                return Err(ApiError::Malformed(format!("record {node} has no value")));
            }
            let children = chunk[1..]
                .iter()
                .take_while(|slot| **slot != marker_for_empty)
                .count();
            if chunk[1 + children..].iter().any(|slot| *slot != marker_for_empty) {
                return Err(ApiError::Malformed(format!(
                    "record {node} has a child after an empty slot"
                )));
            }
            for slot in &chunk[1..=children] {
                if slot.index() != Some(next_child * record) {
                    return Err(ApiError::Malformed(format!(
                        "record {node} does not point at record {next_child}"
                    )));
                }
                next_child += 1;
            }
        }

        let nodes = slots.len() / record;
        if nodes > 0 && next_child != nodes {
            return Err(ApiError::Malformed(format!(
                "{nodes} records but {next_child} are reachable from the root"
            )));
        }

        Ok(FlatTree {
            slots,
            marker_for_empty,
            max_children,
        })
    }

    pub fn slots(&self) -> &[V] {
        &self.slots
    }

    pub fn marker_for_empty(&self) -> &V {
        &self.marker_for_empty
    }

    pub fn max_children(&self) -> usize {
        self.max_children
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.slots.len() / self.record_len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn record_len(&self) -> usize {
        self.max_children + 1
    }

    /// Value of the node whose record starts at `offset`.
    pub fn value(&self, offset: usize) -> Option<&V> {
        (offset % self.record_len() == 0)
            .then(|| self.slots.get(offset))
            .flatten()
    }

    /// Record offsets of the children of the node at `offset`.
    pub fn children(&self, offset: usize) -> Result<Vec<usize>, ApiError> {
        if offset % self.record_len() != 0 || offset >= self.slots.len() {
            return Err(ApiError::OutOfRange);
        }
        Ok(self.slots[offset + 1..offset + self.record_len()]
            .iter()
            .take_while(|slot| **slot != self.marker_for_empty)
            .filter_map(FlatSlot::index)
            .collect())
    }

    /// Record offset of the first child of `offset` holding `value`.
    pub fn child_with_value(&self, offset: usize, value: &V) -> Option<usize> {
        self.children(offset)
            .ok()?
            .into_iter()
            .find(|child| self.slots[*child] == *value)
    }

    /// Record offset of the node reached by following `path` down from the
    /// root. The root is not part of the path.
    pub fn offset_of_children_by_path(&self, path: &[V]) -> Option<usize> {
        if self.slots.is_empty() {
            return None;
        }
        path.iter()
            .try_fold(0, |offset, value| self.child_with_value(offset, value))
    }

    /// Values of the children of the node reached by `path`. An empty path
    /// gives the children of the root.
    pub fn children_by_path(&self, path: &[V]) -> Option<Vec<V>> {
        let offset = self.offset_of_children_by_path(path)?;
        let children = self.children(offset).ok()?;
        Some(children.into_iter().map(|child| self.slots[child].clone()).collect())
    }

    /// Rebuild the pointer-based tree.
    pub fn to_nary_tree(&self) -> NaryTree<V> {
        let record = self.record_len();
        let mut built: Vec<Option<Node<V>>> = self
            .slots
            .iter()
            .step_by(record)
            .cloned()
            .map(|v| Some(Node::new(v)))
            .collect();

        for node in (0..built.len()).rev() {
            let Ok(children) = self.children(node * record) else {
                continue;
            };
            let children: Vec<Node<V>> = children
                .into_iter()
                .filter_map(|child| built.get_mut(child / record).and_then(Option::take))
                .collect();
            if let Some(Some(parent)) = built.get_mut(node) {
                parent.children = children;
            }
        }

        match built.into_iter().next().flatten() {
            Some(root) => NaryTree::from_root(root),
            None => NaryTree::new(),
        }
    }
}
