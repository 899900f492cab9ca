//! A plain owned n-ary tree.
//!
//! This is the pointer-based form the compact encodings are built from and
//! rebuilt into. It serializes as nested JSON:
//! `{"value": 0, "children": [{"value": 1}, {"value": 2}]}`.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::adapter::{BreadthFirstNode, TreeAdapter};

/// A node with a value and an ordered list of children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node<V> {
    pub value: V,
    #[serde(default = "Vec::new", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node<V>>,
}

impl<V> Node<V> {
    /// Create a leaf.
    pub fn new(value: V) -> Self {
        Node {
            value,
            children: Vec::new(),
        }
    }

    /// Append a child and return it for further insertion.
    pub fn push(&mut self, value: V) -> &mut Node<V> {
        let index = self.children.len();
        self.children.push(Node::new(value));
        &mut self.children[index]
    }

    /// Builder-style variant of [`Node::push`] taking a finished subtree.
    pub fn with_child(mut self, child: Node<V>) -> Self {
        self.children.push(child);
        self
    }

    pub fn child(&self, index: usize) -> Option<&Node<V>> {
        self.children.get(index)
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Node<V>> {
        self.children.get_mut(index)
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// An owned tree, possibly empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NaryTree<V> {
    root: Option<Node<V>>,
}

impl<V> Default for NaryTree<V> {
    fn default() -> Self {
        NaryTree { root: None }
    }
}

impl<V> NaryTree<V> {
    /// Create an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a tree holding only a root.
    pub fn with_root(value: V) -> Self {
        NaryTree {
            root: Some(Node::new(value)),
        }
    }

    /// Wrap an already built node.
    pub fn from_root(root: Node<V>) -> Self {
        NaryTree { root: Some(root) }
    }

    /// Replace the whole tree with a single root and return it.
    pub fn insert_root(&mut self, value: V) -> &mut Node<V> {
        self.root.insert(Node::new(value))
    }

    pub fn root(&self) -> Option<&Node<V>> {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> Option<&mut Node<V>> {
        self.root.as_mut()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes().count()
    }

    /// Largest child count of any node.
    pub fn max_children(&self) -> usize {
        self.nodes().map(|n| n.children.len()).max().unwrap_or(0)
    }

    /// Iterate nodes breadth first.
    pub fn nodes(&self) -> BreadthFirst<'_, V> {
        BreadthFirst {
            queue: self.root.iter().collect(),
        }
    }
}

/// Breadth-first node iterator over a [`NaryTree`].
#[derive(Debug)]
pub struct BreadthFirst<'a, V> {
    queue: VecDeque<&'a Node<V>>,
}

impl<'a, V> Iterator for BreadthFirst<'a, V> {
    type Item = &'a Node<V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.queue.pop_front()?;
        self.queue.extend(node.children.iter());
        Some(node)
    }
}

impl<V> TreeAdapter for NaryTree<V> {
    type Value = V;

    fn breadth_first(&self) -> impl Iterator<Item = BreadthFirstNode<'_, V>> {
        self.nodes().map(|node| BreadthFirstNode {
            value: &node.value,
            child_count: node.children.len(),
        })
    }
}
