//! Rooted trees stored in a `petgraph` graph.

use std::collections::VecDeque;

use petgraph::graph::{DiGraph, Graph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};

use super::adapter::{BreadthFirstNode, TreeAdapter};
use super::error::ApiError;
use super::offset::ChildrenOffsetEnd;
use super::SmallMemoryTree;

/// A directed graph viewed as a tree hanging from `root`.
///
/// Outgoing edges are the child links; siblings are ordered by edge
/// insertion. Only the part reachable from `root` is considered.
#[derive(Debug, Clone, Copy)]
pub struct GraphTree<'g, N, E> {
    graph: &'g Graph<N, E, Directed>,
    root: NodeIndex,
}

impl<'g, N, E> GraphTree<'g, N, E> {
    /// Wrap `graph`, checking that everything reachable from `root` forms a
    /// tree (no node reached twice).
    pub fn new(graph: &'g Graph<N, E, Directed>, root: NodeIndex) -> Result<Self, ApiError> {
        if graph.node_weight(root).is_none() {
            return Err(ApiError::Malformed(format!(
                "root {} is not a node of the graph",
                root.index()
            )));
        }

        let tree = GraphTree { graph, root };
        let mut seen = vec![false; graph.node_count()];
        let mut queue = VecDeque::from([root]);
        while let Some(node) = queue.pop_front() {
            if std::mem::replace(&mut seen[node.index()], true) {
                return Err(ApiError::Malformed(format!(
                    "node {} is reachable more than once",
                    node.index()
                )));
            }
            queue.extend(tree.children(node));
        }

        Ok(tree)
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    fn children(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut edges: Vec<_> = self
            .graph
            .edges_directed(node, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        // petgraph hands edges back newest first
        edges.sort_by_key(|(id, _)| *id);
        edges.into_iter().map(|(_, target)| target).collect()
    }
}

impl<N, E> TreeAdapter for GraphTree<'_, N, E> {
    type Value = N;

    fn breadth_first(&self) -> impl Iterator<Item = BreadthFirstNode<'_, N>> {
        let mut order = Vec::with_capacity(self.graph.node_count());
        let mut queue = VecDeque::from([self.root]);
        while let Some(node) = queue.pop_front() {
            let children = self.children(node);
            order.push(BreadthFirstNode {
                value: &self.graph[node],
                child_count: children.len(),
            });
            queue.extend(children);
        }
        order.into_iter()
    }
}

/// Rebuild a graph from a compact tree.
///
/// Node `i` of the result holds the `i`-th value in breadth-first order.
/// Returns `None` for an empty tree.
pub fn generate_graph<V, O>(tree: &SmallMemoryTree<V, O>) -> Option<(DiGraph<V, ()>, NodeIndex)>
where
    V: Clone,
    O: ChildrenOffsetEnd,
{
    if tree.is_empty() {
        return None;
    }

    let mut graph = DiGraph::with_capacity(tree.len(), tree.len().saturating_sub(1));
    let nodes: Vec<NodeIndex> = tree
        .values()
        .iter()
        .map(|value| graph.add_node(value.clone()))
        .collect();

    for (parent, &parent_node) in nodes.iter().enumerate() {
        let Ok(children) = tree.children_range(parent) else {
            continue;
        };
        for child in children {
            graph.add_edge(parent_node, nodes[child], ());
        }
    }

    Some((graph, nodes[0]))
}
