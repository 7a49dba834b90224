/*
shortest_path.rs

Copyright 2026 Hervé Quatremain

This file is part of Raildraft.

Raildraft is free software: you can redistribute it and/or modify it under
the terms of the GNU General Public License as published by the Free Software
Foundation, either version 3 of the License, or (at your option) any later
version.

Raildraft is distributed in the hope that it will be useful, but WITHOUT ANY
WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
A PARTICULAR PURPOSE. See the GNU General Public License for more details.

You should have received a copy of the GNU General Public License along with
Raildraft. If not, see <https://www.gnu.org/licenses/>.

SPDX-License-Identifier: GPL-3.0-or-later
*/

//! Cheapest routes between cities, weighted by target lengths.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::error::Error;
use std::fmt;

use crate::graph::edge::EdgeId;
use crate::graph::model::Graph;
use crate::graph::node::NodeId;

/// Type of errors reported by the analysis engine.
///
/// An unreachable pair of cities is a property of the map being designed,
/// not a failure of the engine. Callers report it to the designer and keep
/// going.
#[derive(Debug, PartialEq)]
pub enum AnalysisError {
    /// The requested city does not exist in the graph.
    UnknownNode(NodeId),

    /// No route connects the two cities.
    Unreachable { from: NodeId, to: NodeId },
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AnalysisError::UnknownNode(id) => {
                write!(f, "the city with the identifier {id} does not exist")
            }
            AnalysisError::Unreachable { from, to } => {
                write!(f, "no route connects the cities {from} and {to}")
            }
        }
    }
}

impl Error for AnalysisError {}

/// A route through the map, as returned by [`shortest_path`].
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    /// Visited cities, in order, endpoints included.
    pub nodes: Vec<NodeId>,

    /// Traversed routes, in order. One fewer entry than [`RoutePath::nodes`].
    pub edges: Vec<EdgeId>,

    /// Sum of the target lengths of the traversed routes.
    pub weight: f64,
}

/// Result of a single-source search: for each reachable city, the distance
/// from the source and the predecessor step on the canonical cheapest path.
pub struct SearchTree {
    source: NodeId,
    dist: HashMap<NodeId, f64>,
    prev: HashMap<NodeId, (NodeId, EdgeId)>,
}

impl SearchTree {
    /// Distance from the source to the given city.
    pub fn distance(&self, to: NodeId) -> Option<f64> {
        self.dist.get(&to).copied()
    }

    /// Reconstruct the canonical cheapest path from the source to the given
    /// city, or `None` if the city is unreachable.
    pub fn path_to(&self, to: NodeId) -> Option<RoutePath> {
        let weight: f64 = self.distance(to)?;
        let mut nodes: Vec<NodeId> = vec![to];
        let mut edges: Vec<EdgeId> = Vec::new();
        let mut current: NodeId = to;
        while current != self.source {
            let (parent, edge) = *self.prev.get(&current)?;
            nodes.push(parent);
            edges.push(edge);
            current = parent;
        }
        nodes.reverse();
        edges.reverse();
        Some(RoutePath {
            nodes,
            edges,
            weight,
        })
    }
}

/// Entry of the Dijkstra priority queue. The ordering is inverted so that
/// [`BinaryHeap`], a max-heap, pops the entry with the smallest distance;
/// equal distances pop the smallest city identifier first, which keeps the
/// search deterministic.
struct HeapEntry {
    dist: f64,
    node: NodeId,
}

impl PartialEq for HeapEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for HeapEntry {}

impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .dist
            .total_cmp(&self.dist)
            .then_with(|| other.node.cmp(&self.node))
    }
}

/// Run a single-source Dijkstra search over the route target lengths.
///
/// When two paths to a city have the same distance, the one arriving over
/// the route with the smallest identifier wins, so the canonical path for
/// any pair of cities is deterministic.
pub fn search(graph: &Graph, from: NodeId) -> SearchTree {
    let mut tree: SearchTree = SearchTree {
        source: from,
        dist: HashMap::new(),
        prev: HashMap::new(),
    };
    if graph.node(from).is_none() {
        return tree;
    }
    tree.dist.insert(from, 0.0);

    let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::new();
    heap.push(HeapEntry {
        dist: 0.0,
        node: from,
    });

    while let Some(HeapEntry { dist, node }) = heap.pop() {
        // Outdated entry: the city has already been settled closer.
        if dist > *tree.dist.get(&node).unwrap_or(&f64::INFINITY) {
            continue;
        }
        // Neighbors are ordered by route identifier, so on equal distances
        // the smallest route identifier is recorded first.
        for (next, edge_id) in graph.neighbors(node) {
            let edge = match graph.edge(*edge_id) {
                Some(e) => e,
                None => continue,
            };
            let next_dist: f64 = dist + edge.target_length;
            let known: f64 = *tree.dist.get(next).unwrap_or(&f64::INFINITY);
            if next_dist < known {
                tree.dist.insert(*next, next_dist);
                tree.prev.insert(*next, (node, *edge_id));
                heap.push(HeapEntry {
                    dist: next_dist,
                    node: *next,
                });
            } else if next_dist == known
                && let Some((_, recorded)) = tree.prev.get(next)
                && *edge_id < *recorded
            {
                // Same distance over a smaller route identifier: keep the
                // canonical predecessor deterministic.
                tree.prev.insert(*next, (node, *edge_id));
            }
        }
    }
    tree
}

/// Compute the cheapest route between two cities, weighted by the target
/// lengths of the traversed routes.
///
/// The path from a city to itself is the single-city path with weight zero.
///
/// # Errors
///
/// The function returns an error if either city does not exist, or if no
/// route connects them. The latter is a reportable map-design condition,
/// not a failure.
pub fn shortest_path(graph: &Graph, from: NodeId, to: NodeId) -> Result<RoutePath, AnalysisError> {
    if graph.node(from).is_none() {
        return Err(AnalysisError::UnknownNode(from));
    }
    if graph.node(to).is_none() {
        return Err(AnalysisError::UnknownNode(to));
    }
    search(graph, from)
        .path_to(to)
        .ok_or(AnalysisError::Unreachable { from, to })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::Point;

    fn triangle() -> (Graph, NodeId, NodeId, NodeId) {
        let mut graph: Graph = Graph::new();
        let a = graph.add_node("A", Point::new(0.0, 0.0)).unwrap();
        let b = graph.add_node("B", Point::new(1.0, 0.0)).unwrap();
        let c = graph.add_node("C", Point::new(2.0, 0.0)).unwrap();
        graph.add_edge(a, b, 3.0).unwrap();
        graph.add_edge(b, c, 4.0).unwrap();
        (graph, a, b, c)
    }

    #[test]
    fn path_to_self_is_zero_length() {
        let (graph, a, _, _) = triangle();
        let path: RoutePath = shortest_path(&graph, a, a).unwrap();
        assert_eq!(path.nodes, vec![a]);
        assert!(path.edges.is_empty());
        assert_eq!(path.weight, 0.0);
    }

    #[test]
    fn follows_target_lengths() {
        let (mut graph, a, b, c) = triangle();
        // Direct shortcut is more expensive than going through B.
        graph.add_edge(a, c, 8.0).unwrap();
        let path: RoutePath = shortest_path(&graph, a, c).unwrap();
        assert_eq!(path.nodes, vec![a, b, c]);
        assert_eq!(path.weight, 7.0);

        // A cheaper shortcut wins.
        let direct = graph.add_edge(a, c, 6.0).unwrap();
        let path: RoutePath = shortest_path(&graph, a, c).unwrap();
        assert_eq!(path.nodes, vec![a, c]);
        assert_eq!(path.edges, vec![direct]);
        assert_eq!(path.weight, 6.0);
    }

    #[test]
    fn equal_cost_ties_prefer_smaller_edge_ids() {
        let mut graph: Graph = Graph::new();
        let a = graph.add_node("A", Point::default()).unwrap();
        let b = graph.add_node("B", Point::default()).unwrap();
        let first = graph.add_edge(a, b, 5.0).unwrap();
        let _second = graph.add_edge(a, b, 5.0).unwrap();
        let path: RoutePath = shortest_path(&graph, a, b).unwrap();
        assert_eq!(path.edges, vec![first]);
    }

    #[test]
    fn unreachable_is_reported() {
        let (mut graph, a, _, _) = triangle();
        let lone = graph.add_node("Lone", Point::new(9.0, 9.0)).unwrap();
        assert_eq!(
            shortest_path(&graph, a, lone),
            Err(AnalysisError::Unreachable { from: a, to: lone })
        );
    }

    #[test]
    fn unknown_nodes_are_errors() {
        let (graph, a, _, _) = triangle();
        assert_eq!(
            shortest_path(&graph, a, 999),
            Err(AnalysisError::UnknownNode(999))
        );
        assert_eq!(
            shortest_path(&graph, 999, a),
            Err(AnalysisError::UnknownNode(999))
        );
    }
}
