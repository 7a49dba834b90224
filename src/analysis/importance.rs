/*
importance.rs

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

//! Centrality scores for routes.
//!
//! The importance of a route is the fraction of all-pairs canonical
//! shortest paths that traverse it, normalized so that the most traversed
//! route scores 1.0. The layout optimizer gives highly important routes a
//! higher force weight so that the structural backbone of the map settles
//! early and stops drifting.

use std::collections::HashMap;

use super::shortest_path::{SearchTree, search};
use crate::graph::edge::EdgeId;
use crate::graph::model::Graph;
use crate::graph::node::NodeId;

/// Compute the importance score of every route, in the range [0, 1].
///
/// For every unordered pair of connected cities, the canonical shortest
/// path (ties broken by smallest route identifier) contributes one count to
/// each route it traverses. Counts are then normalized by the maximum, so
/// the most traversed route scores 1.0. Routes on no shortest path score
/// 0.0, and a graph without routes yields an empty map.
pub fn edge_importance(graph: &Graph) -> HashMap<EdgeId, f64> {
    let mut counts: HashMap<EdgeId, usize> = HashMap::new();
    for edge_id in graph.sorted_edge_ids() {
        counts.insert(edge_id, 0);
    }
    if counts.is_empty() {
        return HashMap::new();
    }

    let ids: Vec<NodeId> = graph.sorted_node_ids();
    for (i, from) in ids.iter().enumerate() {
        let tree: SearchTree = search(graph, *from);
        for to in &ids[i + 1..] {
            if let Some(path) = tree.path_to(*to) {
                for edge_id in path.edges {
                    *counts.entry(edge_id).or_insert(0) += 1;
                }
            }
        }
    }

    let max: usize = counts.values().copied().max().unwrap_or(0);
    counts
        .into_iter()
        .map(|(edge_id, count)| {
            let score: f64 = if max == 0 {
                0.0
            } else {
                count as f64 / max as f64
            };
            (edge_id, score)
        })
        .collect()
}
