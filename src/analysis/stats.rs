/*
stats.rs

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

//! Degree and connectivity statistics over the map graph.

use std::collections::{HashMap, HashSet};

use crate::graph::model::Graph;
use crate::graph::node::NodeId;

/// Degrees, connected components, and the warnings derived from them.
///
/// Isolated cities and split maps are legal while a map is being designed;
/// they are surfaced as warnings so the designer can decide whether they
/// are intentional.
#[derive(Debug, Default, Clone)]
pub struct DegreeStats {
    /// Number of routes around each city.
    pub degrees: HashMap<NodeId, usize>,

    /// Connected components. Identifiers are sorted within each component,
    /// and components are sorted by their first identifier.
    pub components: Vec<Vec<NodeId>>,

    /// Cities without any route.
    pub isolated: Vec<NodeId>,

    /// Human-readable warnings about degenerate layouts.
    pub warnings: Vec<String>,
}

/// Compute the degree and connectivity statistics of the graph.
pub fn degree_stats(graph: &Graph) -> DegreeStats {
    let mut stats: DegreeStats = DegreeStats::default();
    let ids: Vec<NodeId> = graph.sorted_node_ids();

    for id in &ids {
        stats.degrees.insert(*id, graph.degree(*id));
    }

    // Breadth-first sweep over the cities in ascending identifier order, so
    // the component list is deterministic.
    let mut seen: HashSet<NodeId> = HashSet::new();
    for id in &ids {
        if seen.contains(id) {
            continue;
        }
        let mut component: Vec<NodeId> = Vec::new();
        let mut queue: Vec<NodeId> = vec![*id];
        seen.insert(*id);
        while let Some(current) = queue.pop() {
            component.push(current);
            for (next, _) in graph.neighbors(current) {
                if seen.insert(*next) {
                    queue.push(*next);
                }
            }
        }
        component.sort_unstable();
        stats.components.push(component);
    }

    stats.isolated = ids
        .iter()
        .filter(|id| stats.degrees[id] == 0)
        .copied()
        .collect();

    for id in &stats.isolated {
        let name: &str = graph.node(*id).map(|n| n.name.as_str()).unwrap_or("?");
        stats
            .warnings
            .push(format!("the city {name} has no route and will drift"));
    }
    if stats.components.len() > 1 {
        stats.warnings.push(format!(
            "the map is split into {} disconnected parts that settle independently",
            stats.components.len()
        ));
    }
    stats
}
