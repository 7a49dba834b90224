/*
cache.rs

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

//! Versioned memoization of whole-graph analysis results.
//!
//! Importance scores and connectivity statistics are quadratic to compute,
//! and every optimizer start wants both. The cache keys the results on the
//! graph topology version and rebuilds them lazily on the first query after
//! an edit, so a stale score can never be observed.

use log::debug;
use std::collections::HashMap;

use super::importance::edge_importance;
use super::stats::{DegreeStats, degree_stats};
use crate::graph::edge::EdgeId;
use crate::graph::model::Graph;

/// Cached whole-graph analysis results.
#[derive(Debug, Default)]
pub struct AnalysisCache {
    /// Topology version the cached results were computed for, or `None`
    /// before the first query.
    version: Option<u64>,

    /// Cached route importance scores.
    importance: HashMap<EdgeId, f64>,

    /// Cached degree and connectivity statistics.
    stats: DegreeStats,
}

impl AnalysisCache {
    /// Create an empty [`AnalysisCache`] object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Route importance scores for the current graph topology, recomputed
    /// if the graph changed since the last query.
    pub fn importance(&mut self, graph: &Graph) -> &HashMap<EdgeId, f64> {
        self.refresh(graph);
        &self.importance
    }

    /// Degree and connectivity statistics for the current graph topology,
    /// recomputed if the graph changed since the last query.
    pub fn stats(&mut self, graph: &Graph) -> &DegreeStats {
        self.refresh(graph);
        &self.stats
    }

    /// Drop the cached results. The next query recomputes them.
    pub fn invalidate(&mut self) {
        self.version = None;
        self.importance.clear();
        self.stats = DegreeStats::default();
    }

    /// Rebuild the cached results if the graph topology changed.
    fn refresh(&mut self, graph: &Graph) {
        if self.version == Some(graph.version()) {
            return;
        }
        debug!(
            "Rebuilding the analysis cache for topology version {}",
            graph.version()
        );
        self.importance = edge_importance(graph);
        self.stats = degree_stats(graph);
        self.version = Some(graph.version());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::Point;

    #[test]
    fn results_follow_topology_edits() {
        let mut graph: Graph = Graph::new();
        let mut cache: AnalysisCache = AnalysisCache::new();
        let a = graph.add_node("A", Point::default()).unwrap();
        let b = graph.add_node("B", Point::default()).unwrap();

        assert!(cache.importance(&graph).is_empty());
        assert_eq!(cache.stats(&graph).components.len(), 2);

        // The edit bumps the version, so the next query must see the edge.
        let ab = graph.add_edge(a, b, 3.0).unwrap();
        assert_eq!(cache.importance(&graph)[&ab], 1.0);
        assert_eq!(cache.stats(&graph).components.len(), 1);

        graph.remove_edge(ab).unwrap();
        assert!(cache.importance(&graph).is_empty());
    }

    #[test]
    fn invalidate_forces_a_rebuild() {
        let mut graph: Graph = Graph::new();
        let mut cache: AnalysisCache = AnalysisCache::new();
        let a = graph.add_node("A", Point::default()).unwrap();
        let b = graph.add_node("B", Point::default()).unwrap();
        let ab = graph.add_edge(a, b, 3.0).unwrap();

        assert_eq!(cache.importance(&graph)[&ab], 1.0);
        cache.invalidate();
        assert_eq!(cache.importance(&graph)[&ab], 1.0);
        assert_eq!(cache.stats(&graph).components.len(), 1);
    }
}
