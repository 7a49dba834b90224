/*
forces.rs

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

//! Force terms of the layout simulation.
//!
//! One force pass computes, for every city and label, the sum of:
//!
//! * the spring forces of the incident routes, pulling or pushing the two
//!   endpoints toward the route target length,
//! * the short-range repulsion from nearby entities (cities repel cities,
//!   labels are pushed away from cities, route midpoints, and other
//!   labels),
//! * for labels, a tether keeping them at a comfortable ring around their
//!   anchor.
//!
//! Route midpoints take part in the pair queries as passive obstacles: they
//!   push labels away but receive no force themselves.

use std::collections::HashMap;

use super::grid::SpatialGrid;
use super::settings::LayoutSettings;
use crate::graph::label::LabelId;
use crate::graph::model::Graph;
use crate::graph::node::{NodeId, Point};

/// Distances under this value are treated as a perfect overlap.
const OVERLAP_EPSILON: f64 = 1e-9;

/// Lower clamp for repulsion distances, so overlapping entities get a
/// strong but finite push.
const MIN_REPULSION_DISTANCE: f64 = 0.05;

/// What a point in the pair query stands for.
#[derive(Copy, Clone, PartialEq, Eq)]
enum PointKind {
    Node,
    Label,
    EdgeMidpoint,
}

/// Net force on every movable point, indexed like the city and label lists
/// of the simulation state.
pub struct ForceField {
    pub nodes: Vec<Point>,
    pub labels: Vec<Point>,
}

impl ForceField {
    /// Whether every accumulated force is finite.
    pub fn is_finite(&self) -> bool {
        self.nodes.iter().all(Point::is_finite) && self.labels.iter().all(Point::is_finite)
    }
}

/// Compute the net force on every city and label.
///
/// `node_ids` and `label_ids` fix the iteration order; `node_index` maps a
/// city identifier to its position in `node_ids`. The same inputs always
/// produce the same forces, which is what makes pausing and resuming the
/// simulation reproducible.
pub fn accumulate(
    graph: &Graph,
    node_ids: &[NodeId],
    node_index: &HashMap<NodeId, usize>,
    label_ids: &[LabelId],
    settings: &LayoutSettings,
) -> ForceField {
    let mut field: ForceField = ForceField {
        nodes: vec![Point::default(); node_ids.len()],
        labels: vec![Point::default(); label_ids.len()],
    };

    // Spring term: every route pulls or pushes its two endpoints toward the
    // target length.
    for edge_id in graph.sorted_edge_ids() {
        let edge = match graph.edge(edge_id) {
            Some(e) => e,
            None => continue,
        };
        let (a, b) = edge.endpoints;
        let (ia, ib) = match (node_index.get(&a), node_index.get(&b)) {
            (Some(ia), Some(ib)) => (*ia, *ib),
            _ => continue,
        };
        let pa: Point = graph.node(a).map(|n| n.position).unwrap_or_default();
        let pb: Point = graph.node(b).map(|n| n.position).unwrap_or_default();
        let distance: f64 = pa.distance(&pb);
        let direction: Point = if distance < OVERLAP_EPSILON {
            separation_axis(ia, ib)
        } else {
            pa.offset_to(&pb).scale(1.0 / distance)
        };
        // Positive when the route is too long: both endpoints are pulled
        // together. Negative when too short: pushed apart.
        let magnitude: f64 = settings.spring_stiffness * (distance - edge.target_length);
        field.nodes[ia] = field.nodes[ia].translate(&direction.scale(magnitude));
        field.nodes[ib] = field.nodes[ib].translate(&direction.scale(-magnitude));
    }

    // Repulsion term. Cities, labels, and route midpoints go into one grid;
    // the pair rules decide who gets pushed.
    let mut positions: Vec<Point> = Vec::new();
    let mut kinds: Vec<PointKind> = Vec::new();
    for id in node_ids {
        positions.push(graph.node(*id).map(|n| n.position).unwrap_or_default());
        kinds.push(PointKind::Node);
    }
    for id in label_ids {
        positions.push(graph.label_position(*id).unwrap_or_default());
        kinds.push(PointKind::Label);
    }
    for edge_id in graph.sorted_edge_ids() {
        if let Some(edge) = graph.edge(edge_id)
            && let (Some(a), Some(b)) = (graph.node(edge.endpoints.0), graph.node(edge.endpoints.1))
        {
            positions.push(a.position.midpoint(&b.position));
            kinds.push(PointKind::EdgeMidpoint);
        }
    }

    let grid: SpatialGrid = SpatialGrid::build(&positions, settings.interaction_radius);
    for (i, j) in grid.pairs_within(&positions, settings.interaction_radius) {
        let distance: f64 = positions[i].distance(&positions[j]);
        let direction: Point = if distance < OVERLAP_EPSILON {
            separation_axis(i, j)
        } else {
            positions[i]
                .offset_to(&positions[j])
                .scale(1.0 / distance)
        };
        // Inverse-distance push, fading to zero at the interaction radius.
        let clamped: f64 = distance.max(MIN_REPULSION_DISTANCE);
        let magnitude: f64 =
            settings.repulsion_strength * (1.0 / clamped - 1.0 / settings.interaction_radius);
        apply_repulsion(&mut field, node_ids.len(), kinds[i], kinds[j], i, j, &direction, magnitude);
    }

    // Tether term: labels prefer a ring at label_clearance around their
    // anchor.
    for (index, id) in label_ids.iter().enumerate() {
        let offset: Point = match graph.label(*id) {
            Some(l) => l.offset,
            None => continue,
        };
        let distance: f64 = offset.length();
        let direction: Point = if distance < OVERLAP_EPSILON {
            separation_axis(index, index + 1)
        } else {
            offset.scale(1.0 / distance)
        };
        let magnitude: f64 = settings.spring_stiffness * (settings.label_clearance - distance);
        field.labels[index] = field.labels[index].translate(&direction.scale(magnitude));
    }

    field
}

/// Apply one repulsion pair according to the kind rules: cities push
/// cities, labels push labels, cities and route midpoints push labels, and
/// route midpoints never move.
#[allow(clippy::too_many_arguments)]
fn apply_repulsion(
    field: &mut ForceField,
    num_nodes: usize,
    kind_i: PointKind,
    kind_j: PointKind,
    i: usize,
    j: usize,
    direction: &Point,
    magnitude: f64,
) {
    fn pushed(kind: PointKind, other: PointKind) -> bool {
        match kind {
            // Cities are only displaced by other cities, not by text.
            PointKind::Node => other == PointKind::Node,
            PointKind::Label => true,
            PointKind::EdgeMidpoint => false,
        }
    }
    if pushed(kind_i, kind_j) {
        let slot: &mut Point = match kind_i {
            PointKind::Node => &mut field.nodes[i],
            PointKind::Label => &mut field.labels[i - num_nodes],
            PointKind::EdgeMidpoint => return,
        };
        *slot = slot.translate(&direction.scale(-magnitude));
    }
    if pushed(kind_j, kind_i) {
        let slot: &mut Point = match kind_j {
            PointKind::Node => &mut field.nodes[j],
            PointKind::Label => &mut field.labels[j - num_nodes],
            PointKind::EdgeMidpoint => return,
        };
        *slot = slot.translate(&direction.scale(magnitude));
    }
}

/// Deterministic unit vector separating two perfectly overlapping points.
/// Derived from the point indexes so repeated runs split overlaps the same
/// way.
fn separation_axis(i: usize, j: usize) -> Point {
    let angle: f64 = ((i * 31 + j * 17) % 628) as f64 / 100.0;
    Point::new(angle.cos(), angle.sin())
}
