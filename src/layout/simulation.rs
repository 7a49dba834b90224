/*
simulation.rs

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

//! State and integration loop of the layout simulation.

use log::{debug, warn};
use std::collections::HashMap;

use super::forces::{ForceField, accumulate};
use super::settings::LayoutSettings;
use crate::graph::edge::EdgeId;
use crate::graph::label::LabelId;
use crate::graph::model::Graph;
use crate::graph::node::{NodeId, Point};

/// Smallest metric improvement that counts against the stall window.
const IMPROVEMENT_EPSILON: f64 = 1e-12;

/// What one simulation step observed.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepVerdict {
    /// The layout is still moving.
    InProgress,

    /// The convergence metric stayed under the threshold for the
    /// configured number of consecutive iterations.
    Converged,

    /// The metric plateaued above the threshold for the configured window,
    /// or the integration produced non-finite values.
    Stalled,
}

/// Per-run state of the layout simulation.
///
/// The state is created when an optimization starts and discarded on reset
/// or when the graph topology changes; it is never persisted. A step is a
/// pure function of the state, the graph, and the settings, which is what
/// makes pausing and resuming reproducible.
pub struct SimulationState {
    /// Graph topology version the state was built for.
    version: u64,

    /// Cities, in ascending identifier order.
    node_ids: Vec<NodeId>,

    /// Index of each city in [`SimulationState::node_ids`].
    node_index: HashMap<NodeId, usize>,

    /// Labels, in ascending identifier order.
    label_ids: Vec<LabelId>,

    /// Velocity accumulator of each city.
    node_velocities: Vec<Point>,

    /// Velocity accumulator of each label.
    label_velocities: Vec<Point>,

    /// Per-city force scale derived from route importance. Cities touching
    /// important routes move less per iteration and settle first.
    node_weights: Vec<f64>,

    /// Number of completed iterations.
    iteration: usize,

    /// Convergence metric of the last iteration: the largest displacement
    /// of any single entity.
    metric: f64,

    /// Best (smallest) metric seen above the convergence threshold.
    best_metric: f64,

    /// Consecutive iterations with the metric under the threshold.
    settled: usize,

    /// Consecutive iterations without improvement of the best metric.
    no_improvement: usize,
}

impl SimulationState {
    /// Build the simulation state for the current graph topology.
    ///
    /// `importance` comes from the analysis cache; the maximum importance
    /// of the routes around a city determines how much the city is slowed
    /// down.
    pub fn build(
        graph: &Graph,
        importance: &HashMap<EdgeId, f64>,
        settings: &LayoutSettings,
    ) -> Self {
        let node_ids: Vec<NodeId> = graph.sorted_node_ids();
        let node_index: HashMap<NodeId, usize> = node_ids
            .iter()
            .enumerate()
            .map(|(index, id)| (*id, index))
            .collect();
        let mut label_ids: Vec<LabelId> = graph.labels().map(|l| l.id).collect();
        label_ids.sort_unstable();

        let node_weights: Vec<f64> = node_ids
            .iter()
            .map(|id| {
                let max_importance: f64 = graph
                    .neighbors(*id)
                    .iter()
                    .map(|(_, edge_id)| importance.get(edge_id).copied().unwrap_or(0.0))
                    .fold(0.0, f64::max);
                1.0 / (1.0 + settings.importance_weight * max_importance)
            })
            .collect();

        debug!(
            "Simulation state built for {} cities and {} labels, topology version {}",
            node_ids.len(),
            label_ids.len(),
            graph.version()
        );
        Self {
            version: graph.version(),
            node_velocities: vec![Point::default(); node_ids.len()],
            label_velocities: vec![Point::default(); label_ids.len()],
            node_weights,
            node_ids,
            node_index,
            label_ids,
            iteration: 0,
            metric: f64::INFINITY,
            best_metric: f64::INFINITY,
            settled: 0,
            no_improvement: 0,
        }
    }

    /// Graph topology version the state was built for.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of completed iterations.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Convergence metric of the last iteration, or infinity before the
    /// first one.
    pub fn metric(&self) -> f64 {
        self.metric
    }

    /// Run one simulation iteration: accumulate forces, integrate the
    /// bounded position update, commit the new positions to the graph, and
    /// update the convergence bookkeeping.
    ///
    /// When the forces or the integrated positions are not finite, nothing
    /// is committed and the step reports [`StepVerdict::Stalled`].
    pub fn step(&mut self, graph: &mut Graph, settings: &LayoutSettings) -> StepVerdict {
        let field: ForceField = accumulate(
            graph,
            &self.node_ids,
            &self.node_index,
            &self.label_ids,
            settings,
        );
        if !field.is_finite() {
            warn!(
                "Non-finite force detected at iteration {}; the layout diverged",
                self.iteration
            );
            self.metric = f64::NAN;
            return StepVerdict::Stalled;
        }

        let mut metric: f64 = 0.0;

        // Integrate the city velocities. The importance weight slows down
        // structurally central cities; the step cap prevents overshoot.
        for (index, velocity) in self.node_velocities.iter_mut().enumerate() {
            let weighted: Point = field.nodes[index].scale(self.node_weights[index]);
            *velocity = velocity
                .translate(&weighted)
                .scale(settings.damping_factor);
            *velocity = cap(velocity, settings.max_step_size);
            metric = metric.max(velocity.length());
        }
        for (index, velocity) in self.label_velocities.iter_mut().enumerate() {
            *velocity = velocity
                .translate(&field.labels[index])
                .scale(settings.damping_factor);
            *velocity = cap(velocity, settings.max_step_size);
            metric = metric.max(velocity.length());
        }

        // Compute every new position before committing any of them, so a
        // divergence leaves the graph untouched.
        let mut node_positions: Vec<Point> = Vec::with_capacity(self.node_ids.len());
        for (index, id) in self.node_ids.iter().enumerate() {
            let position: Point = match graph.node(*id) {
                Some(n) => n.position,
                None => Point::default(),
            };
            node_positions.push(position.translate(&self.node_velocities[index]));
        }
        let mut label_offsets: Vec<Point> = Vec::with_capacity(self.label_ids.len());
        for (index, id) in self.label_ids.iter().enumerate() {
            let offset: Point = match graph.label(*id) {
                Some(l) => l.offset,
                None => Point::default(),
            };
            label_offsets.push(offset.translate(&self.label_velocities[index]));
        }
        if !node_positions.iter().all(Point::is_finite)
            || !label_offsets.iter().all(Point::is_finite)
            || !metric.is_finite()
        {
            warn!(
                "Non-finite position computed at iteration {}; the layout diverged",
                self.iteration
            );
            self.metric = f64::NAN;
            return StepVerdict::Stalled;
        }

        for (index, id) in self.node_ids.iter().enumerate() {
            let _ = graph.set_position(*id, node_positions[index]);
        }
        for (index, id) in self.label_ids.iter().enumerate() {
            let _ = graph.set_label_offset(*id, label_offsets[index]);
        }

        self.iteration += 1;
        self.metric = metric;

        if metric < settings.convergence_threshold {
            self.settled += 1;
            self.no_improvement = 0;
            if self.settled >= settings.settle_iterations {
                debug!(
                    "Converged after {} iterations (metric {metric:e})",
                    self.iteration
                );
                return StepVerdict::Converged;
            }
        } else {
            self.settled = 0;
            if metric < self.best_metric - IMPROVEMENT_EPSILON {
                self.best_metric = metric;
                self.no_improvement = 0;
            } else {
                self.no_improvement += 1;
                if self.no_improvement >= settings.stall_window {
                    debug!(
                        "Stalled after {} iterations (metric {metric:e}, best {:e})",
                        self.iteration, self.best_metric
                    );
                    return StepVerdict::Stalled;
                }
            }
        }
        StepVerdict::InProgress
    }
}

/// Bound a displacement to the given length.
fn cap(velocity: &Point, max_step: f64) -> Point {
    let length: f64 = velocity.length();
    if length > max_step {
        velocity.scale(max_step / length)
    } else {
        *velocity
    }
}
