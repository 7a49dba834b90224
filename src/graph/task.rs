/*
task.rs

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

//! Scored route-connection objectives.

use serde::{Deserialize, Serialize};

use super::node::NodeId;

/// Identifier of a task. Allocated by the graph, never reused.
pub type TaskId = usize;

/// A task card: connect two cities, optionally through extra waypoints.
///
/// The first and last cities in [`Task::nodes`] are the designated
/// endpoints; any cities in between are extra waypoints. Scores may be
/// negative, so a task can be a pure penalty card.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    /// Task identifier.
    pub id: TaskId,

    /// Cities referenced by the task, endpoints first and last.
    /// At least two entries.
    pub nodes: Vec<NodeId>,

    /// Points awarded when the two endpoints are connected.
    pub reward: f64,

    /// Points deducted for each extra waypoint that the connecting route
    /// misses. `None` means the task has no waypoint penalty.
    pub penalty: Option<f64>,
}

impl Task {
    /// The two designated endpoints of the task.
    pub fn endpoints(&self) -> (NodeId, NodeId) {
        (self.nodes[0], self.nodes[self.nodes.len() - 1])
    }

    /// The extra waypoints between the two endpoints.
    pub fn waypoints(&self) -> &[NodeId] {
        &self.nodes[1..self.nodes.len() - 1]
    }
}
