/*
edge.rs

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

//! Routes between cities in the map graph.

use serde::{Deserialize, Serialize};

use super::label::LabelId;
use super::node::NodeId;

/// Identifier of a route. Allocated by the graph, never reused.
pub type EdgeId = usize;

/// A route connecting two cities.
///
/// Routes are undirected. The rendered length of a route is derived from the
/// current positions of its two cities and is never stored; the target
/// length is the distance that the layout optimizer tries to reach, mapped
/// from the route's game point value.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Edge {
    /// Route identifier.
    pub id: EdgeId,

    /// The two distinct cities that the route connects.
    pub endpoints: (NodeId, NodeId),

    /// Desired rendered length. Strictly positive.
    pub target_length: f64,

    /// Route color. Consumed by the rendering layer only.
    pub color: String,

    /// Identifier of the label anchor owned by this route.
    pub label: LabelId,
}
