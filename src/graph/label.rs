/*
label.rs

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

//! Text placement anchors for cities and routes.

use serde::{Deserialize, Serialize};

use super::edge::EdgeId;
use super::node::{NodeId, Point};

/// Identifier of a label anchor. Allocated by the graph, never reused.
pub type LabelId = usize;

/// The graph entity that a label is attached to.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub enum LabelAnchor {
    Node(NodeId),
    Edge(EdgeId),
}

/// A floating text anchor.
///
/// Every city and route owns exactly one label. The label is placed at an
/// offset from its anchor (the city position, or the midpoint of the route)
/// so that the layout optimizer can move text away from overlapping
/// geometry without moving the anchor itself. A label is destroyed together
/// with its anchor.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Label {
    /// Label identifier.
    pub id: LabelId,

    /// Entity that the label is attached to.
    pub anchor: LabelAnchor,

    /// Current offset from the anchor position.
    pub offset: Point,
}
