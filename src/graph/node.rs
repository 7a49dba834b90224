/*
node.rs

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

//! Cities in the map graph.

use serde::{Deserialize, Serialize};

use super::label::LabelId;

/// Identifier of a city. Allocated by the graph, never reused.
pub type NodeId = usize;

/// A point or displacement on the map canvas.
#[derive(Serialize, Deserialize, Debug, Default, Copy, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a [`Point`] object.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance to the other point.
    pub fn distance(&self, other: &Point) -> f64 {
        self.offset_to(other).length()
    }

    /// Displacement vector from this point to the other point.
    pub fn offset_to(&self, other: &Point) -> Point {
        Point::new(other.x - self.x, other.y - self.y)
    }

    /// Translate the point by the given displacement.
    pub fn translate(&self, offset: &Point) -> Point {
        Point::new(self.x + offset.x, self.y + offset.y)
    }

    /// Scale the displacement by the given factor.
    pub fn scale(&self, factor: f64) -> Point {
        Point::new(self.x * factor, self.y * factor)
    }

    /// Length of the displacement vector.
    pub fn length(&self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Midpoint between this point and the other point.
    pub fn midpoint(&self, other: &Point) -> Point {
        Point::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A city on the map.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Node {
    /// City identifier.
    pub id: NodeId,

    /// Display name of the city. Unique within the graph.
    pub name: String,

    /// Current position on the canvas. The layout optimizer is the only
    /// subsystem that mutates positions during a simulation.
    pub position: Point,

    /// Optional path to an illustration for the city. Consumed by the
    /// rendering layer only.
    pub image: Option<String>,

    /// Identifier of the label anchor owned by this city.
    pub label: LabelId,
}
