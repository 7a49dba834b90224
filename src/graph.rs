/*
graph.rs

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

//! The board map as a graph of cities, routes, labels, and tasks.
//!
//! The [`model::Graph`] object is the single mutable aggregate shared by the
//! rest of the application:
//!
//! * Cities are [`node::Node`] objects with a continuous 2D position.
//! * Routes are [`edge::Edge`] objects connecting two cities, with the target
//!   length that the layout optimizer tries to reach.
//! * Every city and route owns a [`label::Label`] placement anchor that the
//!   optimizer moves independently to keep text clear of the geometry.
//! * Tasks are [`task::Task`] objects, the scored route-connection
//!   objectives handed to the analysis engine.
//!
//! All mutations go through [`model::Graph`], which enforces the referential
//! invariants (endpoints must exist, target lengths must be positive, city
//! names must be unique) and maintains the topology version that the
//! analysis cache keys its results on.

pub mod edge;
pub mod label;
pub mod model;
pub mod node;
pub mod task;
