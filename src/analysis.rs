/*
analysis.rs

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

//! Read-only computations over the map graph.
//!
//! Every function in this module takes the graph by shared reference and
//! never mutates it:
//!
//! * [`shortest_path::shortest_path`] computes the cheapest route between
//!   two cities, weighted by target lengths.
//! * [`importance::edge_importance`] scores how central each route is
//!   across all shortest paths. The layout optimizer uses the scores to
//!   settle important routes first.
//! * [`tasks::score_task`] reports the reward and penalty breakdown of a
//!   task against the current map.
//! * [`stats::degree_stats`] computes degrees and connected components, and
//!   flags degenerate layouts (isolated cities, split maps) as warnings.
//!
//! Whole-graph results are memoized in [`cache::AnalysisCache`], keyed by
//! the graph topology version, so that stale results can never be observed
//! after an edit.

pub mod cache;
pub mod importance;
pub mod shortest_path;
pub mod stats;
pub mod tasks;
