/*
layout.rs

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

//! Automatic map layout by iterative force simulation.
//!
//! The optimizer moves city positions and label offsets so that:
//!
//! * the rendered length of every route approaches its target length
//!   (spring term),
//! * nothing sits on top of anything else (short-range repulsion term,
//!   with pair lookups going through [`grid::SpatialGrid`] so an iteration
//!   stays sub-quadratic),
//! * structurally important routes settle early and stop drifting
//!   (importance weighting from the analysis engine).
//!
//! There is no closed-form optimum for these combined objectives, so the
//! layout is refined iteratively: [`simulation::SimulationState`] holds the
//! velocity accumulators and convergence bookkeeping of a run, and
//! [`controller::Controller`] is the state machine that drives it and that
//! the editing layer observes.

pub mod controller;
pub mod forces;
pub mod grid;
pub mod settings;
pub mod simulation;
