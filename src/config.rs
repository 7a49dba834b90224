/*
config.rs

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

//! Default values of the optimizer settings.
//!
//! These defaults are tuned for maps where route target lengths sit between
//! a few and a few dozen canvas units. The interaction radius stays well
//! under typical target lengths, so the repulsion has faded to zero by the
//! time a route reaches its target and the spring equilibrium is exact.

/// Long version string shown by the command line.
pub const COPYRIGHT_NOTICE: &str = "raildraft 0.1.0
Copyright 2026 Hervé Quatremain
License GPL-3.0-or-later <https://www.gnu.org/licenses/gpl-3.0.html>";

/// Strength of the spring pulling a route toward its target length.
pub const DEFAULT_SPRING_STIFFNESS: f64 = 0.1;

/// Strength of the short-range repulsion between nearby entities.
pub const DEFAULT_REPULSION_STRENGTH: f64 = 1.0;

/// Distance under which two entities repel each other.
pub const DEFAULT_INTERACTION_RADIUS: f64 = 2.0;

/// Velocity decay applied every iteration.
pub const DEFAULT_DAMPING_FACTOR: f64 = 0.5;

/// Upper bound on the displacement of a single entity per iteration.
pub const DEFAULT_MAX_STEP_SIZE: f64 = 0.5;

/// Convergence metric value under which an iteration counts as settled.
pub const DEFAULT_CONVERGENCE_THRESHOLD: f64 = 1e-4;

/// Consecutive settled iterations before the optimizer reports convergence.
pub const DEFAULT_SETTLE_ITERATIONS: usize = 10;

/// Consecutive iterations without improvement before a stall is reported.
pub const DEFAULT_STALL_WINDOW: usize = 200;

/// How strongly route importance slows down the cities it touches.
pub const DEFAULT_IMPORTANCE_WEIGHT: f64 = 2.0;

/// Preferred distance between a label and its anchor.
pub const DEFAULT_LABEL_CLEARANCE: f64 = 1.0;
