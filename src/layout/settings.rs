/*
settings.rs

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

//! Tuning knobs of the layout optimizer.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

use crate::config;

/// Type of errors raised when validating the optimizer settings.
#[derive(Debug, PartialEq)]
pub enum SettingsError {
    /// The named setting must be a positive number.
    NotPositive(&'static str),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SettingsError::NotPositive(name) => {
                write!(f, "the {name} setting must be a positive number")
            }
        }
    }
}

impl Error for SettingsError {}

/// Force and termination parameters of the layout optimizer.
///
/// Every parameter is strictly positive. The defaults come from
/// [`crate::config`] and are tuned for maps with target lengths in the
/// range of a few to a few dozen canvas units.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct LayoutSettings {
    /// Strength of the spring pulling a route toward its target length.
    pub spring_stiffness: f64,

    /// Strength of the short-range repulsion between nearby entities.
    pub repulsion_strength: f64,

    /// Distance under which two entities repel each other.
    pub interaction_radius: f64,

    /// Velocity decay applied every iteration, in (0, 1].
    pub damping_factor: f64,

    /// Upper bound on the displacement of a single entity per iteration.
    pub max_step_size: f64,

    /// Convergence metric value under which an iteration counts as settled.
    pub convergence_threshold: f64,

    /// Number of consecutive settled iterations before the optimizer
    /// reports convergence.
    pub settle_iterations: usize,

    /// Number of consecutive iterations without improvement of the best
    /// metric before the optimizer reports a stall.
    pub stall_window: usize,

    /// How strongly route importance slows down the movement of the cities
    /// it touches.
    pub importance_weight: f64,

    /// Preferred distance between a label and its anchor.
    pub label_clearance: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            spring_stiffness: config::DEFAULT_SPRING_STIFFNESS,
            repulsion_strength: config::DEFAULT_REPULSION_STRENGTH,
            interaction_radius: config::DEFAULT_INTERACTION_RADIUS,
            damping_factor: config::DEFAULT_DAMPING_FACTOR,
            max_step_size: config::DEFAULT_MAX_STEP_SIZE,
            convergence_threshold: config::DEFAULT_CONVERGENCE_THRESHOLD,
            settle_iterations: config::DEFAULT_SETTLE_ITERATIONS,
            stall_window: config::DEFAULT_STALL_WINDOW,
            importance_weight: config::DEFAULT_IMPORTANCE_WEIGHT,
            label_clearance: config::DEFAULT_LABEL_CLEARANCE,
        }
    }
}

impl LayoutSettings {
    /// Verify that every parameter is positive.
    ///
    /// # Errors
    ///
    /// The method returns an error naming the first offending setting.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let checks: [(&'static str, f64); 8] = [
            ("spring_stiffness", self.spring_stiffness),
            ("repulsion_strength", self.repulsion_strength),
            ("interaction_radius", self.interaction_radius),
            ("damping_factor", self.damping_factor),
            ("max_step_size", self.max_step_size),
            ("convergence_threshold", self.convergence_threshold),
            ("importance_weight", self.importance_weight),
            ("label_clearance", self.label_clearance),
        ];
        for (name, value) in checks {
            if !(value > 0.0) || !value.is_finite() {
                return Err(SettingsError::NotPositive(name));
            }
        }
        if self.settle_iterations == 0 {
            return Err(SettingsError::NotPositive("settle_iterations"));
        }
        if self.stall_window == 0 {
            return Err(SettingsError::NotPositive("stall_window"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(LayoutSettings::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_values() {
        let mut settings: LayoutSettings = LayoutSettings::default();
        settings.damping_factor = 0.0;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::NotPositive("damping_factor"))
        );

        let mut settings: LayoutSettings = LayoutSettings::default();
        settings.spring_stiffness = f64::NAN;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::NotPositive("spring_stiffness"))
        );

        let mut settings: LayoutSettings = LayoutSettings::default();
        settings.stall_window = 0;
        assert_eq!(
            settings.validate(),
            Err(SettingsError::NotPositive("stall_window"))
        );
    }
}
