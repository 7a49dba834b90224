/*
controller.rs

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

//! State machine driving the layout simulation.
//!
//! The controller moves between the phases
//! `Idle -> Running -> (Paused | Converged | Stalled)`, with `Paused ->
//! Running` on restart and any phase back to `Idle` on reset. Convergence
//! and stalls are observations, not automatic stops: the controller records
//! them and the caller decides what to do next.
//!
//! The run loop is cooperative. [`Controller::run`] re-checks the phase on
//! every iteration, so a pause or reset request takes effect within one
//! iteration; there is no background thread to cancel.

use log::debug;
use std::error::Error;
use std::fmt;

use super::settings::{LayoutSettings, SettingsError};
use super::simulation::{SimulationState, StepVerdict};
use crate::analysis::cache::AnalysisCache;
use crate::graph::model::Graph;

/// Phase of the layout optimizer.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    /// No simulation state exists.
    #[default]
    Idle,

    /// The simulation is being driven by [`Controller::run`] calls.
    Running,

    /// A simulation is captured mid-run and can resume or single-step.
    Paused,

    /// The convergence metric stayed under the threshold long enough.
    Converged,

    /// The metric plateaued or the integration diverged.
    Stalled,
}

/// Type of errors raised for operations that are invalid in the current
/// phase, or for invalid settings.
#[derive(Debug, PartialEq)]
pub enum ControlError {
    /// The operation is not allowed in the current phase.
    InvalidPhase {
        operation: &'static str,
        phase: Phase,
    },

    /// The provided settings failed validation.
    InvalidSettings(SettingsError),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ControlError::InvalidPhase { operation, phase } => {
                write!(f, "cannot {operation} while the optimizer is {phase}")
            }
            ControlError::InvalidSettings(e) => write!(f, "invalid optimizer settings: {e}"),
        }
    }
}

impl Error for ControlError {}

impl From<SettingsError> for ControlError {
    fn from(e: SettingsError) -> Self {
        ControlError::InvalidSettings(e)
    }
}

/// Snapshot of the controller, as shown to the editing layer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ControllerState {
    /// Current phase.
    pub phase: Phase,

    /// Convergence metric of the last iteration, or infinity before the
    /// first one.
    pub convergence_metric: f64,

    /// Number of completed iterations of the current simulation.
    pub iteration: usize,
}

/// The optimizer state machine.
#[derive(Default)]
pub struct Controller {
    phase: Phase,
    settings: LayoutSettings,
    simulation: Option<SimulationState>,
}

impl Controller {
    /// Create a [`Controller`] object in the `Idle` phase.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Settings of the current or next simulation.
    pub fn settings(&self) -> &LayoutSettings {
        &self.settings
    }

    /// Snapshot of the phase, convergence metric, and iteration counter.
    pub fn state(&self) -> ControllerState {
        ControllerState {
            phase: self.phase,
            convergence_metric: self
                .simulation
                .as_ref()
                .map(|s| s.metric())
                .unwrap_or(f64::INFINITY),
            iteration: self.simulation.as_ref().map(|s| s.iteration()).unwrap_or(0),
        }
    }

    /// Start or resume the simulation.
    ///
    /// From `Idle`, a fresh [`SimulationState`] is built. From `Paused`,
    /// the captured state resumes untouched, so pausing never perturbs the
    /// trajectory.
    ///
    /// # Errors
    ///
    /// The method returns an error if the settings are invalid or if the
    /// controller is in any phase other than `Idle` or `Paused`.
    pub fn start(
        &mut self,
        graph: &Graph,
        cache: &mut AnalysisCache,
        settings: LayoutSettings,
    ) -> Result<(), ControlError> {
        if self.phase != Phase::Idle && self.phase != Phase::Paused {
            return Err(ControlError::InvalidPhase {
                operation: "start",
                phase: self.phase,
            });
        }
        settings.validate()?;
        self.settings = settings;
        self.ensure_simulation(graph, cache);
        self.phase = Phase::Running;
        debug!("Optimizer started");
        Ok(())
    }

    /// Capture the simulation and stop iterating.
    ///
    /// # Errors
    ///
    /// The method returns an error if the controller is not `Running`.
    pub fn pause(&mut self) -> Result<(), ControlError> {
        if self.phase != Phase::Running {
            return Err(ControlError::InvalidPhase {
                operation: "pause",
                phase: self.phase,
            });
        }
        self.phase = Phase::Paused;
        debug!("Optimizer paused");
        Ok(())
    }

    /// Discard the simulation and return to `Idle`. Valid in any phase.
    pub fn reset(&mut self) {
        self.simulation = None;
        self.phase = Phase::Idle;
        debug!("Optimizer reset");
    }

    /// Run exactly one iteration, for manual inspection.
    ///
    /// From `Idle`, the simulation state is built first and the controller
    /// is left `Paused` afterwards, unless the iteration itself concluded
    /// the run.
    ///
    /// # Errors
    ///
    /// The method returns an error while `Running` (single-stepping only
    /// makes sense when the run loop is not active) and in the `Converged`
    /// and `Stalled` phases (reset first).
    pub fn step(
        &mut self,
        graph: &mut Graph,
        cache: &mut AnalysisCache,
    ) -> Result<Phase, ControlError> {
        if self.phase != Phase::Idle && self.phase != Phase::Paused {
            return Err(ControlError::InvalidPhase {
                operation: "step",
                phase: self.phase,
            });
        }
        self.settings.validate()?;
        self.ensure_simulation(graph, cache);
        if let Some(simulation) = self.simulation.as_mut() {
            self.phase = match simulation.step(graph, &self.settings) {
                StepVerdict::InProgress => Phase::Paused,
                StepVerdict::Converged => Phase::Converged,
                StepVerdict::Stalled => Phase::Stalled,
            };
        }
        Ok(self.phase)
    }

    /// Drive the simulation for up to `max_iterations` iterations.
    ///
    /// The phase is re-checked before every iteration, so a pause or reset
    /// issued from a callback between chunks takes effect within one
    /// iteration. Returns the phase the loop stopped in: still `Running`
    /// when the iteration budget ran out first.
    ///
    /// # Errors
    ///
    /// The method returns an error if the controller is not `Running`.
    pub fn run(
        &mut self,
        graph: &mut Graph,
        cache: &mut AnalysisCache,
        max_iterations: usize,
    ) -> Result<Phase, ControlError> {
        if self.phase != Phase::Running {
            return Err(ControlError::InvalidPhase {
                operation: "run",
                phase: self.phase,
            });
        }
        self.ensure_simulation(graph, cache);
        for _ in 0..max_iterations {
            if self.phase != Phase::Running {
                break;
            }
            let Some(simulation) = self.simulation.as_mut() else {
                break;
            };
            match simulation.step(graph, &self.settings) {
                StepVerdict::InProgress => (),
                StepVerdict::Converged => self.phase = Phase::Converged,
                StepVerdict::Stalled => self.phase = Phase::Stalled,
            }
        }
        Ok(self.phase)
    }

    /// Build the simulation state if there is none, or rebuild it if the
    /// graph topology changed since it was built. The rebuild is the
    /// required bookkeeping reset: force and velocity accumulators are
    /// meaningless after a topology change.
    fn ensure_simulation(&mut self, graph: &Graph, cache: &mut AnalysisCache) {
        let stale: bool = match &self.simulation {
            Some(s) => s.version() != graph.version(),
            None => true,
        };
        if stale {
            if self.simulation.is_some() {
                debug!("Graph topology changed; rebuilding the simulation state");
            }
            self.simulation = Some(SimulationState::build(
                graph,
                cache.importance(graph),
                &self.settings,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::{NodeId, Point};

    fn single_route() -> (Graph, NodeId, NodeId) {
        let mut graph: Graph = Graph::new();
        let a = graph.add_node("A", Point::new(0.0, 0.0)).unwrap();
        let b = graph.add_node("B", Point::new(25.0, 0.0)).unwrap();
        graph.add_edge(a, b, 10.0).unwrap();
        (graph, a, b)
    }

    #[test]
    fn phase_transitions() {
        let (mut graph, _, _) = single_route();
        let mut cache: AnalysisCache = AnalysisCache::new();
        let mut controller: Controller = Controller::new();
        assert_eq!(controller.phase(), Phase::Idle);

        controller
            .start(&graph, &mut cache, LayoutSettings::default())
            .unwrap();
        assert_eq!(controller.phase(), Phase::Running);

        // Start and step are invalid while running.
        assert!(matches!(
            controller.start(&graph, &mut cache, LayoutSettings::default()),
            Err(ControlError::InvalidPhase { .. })
        ));
        assert!(matches!(
            controller.step(&mut graph, &mut cache),
            Err(ControlError::InvalidPhase { .. })
        ));

        controller.pause().unwrap();
        assert_eq!(controller.phase(), Phase::Paused);
        assert!(matches!(
            controller.pause(),
            Err(ControlError::InvalidPhase { .. })
        ));

        controller.reset();
        assert_eq!(controller.phase(), Phase::Idle);
        assert_eq!(controller.state().iteration, 0);
    }

    #[test]
    fn runs_to_convergence() {
        let (mut graph, _, _) = single_route();
        let mut cache: AnalysisCache = AnalysisCache::new();
        let mut controller: Controller = Controller::new();
        controller
            .start(&graph, &mut cache, LayoutSettings::default())
            .unwrap();

        let phase: Phase = controller.run(&mut graph, &mut cache, 20_000).unwrap();
        assert_eq!(phase, Phase::Converged);
        let state: ControllerState = controller.state();
        assert!(state.iteration > 0);
        assert!(state.convergence_metric < controller.settings().convergence_threshold);
    }

    #[test]
    fn run_budget_leaves_the_controller_running() {
        let (mut graph, _, _) = single_route();
        let mut cache: AnalysisCache = AnalysisCache::new();
        let mut controller: Controller = Controller::new();
        controller
            .start(&graph, &mut cache, LayoutSettings::default())
            .unwrap();
        let phase: Phase = controller.run(&mut graph, &mut cache, 3).unwrap();
        assert_eq!(phase, Phase::Running);
        assert_eq!(controller.state().iteration, 3);
    }

    #[test]
    fn pausing_does_not_perturb_the_trajectory() {
        let settings: LayoutSettings = LayoutSettings::default();

        // Uninterrupted run of 60 iterations.
        let (mut graph_a, a, b) = single_route();
        let mut cache_a: AnalysisCache = AnalysisCache::new();
        let mut straight: Controller = Controller::new();
        straight.start(&graph_a, &mut cache_a, settings).unwrap();
        straight.run(&mut graph_a, &mut cache_a, 60).unwrap();

        // The same run paused and resumed twice.
        let (mut graph_b, _, _) = single_route();
        let mut cache_b: AnalysisCache = AnalysisCache::new();
        let mut interrupted: Controller = Controller::new();
        interrupted.start(&graph_b, &mut cache_b, settings).unwrap();
        interrupted.run(&mut graph_b, &mut cache_b, 17).unwrap();
        interrupted.pause().unwrap();
        interrupted.start(&graph_b, &mut cache_b, settings).unwrap();
        interrupted.run(&mut graph_b, &mut cache_b, 25).unwrap();
        interrupted.pause().unwrap();
        interrupted.start(&graph_b, &mut cache_b, settings).unwrap();
        interrupted.run(&mut graph_b, &mut cache_b, 18).unwrap();

        for id in [a, b] {
            let pa: Point = graph_a.node(id).unwrap().position;
            let pb: Point = graph_b.node(id).unwrap().position;
            assert_eq!(pa, pb, "pausing must reproduce the exact trajectory");
        }
        assert_eq!(straight.state().iteration, interrupted.state().iteration);
    }

    #[test]
    fn single_stepping_from_idle() {
        let (mut graph, _, _) = single_route();
        let mut cache: AnalysisCache = AnalysisCache::new();
        let mut controller: Controller = Controller::new();

        let phase: Phase = controller.step(&mut graph, &mut cache).unwrap();
        assert_eq!(phase, Phase::Paused);
        assert_eq!(controller.state().iteration, 1);

        let phase: Phase = controller.step(&mut graph, &mut cache).unwrap();
        assert_eq!(phase, Phase::Paused);
        assert_eq!(controller.state().iteration, 2);
    }

    #[test]
    fn topology_change_rebuilds_the_simulation() {
        let (mut graph, a, _) = single_route();
        let mut cache: AnalysisCache = AnalysisCache::new();
        let mut controller: Controller = Controller::new();
        controller
            .start(&graph, &mut cache, LayoutSettings::default())
            .unwrap();
        controller.run(&mut graph, &mut cache, 5).unwrap();
        assert_eq!(controller.state().iteration, 5);
        controller.pause().unwrap();

        // A topology edit while paused invalidates the bookkeeping: the
        // next step starts from iteration zero again.
        let c = graph.add_node("C", Point::new(50.0, 0.0)).unwrap();
        graph.add_edge(a, c, 5.0).unwrap();
        controller.step(&mut graph, &mut cache).unwrap();
        assert_eq!(controller.state().iteration, 1);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let (graph, _, _) = single_route();
        let mut cache: AnalysisCache = AnalysisCache::new();
        let mut controller: Controller = Controller::new();
        let mut settings: LayoutSettings = LayoutSettings::default();
        settings.max_step_size = -1.0;
        assert!(matches!(
            controller.start(&graph, &mut cache, settings),
            Err(ControlError::InvalidSettings(_))
        ));
        assert_eq!(controller.phase(), Phase::Idle);
    }
}
