/*
session.rs

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

//! Editing session tying the map, the analysis cache, and the optimizer
//! together.
//!
//! The session enforces the one rule the parts cannot enforce on their own:
//! the graph topology must not change while the optimizer is in the
//! `Running` phase. Structural edits go through the session and are
//! rejected with [`SessionError::OptimizerRunning`] until the optimizer is
//! paused or reset. Moving a city or a label is always allowed; the
//! simulation picks the new position up on its next iteration.

use std::error::Error;
use std::fmt;

use crate::analysis::cache::AnalysisCache;
use crate::analysis::shortest_path::{AnalysisError, RoutePath, shortest_path};
use crate::analysis::stats::DegreeStats;
use crate::analysis::tasks::{TaskScore, score_task};
use crate::graph::edge::EdgeId;
use crate::graph::label::LabelId;
use crate::graph::model::{Graph, GraphError};
use crate::graph::node::{NodeId, Point};
use crate::graph::task::TaskId;
use crate::layout::controller::{ControlError, Controller, ControllerState, Phase};
use crate::layout::settings::LayoutSettings;

/// Type of errors raised by the editing session.
#[derive(Debug, PartialEq)]
pub enum SessionError {
    /// A structural edit was attempted while the optimizer is running.
    OptimizerRunning,

    /// The given task does not exist.
    UnknownTask(TaskId),

    /// The underlying graph operation failed.
    Graph(GraphError),

    /// The optimizer operation failed.
    Control(ControlError),

    /// The analysis operation failed.
    Analysis(AnalysisError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionError::OptimizerRunning => {
                write!(f, "pause or reset the optimizer before editing the map")
            }
            SessionError::UnknownTask(id) => write!(f, "no task with the identifier {id}"),
            SessionError::Graph(e) => write!(f, "{e}"),
            SessionError::Control(e) => write!(f, "{e}"),
            SessionError::Analysis(e) => write!(f, "{e}"),
        }
    }
}

impl Error for SessionError {}

impl From<GraphError> for SessionError {
    fn from(e: GraphError) -> Self {
        SessionError::Graph(e)
    }
}

impl From<ControlError> for SessionError {
    fn from(e: ControlError) -> Self {
        SessionError::Control(e)
    }
}

impl From<AnalysisError> for SessionError {
    fn from(e: AnalysisError) -> Self {
        SessionError::Analysis(e)
    }
}

/// An editing session over one map.
#[derive(Default)]
pub struct Session {
    graph: Graph,
    cache: AnalysisCache,
    controller: Controller,
}

impl Session {
    /// Create a [`Session`] object over an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`Session`] object over an existing map.
    pub fn from_graph(graph: Graph) -> Self {
        Self {
            graph,
            cache: AnalysisCache::new(),
            controller: Controller::new(),
        }
    }

    /// Read access to the map.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Consume the session and return the map, for saving.
    pub fn into_graph(self) -> Graph {
        self.graph
    }

    /// Whether structural edits are allowed right now.
    fn guard_edit(&self) -> Result<(), SessionError> {
        if self.controller.phase() == Phase::Running {
            return Err(SessionError::OptimizerRunning);
        }
        Ok(())
    }

    /// Add a city to the map.
    ///
    /// # Errors
    ///
    /// The method returns an error if the optimizer is running or if the
    /// name is already taken.
    pub fn add_node(&mut self, name: &str, position: Point) -> Result<NodeId, SessionError> {
        self.guard_edit()?;
        Ok(self.graph.add_node(name, position)?)
    }

    /// Add a route between two cities.
    ///
    /// # Errors
    ///
    /// The method returns an error if the optimizer is running, if an
    /// endpoint does not exist, if the endpoints are the same city, or if
    /// the target length is not positive.
    pub fn add_edge(
        &mut self,
        from: NodeId,
        to: NodeId,
        target_length: f64,
    ) -> Result<EdgeId, SessionError> {
        self.guard_edit()?;
        Ok(self.graph.add_edge(from, to, target_length)?)
    }

    /// Add a connection task.
    ///
    /// # Errors
    ///
    /// The method returns an error if the optimizer is running, if the task
    /// visits fewer than two cities, or if a city does not exist.
    pub fn add_task(
        &mut self,
        nodes: Vec<NodeId>,
        reward: f64,
        penalty: Option<f64>,
    ) -> Result<TaskId, SessionError> {
        self.guard_edit()?;
        Ok(self.graph.add_task(nodes, reward, penalty)?)
    }

    /// Remove a city, its incident routes, and the tasks visiting it.
    ///
    /// # Errors
    ///
    /// The method returns an error if the optimizer is running or if the
    /// city does not exist.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), SessionError> {
        self.guard_edit()?;
        Ok(self.graph.remove_node(id)?)
    }

    /// Remove a route.
    ///
    /// # Errors
    ///
    /// The method returns an error if the optimizer is running or if the
    /// route does not exist.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<(), SessionError> {
        self.guard_edit()?;
        Ok(self.graph.remove_edge(id)?)
    }

    /// Remove a task.
    ///
    /// # Errors
    ///
    /// The method returns an error if the optimizer is running or if the
    /// task does not exist.
    pub fn remove_task(&mut self, id: TaskId) -> Result<(), SessionError> {
        self.guard_edit()?;
        Ok(self.graph.remove_task(id)?)
    }

    /// Change the target length of a route. This is a structural edit: the
    /// analysis results and the running simulation depend on it.
    ///
    /// # Errors
    ///
    /// The method returns an error if the optimizer is running, if the
    /// route does not exist, or if the length is not positive.
    pub fn set_target_length(&mut self, id: EdgeId, target_length: f64) -> Result<(), SessionError> {
        self.guard_edit()?;
        Ok(self.graph.set_target_length(id, target_length)?)
    }

    /// Move a city. Allowed in every optimizer phase.
    ///
    /// # Errors
    ///
    /// The method returns an error if the city does not exist.
    pub fn set_position(&mut self, id: NodeId, position: Point) -> Result<(), SessionError> {
        Ok(self.graph.set_position(id, position)?)
    }

    /// Move a label relative to its anchor. Allowed in every optimizer
    /// phase.
    ///
    /// # Errors
    ///
    /// The method returns an error if the label does not exist.
    pub fn set_label_offset(&mut self, id: LabelId, offset: Point) -> Result<(), SessionError> {
        Ok(self.graph.set_label_offset(id, offset)?)
    }

    /// Rename a city.
    ///
    /// # Errors
    ///
    /// The method returns an error if the city does not exist or if the
    /// name is already taken.
    pub fn rename_node(&mut self, id: NodeId, name: &str) -> Result<(), SessionError> {
        Ok(self.graph.rename_node(id, name)?)
    }

    /// Shortest path between two cities by target length.
    ///
    /// # Errors
    ///
    /// The method returns an error if a city does not exist or if the
    /// cities are not connected.
    pub fn shortest_path(&self, from: NodeId, to: NodeId) -> Result<RoutePath, SessionError> {
        Ok(shortest_path(&self.graph, from, to)?)
    }

    /// Importance score of a route, in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// The method returns an error if the route does not exist.
    pub fn route_importance(&mut self, id: EdgeId) -> Result<f64, SessionError> {
        if self.graph.edge(id).is_none() {
            return Err(SessionError::Graph(GraphError::InvalidReference(id)));
        }
        Ok(self
            .cache
            .importance(&self.graph)
            .get(&id)
            .copied()
            .unwrap_or(0.0))
    }

    /// Evaluate a task against the current topology.
    ///
    /// # Errors
    ///
    /// The method returns an error if the task does not exist.
    pub fn score_task(&mut self, id: TaskId) -> Result<TaskScore, SessionError> {
        let task = self
            .graph
            .task(id)
            .cloned()
            .ok_or(SessionError::UnknownTask(id))?;
        Ok(score_task(&self.graph, &task)?)
    }

    /// Degree and connectivity statistics of the map.
    pub fn degree_stats(&mut self) -> DegreeStats {
        self.cache.stats(&self.graph).clone()
    }

    /// Start or resume the layout optimizer.
    ///
    /// # Errors
    ///
    /// The method returns an error if the settings are invalid or if the
    /// optimizer is in a phase it cannot start from.
    pub fn optimize_start(&mut self, settings: LayoutSettings) -> Result<(), SessionError> {
        Ok(self
            .controller
            .start(&self.graph, &mut self.cache, settings)?)
    }

    /// Pause the layout optimizer.
    ///
    /// # Errors
    ///
    /// The method returns an error if the optimizer is not running.
    pub fn optimize_pause(&mut self) -> Result<(), SessionError> {
        Ok(self.controller.pause()?)
    }

    /// Discard the optimizer state. Valid in any phase.
    pub fn optimize_reset(&mut self) {
        self.controller.reset();
    }

    /// Run a single optimizer iteration.
    ///
    /// # Errors
    ///
    /// The method returns an error if the optimizer is running, converged,
    /// or stalled.
    pub fn optimize_step(&mut self) -> Result<Phase, SessionError> {
        Ok(self.controller.step(&mut self.graph, &mut self.cache)?)
    }

    /// Drive the optimizer for up to `max_iterations` iterations.
    ///
    /// # Errors
    ///
    /// The method returns an error if the optimizer is not running.
    pub fn optimize_run(&mut self, max_iterations: usize) -> Result<Phase, SessionError> {
        Ok(self
            .controller
            .run(&mut self.graph, &mut self.cache, max_iterations)?)
    }

    /// Snapshot of the optimizer phase, metric, and iteration counter.
    pub fn optimizer_state(&self) -> ControllerState {
        self.controller.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_map() -> (Session, NodeId, NodeId) {
        let mut session: Session = Session::new();
        let a = session.add_node("A", Point::new(0.0, 0.0)).unwrap();
        let b = session.add_node("B", Point::new(25.0, 0.0)).unwrap();
        session.add_edge(a, b, 10.0).unwrap();
        (session, a, b)
    }

    #[test]
    fn structural_edits_are_rejected_while_running() {
        let (mut session, a, b) = small_map();
        session.optimize_start(LayoutSettings::default()).unwrap();

        assert_eq!(
            session.add_node("C", Point::new(5.0, 5.0)),
            Err(SessionError::OptimizerRunning)
        );
        assert_eq!(session.add_edge(a, b, 4.0), Err(SessionError::OptimizerRunning));
        assert_eq!(session.remove_node(a), Err(SessionError::OptimizerRunning));
        assert_eq!(
            session.set_target_length(0, 12.0),
            Err(SessionError::OptimizerRunning)
        );

        // Geometry edits stay allowed.
        session.set_position(a, Point::new(1.0, 1.0)).unwrap();

        // Pausing reopens the map for editing.
        session.optimize_pause().unwrap();
        session.add_node("C", Point::new(5.0, 5.0)).unwrap();
    }

    #[test]
    fn edits_resume_after_reset() {
        let (mut session, a, _) = small_map();
        session.optimize_start(LayoutSettings::default()).unwrap();
        session.optimize_run(5).unwrap();
        session.optimize_reset();
        session.remove_node(a).unwrap();
        assert_eq!(session.graph().num_nodes(), 1);
    }

    #[test]
    fn analysis_passthrough() {
        let (mut session, a, b) = small_map();
        let c = session.add_node("C", Point::new(50.0, 0.0)).unwrap();
        let bc = session.add_edge(b, c, 4.0).unwrap();

        let path: RoutePath = session.shortest_path(a, c).unwrap();
        assert_eq!(path.nodes, vec![a, b, c]);
        assert_eq!(path.weight, 14.0);

        assert_eq!(session.route_importance(bc).unwrap(), 1.0);
        assert_eq!(
            session.route_importance(999),
            Err(SessionError::Graph(GraphError::InvalidReference(999)))
        );

        let task = session.add_task(vec![a, c], 10.0, None).unwrap();
        let score: TaskScore = session.score_task(task).unwrap();
        assert!(score.on_optimal_path);
        assert_eq!(score.achieved_reward, 10.0);
        assert_eq!(session.score_task(999), Err(SessionError::UnknownTask(999)));

        assert_eq!(session.degree_stats().components.len(), 1);
    }

    #[test]
    fn entity_edits_pass_through() {
        let (mut session, a, _) = small_map();
        session.rename_node(a, "Aachen").unwrap();
        assert!(session.graph().node_by_name("Aachen").is_some());
        assert_eq!(
            session.rename_node(a, "B"),
            Err(SessionError::Graph(GraphError::DuplicateName(
                String::from("B")
            )))
        );

        let label = session.graph().node(a).unwrap().label;
        session.set_label_offset(label, Point::new(0.5, 0.5)).unwrap();
        assert_eq!(
            session.graph().label(label).unwrap().offset,
            Point::new(0.5, 0.5)
        );

        let b = session.graph().node_by_name("B").unwrap().id;
        let task = session.add_task(vec![a, b], 5.0, None).unwrap();
        session.remove_task(task).unwrap();
        let edge = session.graph().sorted_edge_ids()[0];
        session.remove_edge(edge).unwrap();
        assert_eq!(session.into_graph().num_edges(), 0);
    }

    #[test]
    fn single_stepping_leaves_the_session_paused() {
        let (mut session, _, _) = small_map();
        let phase: Phase = session.optimize_step().unwrap();
        assert_eq!(phase, Phase::Paused);
        assert_eq!(session.optimizer_state().iteration, 1);
    }

    #[test]
    fn optimizing_converges_and_keeps_the_map_editable() {
        let (mut session, _, _) = small_map();
        session.optimize_start(LayoutSettings::default()).unwrap();
        let phase: Phase = session.optimize_run(20_000).unwrap();
        assert_eq!(phase, Phase::Converged);

        // Converged is not Running: editing is allowed again.
        session.add_node("C", Point::new(5.0, 5.0)).unwrap();
        session.optimize_reset();
        assert_eq!(session.optimizer_state().phase, Phase::Idle);
    }
}
