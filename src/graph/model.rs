/*
model.rs

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

//! The mutable graph aggregate and its referential invariants.

use log::debug;
use std::collections::HashMap;
use std::error::Error;
use std::fmt;

use super::edge::{Edge, EdgeId};
use super::label::{Label, LabelAnchor, LabelId};
use super::node::{Node, NodeId, Point};
use super::task::{Task, TaskId};

/// Type of errors raised when a mutation would break the graph invariants.
///
/// A rejected mutation leaves the graph unchanged.
#[derive(Debug, PartialEq)]
pub enum GraphError {
    /// The mutation references a city identifier that does not exist.
    InvalidReference(NodeId),

    /// A city with the same name already exists.
    DuplicateName(String),

    /// The two endpoints of a route are the same city.
    DuplicateEndpoints,

    /// The target length of a route is zero or negative.
    NonPositiveLength,

    /// A task references fewer than two cities.
    TooFewNodes,
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GraphError::InvalidReference(id) => {
                write!(f, "the city with the identifier {id} does not exist")
            }
            GraphError::DuplicateName(name) => {
                write!(f, "a city named {name} already exists")
            }
            GraphError::DuplicateEndpoints => {
                write!(f, "a route cannot connect a city to itself")
            }
            GraphError::NonPositiveLength => {
                write!(f, "the target length of a route must be positive")
            }
            GraphError::TooFewNodes => {
                write!(f, "a task must reference at least two cities")
            }
        }
    }
}

impl Error for GraphError {}

/// Entry returned when enumerating the routes around a city.
pub type Neighbor = (NodeId, EdgeId);

const NO_NEIGHBORS: &[Neighbor] = &[];

/// The map graph: cities, routes, labels, and tasks.
#[derive(Debug, Default, Clone)]
pub struct Graph {
    /// Cities, by identifier.
    nodes: HashMap<NodeId, Node>,

    /// Routes, by identifier.
    edges: HashMap<EdgeId, Edge>,

    /// Label anchors, by identifier.
    labels: HashMap<LabelId, Label>,

    /// Tasks, by identifier.
    tasks: HashMap<TaskId, Task>,

    /// For each city, the adjacent cities and the connecting routes,
    /// ordered by route identifier.
    adjacency: HashMap<NodeId, Vec<Neighbor>>,

    /// City name index, for uniqueness checks and name lookups.
    names: HashMap<String, NodeId>,

    /// Identifier allocators. Identifiers are never reused.
    next_node_id: NodeId,
    next_edge_id: EdgeId,
    next_label_id: LabelId,
    next_task_id: TaskId,

    /// Topology version. Incremented by every mutation that can change an
    /// analysis result. Moving positions or labels does not count.
    version: u64,
}

impl Graph {
    /// Create an empty [`Graph`] object.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current topology version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Number of cities.
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of routes.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    /// Look up a city.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Look up a city by its display name.
    pub fn node_by_name(&self, name: &str) -> Option<&Node> {
        self.names.get(name).and_then(|id| self.nodes.get(id))
    }

    /// Look up a route.
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Look up a label anchor.
    pub fn label(&self, id: LabelId) -> Option<&Label> {
        self.labels.get(&id)
    }

    /// Look up a task.
    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Iterate over the label anchors, in unspecified order.
    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }

    /// Iterate over the tasks, in unspecified order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    /// City identifiers in ascending order. The analysis and layout code
    /// iterates in this order so that results are deterministic.
    pub fn sorted_node_ids(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Route identifiers in ascending order.
    pub fn sorted_edge_ids(&self) -> Vec<EdgeId> {
        let mut ids: Vec<EdgeId> = self.edges.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Task identifiers in ascending order.
    pub fn sorted_task_ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self.tasks.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// The adjacent cities of the given city with the connecting routes,
    /// ordered by route identifier.
    pub fn neighbors(&self, id: NodeId) -> &[Neighbor] {
        match self.adjacency.get(&id) {
            Some(a) => a,
            None => NO_NEIGHBORS,
        }
    }

    /// Number of routes around the given city.
    pub fn degree(&self, id: NodeId) -> usize {
        self.neighbors(id).len()
    }

    /// Current rendered length of the given route, from the positions of
    /// its two cities.
    pub fn rendered_length(&self, id: EdgeId) -> Option<f64> {
        let edge: &Edge = self.edges.get(&id)?;
        let a: &Node = self.nodes.get(&edge.endpoints.0)?;
        let b: &Node = self.nodes.get(&edge.endpoints.1)?;
        Some(a.position.distance(&b.position))
    }

    /// Position of the given label anchor on the canvas: the city position,
    /// or the midpoint of the route, plus the label offset.
    pub fn label_position(&self, id: LabelId) -> Option<Point> {
        let label: &Label = self.labels.get(&id)?;
        self.anchor_position(label.anchor)
            .map(|p| p.translate(&label.offset))
    }

    /// Position of the entity that a label is attached to.
    pub fn anchor_position(&self, anchor: LabelAnchor) -> Option<Point> {
        match anchor {
            LabelAnchor::Node(id) => self.nodes.get(&id).map(|n| n.position),
            LabelAnchor::Edge(id) => {
                let edge: &Edge = self.edges.get(&id)?;
                let a: &Node = self.nodes.get(&edge.endpoints.0)?;
                let b: &Node = self.nodes.get(&edge.endpoints.1)?;
                Some(a.position.midpoint(&b.position))
            }
        }
    }

    /// Add a city.
    ///
    /// # Errors
    ///
    /// The method returns an error if a city with the same name already
    /// exists.
    pub fn add_node(&mut self, name: &str, position: Point) -> Result<NodeId, GraphError> {
        if self.names.contains_key(name) {
            return Err(GraphError::DuplicateName(name.to_string()));
        }
        let id: NodeId = self.next_node_id;
        self.next_node_id += 1;
        let label: LabelId = self.add_label(LabelAnchor::Node(id));
        self.nodes.insert(
            id,
            Node {
                id,
                name: name.to_string(),
                position,
                image: None,
                label,
            },
        );
        self.names.insert(name.to_string(), id);
        self.adjacency.insert(id, Vec::new());
        self.version += 1;
        debug!("Added city {id} ({name}), version {}", self.version);
        Ok(id)
    }

    /// Add a route between two cities.
    ///
    /// # Errors
    ///
    /// The method returns an error if an endpoint does not exist, if both
    /// endpoints are the same city, or if the target length is not
    /// positive.
    pub fn add_edge(
        &mut self,
        a: NodeId,
        b: NodeId,
        target_length: f64,
    ) -> Result<EdgeId, GraphError> {
        if a == b {
            return Err(GraphError::DuplicateEndpoints);
        }
        if !self.nodes.contains_key(&a) {
            return Err(GraphError::InvalidReference(a));
        }
        if !self.nodes.contains_key(&b) {
            return Err(GraphError::InvalidReference(b));
        }
        if !(target_length > 0.0) {
            return Err(GraphError::NonPositiveLength);
        }
        let id: EdgeId = self.next_edge_id;
        self.next_edge_id += 1;
        let label: LabelId = self.add_label(LabelAnchor::Edge(id));
        self.edges.insert(
            id,
            Edge {
                id,
                endpoints: (a, b),
                target_length,
                color: String::new(),
                label,
            },
        );
        self.link(a, b, id);
        self.link(b, a, id);
        self.version += 1;
        debug!("Added route {id} ({a}-{b}), version {}", self.version);
        Ok(id)
    }

    /// Add a task. The first and last cities are the task endpoints.
    ///
    /// # Errors
    ///
    /// The method returns an error if fewer than two cities are given, or
    /// if a referenced city does not exist.
    pub fn add_task(
        &mut self,
        nodes: Vec<NodeId>,
        reward: f64,
        penalty: Option<f64>,
    ) -> Result<TaskId, GraphError> {
        if nodes.len() < 2 {
            return Err(GraphError::TooFewNodes);
        }
        if let Some(missing) = nodes.iter().find(|id| !self.nodes.contains_key(id)) {
            return Err(GraphError::InvalidReference(*missing));
        }
        let id: TaskId = self.next_task_id;
        self.next_task_id += 1;
        self.tasks.insert(
            id,
            Task {
                id,
                nodes,
                reward,
                penalty,
            },
        );
        self.version += 1;
        debug!("Added task {id}, version {}", self.version);
        Ok(id)
    }

    /// Remove a city, along with its routes and every task that references
    /// it.
    ///
    /// # Errors
    ///
    /// The method returns an error if the city does not exist.
    pub fn remove_node(&mut self, id: NodeId) -> Result<(), GraphError> {
        let node: Node = self
            .nodes
            .remove(&id)
            .ok_or(GraphError::InvalidReference(id))?;

        let incident: Vec<EdgeId> = self.neighbors(id).iter().map(|(_, e)| *e).collect();
        for edge_id in incident {
            self.drop_edge(edge_id);
        }
        let referencing: Vec<TaskId> = self
            .tasks
            .values()
            .filter(|t| t.nodes.contains(&id))
            .map(|t| t.id)
            .collect();
        for task_id in referencing {
            self.tasks.remove(&task_id);
            debug!("Removed task {task_id} referencing city {id}");
        }

        self.labels.remove(&node.label);
        self.names.remove(&node.name);
        self.adjacency.remove(&id);
        self.version += 1;
        debug!("Removed city {id}, version {}", self.version);
        Ok(())
    }

    /// Remove a route.
    ///
    /// # Errors
    ///
    /// The method returns an error if the route does not exist.
    pub fn remove_edge(&mut self, id: EdgeId) -> Result<(), GraphError> {
        if !self.edges.contains_key(&id) {
            return Err(GraphError::InvalidReference(id));
        }
        self.drop_edge(id);
        self.version += 1;
        debug!("Removed route {id}, version {}", self.version);
        Ok(())
    }

    /// Remove a task.
    ///
    /// # Errors
    ///
    /// The method returns an error if the task does not exist.
    pub fn remove_task(&mut self, id: TaskId) -> Result<(), GraphError> {
        if self.tasks.remove(&id).is_none() {
            return Err(GraphError::InvalidReference(id));
        }
        self.version += 1;
        debug!("Removed task {id}, version {}", self.version);
        Ok(())
    }

    /// Move a city. Does not bump the topology version: positions do not
    /// change analysis results.
    ///
    /// # Errors
    ///
    /// The method returns an error if the city does not exist.
    pub fn set_position(&mut self, id: NodeId, position: Point) -> Result<(), GraphError> {
        match self.nodes.get_mut(&id) {
            Some(n) => {
                n.position = position;
                Ok(())
            }
            None => Err(GraphError::InvalidReference(id)),
        }
    }

    /// Move a label anchor. Does not bump the topology version.
    ///
    /// # Errors
    ///
    /// The method returns an error if the label does not exist.
    pub fn set_label_offset(&mut self, id: LabelId, offset: Point) -> Result<(), GraphError> {
        match self.labels.get_mut(&id) {
            Some(l) => {
                l.offset = offset;
                Ok(())
            }
            None => Err(GraphError::InvalidReference(id)),
        }
    }

    /// Rename a city.
    ///
    /// # Errors
    ///
    /// The method returns an error if the city does not exist or if the new
    /// name is already taken by another city.
    pub fn rename_node(&mut self, id: NodeId, name: &str) -> Result<(), GraphError> {
        if let Some(other) = self.names.get(name)
            && *other != id
        {
            return Err(GraphError::DuplicateName(name.to_string()));
        }
        match self.nodes.get_mut(&id) {
            Some(node) => {
                self.names.remove(&node.name);
                node.name = name.to_string();
                self.names.insert(name.to_string(), id);
                Ok(())
            }
            None => Err(GraphError::InvalidReference(id)),
        }
    }

    /// Set the illustration of a city.
    ///
    /// # Errors
    ///
    /// The method returns an error if the city does not exist.
    pub fn set_node_image(&mut self, id: NodeId, image: Option<String>) -> Result<(), GraphError> {
        match self.nodes.get_mut(&id) {
            Some(n) => {
                n.image = image;
                Ok(())
            }
            None => Err(GraphError::InvalidReference(id)),
        }
    }

    /// Set the color of a route.
    ///
    /// # Errors
    ///
    /// The method returns an error if the route does not exist.
    pub fn set_edge_color(&mut self, id: EdgeId, color: &str) -> Result<(), GraphError> {
        match self.edges.get_mut(&id) {
            Some(e) => {
                e.color = color.to_string();
                Ok(())
            }
            None => Err(GraphError::InvalidReference(id)),
        }
    }

    /// Change the target length of a route. Bumps the topology version,
    /// because target lengths are the weights of the analysis engine.
    ///
    /// # Errors
    ///
    /// The method returns an error if the route does not exist or if the
    /// length is not positive.
    pub fn set_target_length(&mut self, id: EdgeId, target_length: f64) -> Result<(), GraphError> {
        if !(target_length > 0.0) {
            return Err(GraphError::NonPositiveLength);
        }
        match self.edges.get_mut(&id) {
            Some(e) => {
                e.target_length = target_length;
                self.version += 1;
                Ok(())
            }
            None => Err(GraphError::InvalidReference(id)),
        }
    }

    /// Allocate a label anchor for the given entity.
    fn add_label(&mut self, anchor: LabelAnchor) -> LabelId {
        let id: LabelId = self.next_label_id;
        self.next_label_id += 1;
        self.labels.insert(
            id,
            Label {
                id,
                anchor,
                offset: Point::default(),
            },
        );
        id
    }

    /// Record the route in the adjacency list of one of its endpoints,
    /// keeping the list ordered by route identifier.
    fn link(&mut self, from: NodeId, to: NodeId, edge: EdgeId) {
        let entry: &mut Vec<Neighbor> = self.adjacency.entry(from).or_default();
        let pos: usize = entry.partition_point(|(_, e)| *e < edge);
        entry.insert(pos, (to, edge));
    }

    /// Remove a route, its label, and its adjacency entries. The caller
    /// bumps the version.
    fn drop_edge(&mut self, id: EdgeId) {
        if let Some(edge) = self.edges.remove(&id) {
            self.labels.remove(&edge.label);
            for endpoint in [edge.endpoints.0, edge.endpoints.1] {
                if let Some(entry) = self.adjacency.get_mut(&endpoint) {
                    entry.retain(|(_, e)| *e != id);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_graph() -> (Graph, NodeId, NodeId, NodeId) {
        let mut graph: Graph = Graph::new();
        let a = graph.add_node("Amsterdam", Point::new(0.0, 0.0)).unwrap();
        let b = graph.add_node("Brussels", Point::new(3.0, 0.0)).unwrap();
        let c = graph.add_node("Cologne", Point::new(3.0, 4.0)).unwrap();
        (graph, a, b, c)
    }

    #[test]
    fn rejects_duplicate_names() {
        let (mut graph, _, _, _) = small_graph();
        assert_eq!(
            graph.add_node("Brussels", Point::new(9.0, 9.0)),
            Err(GraphError::DuplicateName("Brussels".to_string()))
        );
        assert_eq!(graph.num_nodes(), 3);
    }

    #[test]
    fn rejects_invalid_edges() {
        let (mut graph, a, b, _) = small_graph();
        assert_eq!(graph.add_edge(a, a, 3.0), Err(GraphError::DuplicateEndpoints));
        assert_eq!(graph.add_edge(a, 999, 3.0), Err(GraphError::InvalidReference(999)));
        assert_eq!(graph.add_edge(a, b, 0.0), Err(GraphError::NonPositiveLength));
        assert_eq!(graph.add_edge(a, b, -1.0), Err(GraphError::NonPositiveLength));
        assert_eq!(graph.num_edges(), 0);
    }

    #[test]
    fn rejects_invalid_tasks() {
        let (mut graph, a, _, _) = small_graph();
        assert_eq!(graph.add_task(vec![a], 10.0, None), Err(GraphError::TooFewNodes));
        assert_eq!(
            graph.add_task(vec![a, 999], 10.0, None),
            Err(GraphError::InvalidReference(999))
        );
    }

    #[test]
    fn adjacency_follows_edits() {
        let (mut graph, a, b, c) = small_graph();
        let ab = graph.add_edge(a, b, 3.0).unwrap();
        let bc = graph.add_edge(b, c, 4.0).unwrap();
        assert_eq!(graph.neighbors(b), &[(a, ab), (c, bc)]);
        assert_eq!(graph.degree(b), 2);

        graph.remove_edge(ab).unwrap();
        assert_eq!(graph.neighbors(b), &[(c, bc)]);
        assert_eq!(graph.neighbors(a), &[]);
    }

    #[test]
    fn edge_add_remove_round_trip() {
        let (mut graph, a, b, c) = small_graph();
        graph.add_edge(a, b, 3.0).unwrap();
        graph.add_task(vec![a, c], 10.0, None).unwrap();

        let nodes_before: Vec<(NodeId, String)> = graph
            .sorted_node_ids()
            .iter()
            .map(|id| (*id, graph.node(*id).unwrap().name.clone()))
            .collect();
        let edges_before: Vec<EdgeId> = graph.sorted_edge_ids();
        let tasks_before: Vec<TaskId> = graph.sorted_task_ids();

        let bc = graph.add_edge(b, c, 4.0).unwrap();
        graph.remove_edge(bc).unwrap();

        let nodes_after: Vec<(NodeId, String)> = graph
            .sorted_node_ids()
            .iter()
            .map(|id| (*id, graph.node(*id).unwrap().name.clone()))
            .collect();
        assert_eq!(nodes_before, nodes_after);
        assert_eq!(edges_before, graph.sorted_edge_ids());
        assert_eq!(tasks_before, graph.sorted_task_ids());
        assert_eq!(graph.neighbors(b).len(), 1);
        assert_eq!(graph.neighbors(c), &[]);
    }

    #[test]
    fn removing_a_node_cascades() {
        let (mut graph, a, b, c) = small_graph();
        let ab = graph.add_edge(a, b, 3.0).unwrap();
        let bc = graph.add_edge(b, c, 4.0).unwrap();
        let t1 = graph.add_task(vec![a, b], 5.0, None).unwrap();
        let t2 = graph.add_task(vec![a, c], 10.0, Some(2.0)).unwrap();
        let b_label = graph.node(b).unwrap().label;

        graph.remove_node(b).unwrap();
        assert!(graph.node(b).is_none());
        assert!(graph.edge(ab).is_none());
        assert!(graph.edge(bc).is_none());
        assert!(graph.label(b_label).is_none());
        assert!(graph.task(t1).is_none(), "task referencing b must go");
        assert!(graph.task(t2).is_some());
        assert_eq!(graph.neighbors(a), &[]);
        assert!(graph.node_by_name("Brussels").is_none());
    }

    #[test]
    fn version_tracks_topology_only() {
        let (mut graph, a, b, _) = small_graph();
        let v: u64 = graph.version();
        graph.set_position(a, Point::new(1.0, 1.0)).unwrap();
        let label = graph.node(a).unwrap().label;
        graph.set_label_offset(label, Point::new(0.5, 0.5)).unwrap();
        assert_eq!(graph.version(), v);

        let ab = graph.add_edge(a, b, 3.0).unwrap();
        assert_eq!(graph.version(), v + 1);
        graph.set_target_length(ab, 5.0).unwrap();
        assert_eq!(graph.version(), v + 2);
    }

    #[test]
    fn labels_follow_their_anchors() {
        let (mut graph, a, b, _) = small_graph();
        let ab = graph.add_edge(a, b, 3.0).unwrap();
        let edge_label = graph.edge(ab).unwrap().label;
        graph
            .set_label_offset(edge_label, Point::new(0.0, 1.0))
            .unwrap();

        // Edge labels sit at the route midpoint plus the offset.
        let pos: Point = graph.label_position(edge_label).unwrap();
        assert_eq!(pos, Point::new(1.5, 1.0));
    }

    #[test]
    fn rendered_length_follows_positions() {
        let (mut graph, a, b, c) = small_graph();
        let ab = graph.add_edge(a, b, 3.0).unwrap();
        let bc = graph.add_edge(b, c, 4.0).unwrap();
        assert_eq!(graph.rendered_length(ab), Some(3.0));
        assert_eq!(graph.rendered_length(bc), Some(4.0));
        graph.set_position(a, Point::new(3.0, 3.0)).unwrap();
        assert_eq!(graph.rendered_length(ab), Some(3.0));
    }
}
