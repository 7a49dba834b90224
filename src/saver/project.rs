/*
project.rs

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

//! Save and restore map projects.
//!
//! A project is a JSON serialization of the map, produced with [`serde`].
//! Cities are referenced by name in the file: names are unique within a
//! map, they survive reordering, and the file stays readable and editable
//! by hand. Internal identifiers are reallocated when the file is loaded.

use log::debug;
use std::error::Error;
use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::graph::model::Graph;
use crate::graph::node::Point;

/// Type of errors raised when a project file references unknown entities.
#[derive(Debug, PartialEq)]
pub enum ProjectError {
    /// A route or a task references a city name that the file does not
    /// define.
    UnknownCity(String),
}

impl fmt::Display for ProjectError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProjectError::UnknownCity(name) => {
                write!(f, "the project file references the unknown city {name:?}")
            }
        }
    }
}

impl Error for ProjectError {}

/// One city in the project file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProjectNode {
    /// City name, unique within the map.
    pub name: String,

    /// Position on the canvas.
    pub x: f64,
    pub y: f64,

    /// Optional image attached to the city.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Label offset relative to the city.
    pub label_offset: (f64, f64),
}

/// One route in the project file. Endpoints are city names.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProjectEdge {
    pub from: String,
    pub to: String,
    pub target_length: f64,
    pub color: String,

    /// Label offset relative to the route midpoint.
    pub label_offset: (f64, f64),
}

/// One connection task in the project file, as the ordered list of city
/// names to visit.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProjectTask {
    pub nodes: Vec<String>,
    pub reward: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub penalty: Option<f64>,
}

/// Serialized form of a whole map project.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ProjectFile {
    /// Timestamp of the last save, in RFC 3339 format.
    pub modified: String,

    pub nodes: Vec<ProjectNode>,
    pub edges: Vec<ProjectEdge>,
    pub tasks: Vec<ProjectTask>,
}

impl ProjectFile {
    /// Capture the given map. Cities, routes, and tasks are written in
    /// ascending identifier order so saving the same map twice produces
    /// the same file.
    pub fn from_graph(graph: &Graph) -> Self {
        let mut nodes: Vec<ProjectNode> = Vec::with_capacity(graph.num_nodes());
        for id in graph.sorted_node_ids() {
            if let Some(node) = graph.node(id) {
                let offset: Point = graph
                    .label(node.label)
                    .map(|l| l.offset)
                    .unwrap_or_default();
                nodes.push(ProjectNode {
                    name: node.name.clone(),
                    x: node.position.x,
                    y: node.position.y,
                    image: node.image.clone(),
                    label_offset: (offset.x, offset.y),
                });
            }
        }

        let mut edges: Vec<ProjectEdge> = Vec::with_capacity(graph.num_edges());
        for id in graph.sorted_edge_ids() {
            if let Some(edge) = graph.edge(id)
                && let (Some(from), Some(to)) =
                    (graph.node(edge.endpoints.0), graph.node(edge.endpoints.1))
            {
                let offset: Point = graph
                    .label(edge.label)
                    .map(|l| l.offset)
                    .unwrap_or_default();
                edges.push(ProjectEdge {
                    from: from.name.clone(),
                    to: to.name.clone(),
                    target_length: edge.target_length,
                    color: edge.color.clone(),
                    label_offset: (offset.x, offset.y),
                });
            }
        }

        let mut tasks: Vec<ProjectTask> = Vec::new();
        for id in graph.sorted_task_ids() {
            if let Some(task) = graph.task(id) {
                let names: Option<Vec<String>> = task
                    .nodes
                    .iter()
                    .map(|n| graph.node(*n).map(|node| node.name.clone()))
                    .collect();
                if let Some(nodes) = names {
                    tasks.push(ProjectTask {
                        nodes,
                        reward: task.reward,
                        penalty: task.penalty,
                    });
                }
            }
        }

        Self {
            modified: Local::now().to_rfc3339(),
            nodes,
            edges,
            tasks,
        }
    }

    /// Rebuild a map from the file.
    ///
    /// # Errors
    ///
    /// The method returns an error if the file references an unknown city
    /// name or if an entry violates a map constraint, such as a duplicate
    /// city name or a non-positive route length.
    pub fn build_graph(&self) -> Result<Graph, Box<dyn Error>> {
        let mut graph: Graph = Graph::new();

        for node in &self.nodes {
            let id = graph.add_node(&node.name, Point::new(node.x, node.y))?;
            if node.image.is_some() {
                graph.set_node_image(id, node.image.clone())?;
            }
            if let Some(label) = graph.node(id).map(|n| n.label) {
                graph.set_label_offset(
                    label,
                    Point::new(node.label_offset.0, node.label_offset.1),
                )?;
            }
        }

        for edge in &self.edges {
            let from = graph
                .node_by_name(&edge.from)
                .map(|n| n.id)
                .ok_or_else(|| ProjectError::UnknownCity(edge.from.clone()))?;
            let to = graph
                .node_by_name(&edge.to)
                .map(|n| n.id)
                .ok_or_else(|| ProjectError::UnknownCity(edge.to.clone()))?;
            let id = graph.add_edge(from, to, edge.target_length)?;
            graph.set_edge_color(id, &edge.color)?;
            if let Some(label) = graph.edge(id).map(|e| e.label) {
                graph.set_label_offset(
                    label,
                    Point::new(edge.label_offset.0, edge.label_offset.1),
                )?;
            }
        }

        for task in &self.tasks {
            let mut nodes: Vec<_> = Vec::with_capacity(task.nodes.len());
            for name in &task.nodes {
                let id = graph
                    .node_by_name(name)
                    .map(|n| n.id)
                    .ok_or_else(|| ProjectError::UnknownCity(name.clone()))?;
                nodes.push(id);
            }
            graph.add_task(nodes, task.reward, task.penalty)?;
        }

        Ok(graph)
    }
}

/// Object to save and restore a map project.
pub struct SaverProject {
    /// Absolute path to the project file.
    project_file: PathBuf,
}

impl SaverProject {
    /// Create a [`SaverProject`] object for the given project file path.
    pub fn new(project_file: PathBuf) -> Self {
        debug!("Project file: {project_file:?}");
        SaverProject { project_file }
    }

    /// Retrieve the saved map.
    ///
    /// Return the [`Graph`] object or None if the project file does not
    /// exist.
    pub fn get_map(&self) -> Result<Option<Graph>, Box<dyn Error>> {
        let file: File;
        match File::open(&self.project_file) {
            Ok(f) => file = f,
            Err(error) => match error.kind() {
                ErrorKind::NotFound => return Ok(None),
                _ => return Err(Box::new(error)),
            },
        }
        let reader: BufReader<File> = BufReader::new(file);
        let project: ProjectFile = serde_json::from_reader(reader)?;
        Ok(Some(project.build_graph()?))
    }

    /// Save the provided map.
    pub fn save_map(&self, graph: &Graph) -> Result<(), Box<dyn Error>> {
        let file: File = File::create(&self.project_file)?;
        let mut writer: BufWriter<File> = BufWriter::new(file);

        let project: ProjectFile = ProjectFile::from_graph(graph);
        serde_json::to_writer_pretty(&mut writer, &project)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_map() -> Graph {
        let mut graph: Graph = Graph::new();
        let a = graph.add_node("Lisboa", Point::new(0.0, 0.0)).unwrap();
        let b = graph.add_node("Madrid", Point::new(6.0, 1.0)).unwrap();
        let c = graph.add_node("Paris", Point::new(9.0, 8.0)).unwrap();
        let ab = graph.add_edge(a, b, 3.0).unwrap();
        graph.add_edge(b, c, 4.0).unwrap();
        graph.set_edge_color(ab, "red").unwrap();
        graph
            .set_node_image(c, Some(String::from("paris.png")))
            .unwrap();
        let label = graph.node(a).unwrap().label;
        graph
            .set_label_offset(label, Point::new(0.5, -0.5))
            .unwrap();
        graph.add_task(vec![a, c], 12.0, Some(6.0)).unwrap();
        graph
    }

    #[test]
    fn round_trip_preserves_the_map() {
        let graph: Graph = sample_map();
        let project: ProjectFile = ProjectFile::from_graph(&graph);
        let restored: Graph = project.build_graph().unwrap();

        assert_eq!(restored.num_nodes(), 3);
        assert_eq!(restored.num_edges(), 2);

        let a = restored.node_by_name("Lisboa").unwrap();
        assert_eq!(a.position, Point::new(0.0, 0.0));
        let label_offset: Point = restored.label(a.label).unwrap().offset;
        assert_eq!(label_offset, Point::new(0.5, -0.5));

        let c = restored.node_by_name("Paris").unwrap();
        assert_eq!(c.image.as_deref(), Some("paris.png"));

        let edges: Vec<_> = restored.sorted_edge_ids();
        let first = restored.edge(edges[0]).unwrap();
        assert_eq!(first.target_length, 3.0);
        assert_eq!(first.color, "red");

        let tasks: Vec<_> = restored.sorted_task_ids();
        let task = restored.task(tasks[0]).unwrap();
        assert_eq!(task.reward, 12.0);
        assert_eq!(task.penalty, Some(6.0));
        assert_eq!(task.nodes.len(), 2);
    }

    #[test]
    fn serialization_round_trip() {
        let project: ProjectFile = ProjectFile::from_graph(&sample_map());
        let text: String = serde_json::to_string(&project).unwrap();
        let parsed: ProjectFile = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, project);
    }

    #[test]
    fn unknown_city_is_reported() {
        let mut project: ProjectFile = ProjectFile::from_graph(&sample_map());
        project.edges[0].to = String::from("Atlantis");
        let error = project.build_graph().unwrap_err();
        assert!(error.to_string().contains("Atlantis"));
    }

    #[test]
    fn missing_file_loads_as_none() {
        let saver: SaverProject =
            SaverProject::new(PathBuf::from("/nonexistent/raildraft-test.json"));
        assert!(saver.get_map().unwrap().is_none());
    }

    #[test]
    fn save_and_reload_from_disk() {
        let mut path: PathBuf = std::env::temp_dir();
        path.push(format!("raildraft-project-{}.json", std::process::id()));
        let saver: SaverProject = SaverProject::new(path.clone());

        saver.save_map(&sample_map()).unwrap();
        let restored: Graph = saver.get_map().unwrap().unwrap();
        assert_eq!(restored.num_nodes(), 3);
        assert!(restored.node_by_name("Madrid").is_some());

        let _ = std::fs::remove_file(&path);
    }
}
