/*
tasks.rs

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

//! Scoring of task cards against the current map.

use std::collections::HashSet;

use super::shortest_path::{AnalysisError, shortest_path};
use crate::graph::model::Graph;
use crate::graph::node::NodeId;
use crate::graph::task::Task;

/// Score breakdown of a task, as reported to the designer.
///
/// The breakdown never decides acceptance: it only shows what a player
/// completing the task along the optimal route would earn, so the designer
/// can judge whether the reward matches the effort.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskScore {
    /// Reward earned when the two endpoints connect. Zero when they do not.
    pub achieved_reward: f64,

    /// Penalty total for extra waypoints that the optimal route misses.
    pub incurred_penalty: f64,

    /// Whether every extra waypoint lies on the optimal route.
    pub on_optimal_path: bool,

    /// Total weight of the optimal route, or `None` when the endpoints are
    /// not connected.
    pub length: Option<f64>,
}

/// Score a task against the current map.
///
/// The optimal route is the canonical shortest path between the two task
/// endpoints. The reward is achieved when that route exists; every extra
/// waypoint off the route incurs the task penalty once. Unconnected
/// endpoints are part of the report (zero reward, full penalties), not an
/// error.
///
/// # Errors
///
/// The function returns an error only if the task references a city that
/// does not exist in the graph.
pub fn score_task(graph: &Graph, task: &Task) -> Result<TaskScore, AnalysisError> {
    if let Some(missing) = task.nodes.iter().find(|id| graph.node(**id).is_none()) {
        return Err(AnalysisError::UnknownNode(*missing));
    }

    let (from, to) = task.endpoints();
    let penalty: f64 = task.penalty.unwrap_or(0.0);

    match shortest_path(graph, from, to) {
        Ok(path) => {
            let on_path: HashSet<NodeId> = path.nodes.iter().copied().collect();
            let missed: usize = task
                .waypoints()
                .iter()
                .filter(|w| !on_path.contains(w))
                .count();
            Ok(TaskScore {
                achieved_reward: task.reward,
                incurred_penalty: penalty * missed as f64,
                on_optimal_path: missed == 0,
                length: Some(path.weight),
            })
        }
        Err(AnalysisError::Unreachable { .. }) => Ok(TaskScore {
            achieved_reward: 0.0,
            incurred_penalty: penalty * task.waypoints().len() as f64,
            on_optimal_path: false,
            length: None,
        }),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::node::Point;
    use crate::graph::task::TaskId;

    #[test]
    fn reward_for_connected_endpoints() {
        // The example map: A-B target 3, B-C target 4, task A to C worth 10.
        let mut graph: Graph = Graph::new();
        let a = graph.add_node("A", Point::default()).unwrap();
        let b = graph.add_node("B", Point::default()).unwrap();
        let c = graph.add_node("C", Point::default()).unwrap();
        graph.add_edge(a, b, 3.0).unwrap();
        graph.add_edge(b, c, 4.0).unwrap();
        let task_id: TaskId = graph.add_task(vec![a, c], 10.0, None).unwrap();

        let score: TaskScore = score_task(&graph, graph.task(task_id).unwrap()).unwrap();
        assert_eq!(score.achieved_reward, 10.0);
        assert_eq!(score.incurred_penalty, 0.0);
        assert!(score.on_optimal_path);
        assert_eq!(score.length, Some(7.0));
    }

    #[test]
    fn waypoint_off_the_route_incurs_the_penalty() {
        // Square A-B-C-D with a direct A-C shortcut: the waypoint D is not
        // on the optimal A to C route.
        let mut graph: Graph = Graph::new();
        let a = graph.add_node("A", Point::default()).unwrap();
        let b = graph.add_node("B", Point::default()).unwrap();
        let c = graph.add_node("C", Point::default()).unwrap();
        let d = graph.add_node("D", Point::default()).unwrap();
        graph.add_edge(a, b, 2.0).unwrap();
        graph.add_edge(b, c, 2.0).unwrap();
        graph.add_edge(c, d, 2.0).unwrap();
        graph.add_edge(d, a, 2.0).unwrap();
        let task_id: TaskId = graph.add_task(vec![a, d, c], 12.0, Some(4.0)).unwrap();

        let score: TaskScore = score_task(&graph, graph.task(task_id).unwrap()).unwrap();
        assert_eq!(score.achieved_reward, 12.0);
        assert_eq!(score.incurred_penalty, 4.0);
        assert!(!score.on_optimal_path);

        // Making the northern side expensive routes the optimal path
        // through D, and the penalty disappears.
        let ab = graph.sorted_edge_ids()[0];
        graph.set_target_length(ab, 20.0).unwrap();
        let score: TaskScore = score_task(&graph, graph.task(task_id).unwrap()).unwrap();
        assert_eq!(score.incurred_penalty, 0.0);
        assert!(score.on_optimal_path);
        assert_eq!(score.length, Some(4.0));
    }

    #[test]
    fn unreachable_endpoints_score_zero() {
        let mut graph: Graph = Graph::new();
        let a = graph.add_node("A", Point::default()).unwrap();
        let b = graph.add_node("B", Point::default()).unwrap();
        let lone = graph.add_node("Lone", Point::default()).unwrap();
        graph.add_edge(a, b, 3.0).unwrap();
        let task_id: TaskId = graph.add_task(vec![a, b, lone], 8.0, Some(3.0)).unwrap();

        let score: TaskScore = score_task(&graph, graph.task(task_id).unwrap()).unwrap();
        assert_eq!(score.achieved_reward, 0.0);
        assert_eq!(score.incurred_penalty, 3.0);
        assert!(!score.on_optimal_path);
        assert_eq!(score.length, None);
    }
}
