use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;
use uuid::Uuid;

use crate::domain::edge::Edge;
use crate::domain::node::Node;

/// The full board state: nodes, edges and the current selection. Selection
/// is part of undo snapshots but never part of the persisted board file,
/// hence the serde skips.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TaskGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Selected node ids in selection order; the primary selection is the
    /// most recently added (last).
    #[serde(skip)]
    pub selected_node_ids: Vec<Uuid>,
    /// At most one selected edge, mutually exclusive with node selection.
    #[serde(skip)]
    pub selected_edge_id: Option<Uuid>,
}

/// Deep copy of the board taken at every commit.
pub type GraphSnapshot = TaskGraph;

impl TaskGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: Uuid) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: Uuid) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn edge(&self, id: Uuid) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn add_node(&mut self, node: Node) -> Uuid {
        let id = node.id;
        self.nodes.push(node);
        id
    }

    pub fn add_edge(&mut self, edge: Edge) -> Uuid {
        let id = edge.id;
        self.edges.push(edge);
        id
    }

    /// Remove a node and every edge touching it. Returns false when the id
    /// is unknown.
    pub fn remove_node(&mut self, id: Uuid) -> bool {
        let before = self.nodes.len();
        self.nodes.retain(|n| n.id != id);
        if self.nodes.len() == before {
            return false;
        }
        self.edges
            .retain(|e| e.source_id != id && e.target_id != id);
        self.selected_node_ids.retain(|&s| s != id);
        if let Some(edge_id) = self.selected_edge_id
            && self.edge(edge_id).is_none()
        {
            self.selected_edge_id = None;
        }
        true
    }

    pub fn remove_edge(&mut self, id: Uuid) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        if self.edges.len() == before {
            return false;
        }
        if self.selected_edge_id == Some(id) {
            self.selected_edge_id = None;
        }
        true
    }

    /// Edges whose both endpoints resolve to live nodes. Dangling edges
    /// (stale persisted data, failed cascades) are skipped everywhere
    /// rather than treated as errors.
    pub fn resolved_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges
            .iter()
            .filter(|e| self.node(e.source_id).is_some() && self.node(e.target_id).is_some())
    }

    pub fn has_edge_between(&self, source_id: Uuid, target_id: Uuid) -> bool {
        self.edges
            .iter()
            .any(|e| e.source_id == source_id && e.target_id == target_id)
    }

    pub fn find_node_by_title(&self, title: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.title == title)
    }

    // Selection -----------------------------------------------------------

    pub fn select_only_node(&mut self, id: Uuid) {
        self.selected_edge_id = None;
        self.selected_node_ids.clear();
        self.selected_node_ids.push(id);
    }

    pub fn add_node_to_selection(&mut self, id: Uuid) {
        self.selected_edge_id = None;
        if !self.selected_node_ids.contains(&id) {
            self.selected_node_ids.push(id);
        }
    }

    pub fn toggle_node_selection(&mut self, id: Uuid) {
        self.selected_edge_id = None;
        if self.selected_node_ids.contains(&id) {
            self.selected_node_ids.retain(|&s| s != id);
        } else {
            self.selected_node_ids.push(id);
        }
    }

    pub fn select_edge(&mut self, id: Uuid) {
        self.selected_node_ids.clear();
        self.selected_edge_id = Some(id);
    }

    pub fn clear_selection(&mut self) {
        self.selected_node_ids.clear();
        self.selected_edge_id = None;
    }

    pub fn primary_selection(&self) -> Option<Uuid> {
        self.selected_node_ids.last().copied()
    }

    pub fn is_node_selected(&self, id: Uuid) -> bool {
        self.selected_node_ids.contains(&id)
    }

    // Structure -----------------------------------------------------------

    /// True when the resolvable edges contain a directed cycle.
    pub fn has_cycle(&self) -> bool {
        let mut graph: DiGraph<Uuid, ()> = DiGraph::new();
        let mut index: HashMap<Uuid, NodeIndex> = HashMap::new();
        for node in &self.nodes {
            index.insert(node.id, graph.add_node(node.id));
        }
        for edge in self.resolved_edges() {
            graph.add_edge(index[&edge.source_id], index[&edge.target_id], ());
        }
        toposort(&graph, None).is_err()
    }

    // Board file ----------------------------------------------------------

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Parse a persisted board file. Malformed input degrades to an empty
    /// board with a logged warning instead of failing the editor.
    pub fn from_json(data: &str) -> Self {
        match serde_json::from_str(data) {
            Ok(graph) => graph,
            Err(err) => {
                warn!("malformed board data, starting from an empty board: {err}");
                Self::default()
            }
        }
    }
}
