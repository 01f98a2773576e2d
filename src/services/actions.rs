use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::canvas::CanvasController;
use crate::config::SubtaskMergePolicy;
use crate::domain::{Anchor, Edge, NodeStatus, Position};

#[derive(Error, Debug)]
pub enum TaskMapError {
    #[error("Node not found: {id}")]
    NodeNotFound { id: Uuid },

    #[error("Edge not found: {id}")]
    EdgeNotFound { id: Uuid },
}

/// For patch fields where `null` must clear the stored value instead of
/// leaving it alone: an absent field stays `None`, an explicit `null`
/// becomes `Some(None)`.
fn clearable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Partial node edit. Absent fields are left untouched; position and size
/// go through the same snapping and minimum-size clamping as interactive
/// edits. `icon_id` and `github_issue_url` are optional on the node
/// itself, so their patch entries distinguish absent (keep) from `null`
/// (clear).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodePatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<NodeStatus>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub tags: Option<HashSet<String>>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub icon_id: Option<Option<String>>,
    #[serde(deserialize_with = "clearable", skip_serializing_if = "Option::is_none")]
    pub github_issue_url: Option<Option<String>>,
}

/// The closed set of programmatic edits accepted from automation (chat
/// actions, the CLI). Validated at this boundary; the core never sees
/// untyped dictionaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all_fields = "camelCase")]
pub enum BoardAction {
    CreateNode {
        title: String,
        #[serde(default)]
        description: String,
        #[serde(default)]
        status: Option<NodeStatus>,
        #[serde(default)]
        x: Option<f64>,
        #[serde(default)]
        y: Option<f64>,
        #[serde(default)]
        tags: HashSet<String>,
        #[serde(default)]
        icon_id: Option<String>,
        #[serde(default)]
        github_issue_url: Option<String>,
    },
    CreateEdge {
        source_id: Uuid,
        target_id: Uuid,
        #[serde(default)]
        source_handle: Option<Anchor>,
        #[serde(default)]
        target_handle: Option<Anchor>,
    },
    /// One child node per title, linked parent -> child. With no titles the
    /// parent's own `- [ ]` checklist lines are expanded instead.
    CreateSubtasks {
        parent_id: Uuid,
        #[serde(default)]
        titles: Vec<String>,
    },
    UpdateNode {
        id: Uuid,
        patch: NodePatch,
    },
    DeleteNode {
        id: Uuid,
    },
    DeleteEdge {
        id: Uuid,
    },
    AutoLayout,
}

/// Ids created by one applied action, for callers that need to refer to
/// the result (the CLI prints them, chat automation threads them back).
#[derive(Debug, Clone, Default)]
pub struct ActionOutcome {
    pub created_nodes: Vec<Uuid>,
    pub created_edges: Vec<Uuid>,
}

/// Applies `BoardAction`s through the same primitives the pointer gestures
/// use, so programmatic and manual edits are indistinguishable on the
/// board. Every successfully applied action emits exactly one commit.
pub struct ActionDispatcher;

impl ActionDispatcher {
    pub fn apply(
        canvas: &mut CanvasController,
        action: BoardAction,
    ) -> Result<ActionOutcome, TaskMapError> {
        let mut outcome = ActionOutcome::default();
        match action {
            BoardAction::CreateNode {
                title,
                description,
                status,
                x,
                y,
                tags,
                icon_id,
                github_issue_url,
            } => {
                let spawn = Position::new(
                    x.unwrap_or(canvas.config().default_spawn_x),
                    y.unwrap_or(canvas.config().default_spawn_y),
                );
                let id = canvas.spawn_node(title, description, spawn);
                if let Some(node) = canvas.graph.node_mut(id) {
                    if let Some(status) = status {
                        node.status = status;
                    }
                    node.tags = tags;
                    node.icon_id = icon_id;
                    node.github_issue_url = github_issue_url;
                }
                canvas.graph.select_only_node(id);
                outcome.created_nodes.push(id);
                canvas.commit();
            }
            BoardAction::CreateEdge {
                source_id,
                target_id,
                source_handle,
                target_handle,
            } => {
                let source = canvas
                    .graph
                    .node(source_id)
                    .ok_or(TaskMapError::NodeNotFound { id: source_id })?;
                let target = canvas
                    .graph
                    .node(target_id)
                    .ok_or(TaskMapError::NodeNotFound { id: target_id })?;

                let mut edge =
                    Edge::between(source_id, source.center(), target_id, target.center());
                if source_handle.is_some() {
                    edge.source_handle = source_handle;
                }
                if target_handle.is_some() {
                    edge.target_handle = target_handle;
                }
                let id = canvas.graph.add_edge(edge);
                if canvas.graph.has_cycle() {
                    // Layout tolerates cycles, but automation usually does
                    // not mean to create one.
                    warn!("edge {id} introduces a cycle");
                }
                outcome.created_edges.push(id);
                canvas.commit();
            }
            BoardAction::CreateSubtasks { parent_id, titles } => {
                let parent = canvas
                    .graph
                    .node(parent_id)
                    .ok_or(TaskMapError::NodeNotFound { id: parent_id })?;
                let titles = if titles.is_empty() {
                    parent.checklist_items()
                } else {
                    titles
                };
                let parent_position = Position::new(parent.x, parent.y);
                let parent_center = parent.center();
                let merge = canvas.config().subtask_merge;
                let row_y = parent_position.y + canvas.config().vertical_spacing;
                let step =
                    canvas.config().default_node_width + canvas.config().sibling_spacing;

                for (i, title) in titles.into_iter().enumerate() {
                    let existing = match merge {
                        SubtaskMergePolicy::MergeByTitle => {
                            canvas.graph.find_node_by_title(&title).map(|n| n.id)
                        }
                        SubtaskMergePolicy::AlwaysCreate => None,
                    };
                    let child_id = match existing {
                        Some(id) => id,
                        None => {
                            let at = Position::new(
                                parent_position.x + i as f64 * step,
                                row_y,
                            );
                            let id = canvas.spawn_node(title, String::new(), at);
                            outcome.created_nodes.push(id);
                            id
                        }
                    };
                    if existing.is_some() && canvas.graph.has_edge_between(parent_id, child_id) {
                        debug!("subtask edge {parent_id} -> {child_id} already exists, skipped");
                        continue;
                    }
                    let child_center = canvas
                        .graph
                        .node(child_id)
                        .map(|n| n.center())
                        .unwrap_or(parent_center);
                    let edge = Edge::between(parent_id, parent_center, child_id, child_center);
                    outcome.created_edges.push(edge.id);
                    canvas.graph.add_edge(edge);
                }
                canvas.commit();
            }
            BoardAction::UpdateNode { id, patch } => {
                let config = canvas.config().clone();
                let node = canvas
                    .graph
                    .node_mut(id)
                    .ok_or(TaskMapError::NodeNotFound { id })?;
                if let Some(title) = patch.title {
                    node.title = title;
                }
                if let Some(description) = patch.description {
                    node.description = description;
                }
                if let Some(status) = patch.status {
                    node.status = status;
                }
                if let Some(x) = patch.x {
                    node.x = config.snap(x);
                }
                if let Some(y) = patch.y {
                    node.y = config.snap(y);
                }
                if patch.width.is_some() || patch.height.is_some() {
                    let (width, height) = config.snap_size(
                        patch.width.unwrap_or(node.width),
                        patch.height.unwrap_or(node.height),
                    );
                    node.width = width;
                    node.height = height;
                }
                if let Some(tags) = patch.tags {
                    node.tags = tags;
                }
                if let Some(icon_id) = patch.icon_id {
                    node.icon_id = icon_id;
                }
                if let Some(url) = patch.github_issue_url {
                    node.github_issue_url = url;
                }
                canvas.commit();
            }
            BoardAction::DeleteNode { id } => {
                if !canvas.graph.remove_node(id) {
                    return Err(TaskMapError::NodeNotFound { id });
                }
                canvas.commit();
            }
            BoardAction::DeleteEdge { id } => {
                if !canvas.graph.remove_edge(id) {
                    return Err(TaskMapError::EdgeNotFound { id });
                }
                canvas.commit();
            }
            BoardAction::AutoLayout => {
                canvas.auto_layout();
            }
        }
        Ok(outcome)
    }

    pub fn apply_all(
        canvas: &mut CanvasController,
        actions: Vec<BoardAction>,
    ) -> Result<Vec<ActionOutcome>, TaskMapError> {
        actions
            .into_iter()
            .map(|action| Self::apply(canvas, action))
            .collect()
    }
}
