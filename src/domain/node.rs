use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

use crate::domain::edge::Anchor;

/// A point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum NodeStatus {
    #[serde(rename = "To Do")]
    ToDo,
    #[serde(rename = "In Progress")]
    InProgress,
    Done,
    Blocked,
}

/// A positioned, sized box on the board carrying task payload. The wire
/// shape (camelCase, optional size/tags/icon/url) is persisted verbatim by
/// the storage collaborator, so the serde attributes here are load-bearing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: Uuid,
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_width")]
    pub width: f64,
    #[serde(default = "default_height")]
    pub height: f64,
    pub title: String,
    pub description: String, // Markdown content
    pub status: NodeStatus,
    #[serde(default, skip_serializing_if = "HashSet::is_empty")]
    pub tags: HashSet<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_issue_url: Option<String>,
}

// Wire defaults for boards saved before size was persisted. Must match
// CanvasConfig::default().
fn default_width() -> f64 {
    200.0
}

fn default_height() -> f64 {
    100.0
}

impl Node {
    pub fn new(title: String, description: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            x: 0.0,
            y: 0.0,
            width: default_width(),
            height: default_height(),
            title,
            description,
            status: NodeStatus::ToDo,
            tags: HashSet::new(),
            icon_id: None,
            github_issue_url: None,
        }
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    /// Midpoint of the given side, where edges visually attach.
    pub fn anchor_point(&self, anchor: Anchor) -> Position {
        match anchor {
            Anchor::Top => Position::new(self.x + self.width / 2.0, self.y),
            Anchor::Bottom => Position::new(self.x + self.width / 2.0, self.y + self.height),
            Anchor::Left => Position::new(self.x, self.y + self.height / 2.0),
            Anchor::Right => Position::new(self.x + self.width, self.y + self.height / 2.0),
        }
    }

    /// Unchecked `- [ ] item` lines in the description, used to expand a
    /// node into subtasks.
    pub fn checklist_items(&self) -> Vec<String> {
        let regex = regex::Regex::new(r"(?m)^- \[ \] (.+)$").unwrap();
        regex
            .captures_iter(&self.description)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str().to_string()))
            .collect()
    }

    pub fn add_tag(&mut self, tag: String) {
        self.tags.insert(tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node() {
        let node = Node::new("Test Task".to_string(), "Description".to_string());
        assert_eq!(node.title, "Test Task");
        assert_eq!(node.description, "Description");
        assert_eq!(node.status, NodeStatus::ToDo);
        assert_eq!(node.width, 200.0);
        assert_eq!(node.height, 100.0);
        assert!(node.tags.is_empty());
    }

    #[test]
    fn test_center_and_contains() {
        let mut node = Node::new("A".to_string(), String::new());
        node.x = 100.0;
        node.y = 50.0;
        node.width = 200.0;
        node.height = 100.0;

        let center = node.center();
        assert_eq!(center.x, 200.0);
        assert_eq!(center.y, 100.0);

        assert!(node.contains(Position::new(100.0, 50.0))); // corner inclusive
        assert!(node.contains(Position::new(300.0, 150.0)));
        assert!(!node.contains(Position::new(301.0, 100.0)));
    }

    #[test]
    fn test_anchor_points() {
        let mut node = Node::new("A".to_string(), String::new());
        node.x = 0.0;
        node.y = 0.0;
        node.width = 100.0;
        node.height = 60.0;

        assert_eq!(node.anchor_point(Anchor::Top), Position::new(50.0, 0.0));
        assert_eq!(node.anchor_point(Anchor::Bottom), Position::new(50.0, 60.0));
        assert_eq!(node.anchor_point(Anchor::Left), Position::new(0.0, 30.0));
        assert_eq!(node.anchor_point(Anchor::Right), Position::new(100.0, 30.0));
    }

    #[test]
    fn test_checklist_items() {
        let mut node = Node::new("Main".to_string(), String::new());
        node.description =
            "Intro\n- [ ] First item\n- [x] Already done\n- [ ] Second item\n".to_string();

        let items = node.checklist_items();
        assert_eq!(items, vec!["First item".to_string(), "Second item".to_string()]);
    }

    #[test]
    fn test_wire_shape_is_camel_case() {
        let mut node = Node::new("Wire".to_string(), String::new());
        node.status = NodeStatus::InProgress;
        node.icon_id = Some("bug".to_string());
        node.github_issue_url = Some("https://github.com/acme/app/issues/7".to_string());

        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["status"], "In Progress");
        assert_eq!(json["iconId"], "bug");
        assert_eq!(json["githubIssueUrl"], "https://github.com/acme/app/issues/7");
        assert!(json.get("tags").is_none()); // empty set omitted

        let back: Node = serde_json::from_value(json).unwrap();
        assert_eq!(back, node);
    }

    #[test]
    fn test_missing_size_defaults_on_load() {
        let json = r#"{
            "id": "2a8e2f7e-4a5b-4f5e-9d3c-1b2a3c4d5e6f",
            "x": 40.0,
            "y": 80.0,
            "title": "Old board",
            "description": "",
            "status": "To Do"
        }"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.width, 200.0);
        assert_eq!(node.height, 100.0);
    }
}
