use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::node::Position;

/// One of the four fixed attachment points on a node's boundary.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Bottom,
    Left,
    Right,
}

impl Anchor {
    pub fn opposite(self) -> Self {
        match self {
            Anchor::Top => Anchor::Bottom,
            Anchor::Bottom => Anchor::Top,
            Anchor::Left => Anchor::Right,
            Anchor::Right => Anchor::Left,
        }
    }

    /// The side of a box centered at `own` that faces a box centered at
    /// `other`: the horizontal side when the horizontal center offset
    /// dominates, the vertical side otherwise.
    pub fn facing(own: Position, other: Position) -> Self {
        let dx = other.x - own.x;
        let dy = other.y - own.y;
        if dx.abs() > dy.abs() {
            if dx > 0.0 { Anchor::Right } else { Anchor::Left }
        } else if dy > 0.0 {
            Anchor::Bottom
        } else {
            Anchor::Top
        }
    }
}

/// A directed connection between two nodes. The anchors only choose the
/// visual attachment points; direction is always source -> target.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: Uuid,
    pub source_id: Uuid,
    pub target_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<Anchor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_handle: Option<Anchor>,
}

impl Edge {
    pub fn new(source_id: Uuid, target_id: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id,
            target_id,
            source_handle: None,
            target_handle: None,
        }
    }

    /// Build an edge with both anchors derived from the node centers:
    /// each endpoint attaches on the side facing the other node.
    pub fn between(source_id: Uuid, source_center: Position, target_id: Uuid, target_center: Position) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id,
            target_id,
            source_handle: Some(Anchor::facing(source_center, target_center)),
            target_handle: Some(Anchor::facing(target_center, source_center)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Position::new(200.0, 0.0), Anchor::Right)]
    #[case(Position::new(-200.0, 0.0), Anchor::Left)]
    #[case(Position::new(0.0, 200.0), Anchor::Bottom)]
    #[case(Position::new(0.0, -200.0), Anchor::Top)]
    // Equal offsets fall back to the vertical side.
    #[case(Position::new(100.0, 100.0), Anchor::Bottom)]
    fn facing_picks_dominant_axis(#[case] other: Position, #[case] expected: Anchor) {
        assert_eq!(Anchor::facing(Position::new(0.0, 0.0), other), expected);
    }

    #[test]
    fn between_derives_symmetric_anchors() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let edge = Edge::between(a, Position::new(0.0, 0.0), b, Position::new(200.0, 0.0));
        assert_eq!(edge.source_handle, Some(Anchor::Right));
        assert_eq!(edge.target_handle, Some(Anchor::Left));
    }

    #[test]
    fn anchors_serialize_lowercase() {
        let mut edge = Edge::new(Uuid::new_v4(), Uuid::new_v4());
        edge.source_handle = Some(Anchor::Bottom);

        let json = serde_json::to_value(&edge).unwrap();
        assert_eq!(json["sourceHandle"], "bottom");
        assert!(json.get("targetHandle").is_none());
    }
}
