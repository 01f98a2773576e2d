pub mod edge;
pub mod graph;
pub mod node;

pub use edge::{Anchor, Edge};
pub use graph::{GraphSnapshot, TaskGraph};
pub use node::{Node, NodeStatus, Position};
