use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::canvas::input::{Key, Modifiers, PointerButton, ScreenPoint, UiRequest};
use crate::canvas::viewport::{Viewport, WorldRect};
use crate::config::CanvasConfig;
use crate::domain::{Anchor, Edge, GraphSnapshot, Node, Position, TaskGraph};
use crate::services::autosave::CommitListener;
use crate::services::history::History;
use crate::services::layout;

/// The one transient pointer gesture. At most one variant is ever active;
/// gestures are only entered from `Idle` on pointer-down and (almost) always
/// return to `Idle` on pointer-up. The exception is `ConnectingEdge`, which
/// survives a release over its own source node so a connection can be made
/// click-by-click.
#[derive(Debug, Clone, PartialEq)]
pub enum Gesture {
    Idle,
    Panning {
        last_screen: ScreenPoint,
    },
    DraggingNodes {
        /// Per-node offset from the pointer to the node origin, captured at
        /// drag start so the whole selection moves rigidly.
        offsets: Vec<(Uuid, Position)>,
    },
    ResizingNode {
        id: Uuid,
        start_pointer: Position,
        original_width: f64,
        original_height: f64,
    },
    BoxSelecting {
        start: Position,
        current: Position,
        additive: bool,
        /// Selection before the gesture, to detect whether pointer-up
        /// actually changed anything.
        before: Vec<Uuid>,
    },
    ConnectingEdge {
        source_id: Uuid,
        source_anchor: Anchor,
        /// Live endpoint under the pointer, for preview rendering only.
        pointer: Position,
    },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Hit {
    ResizeGlyph(Uuid),
    ConnectHandle(Uuid, Anchor),
    Node(Uuid),
    Edge(Uuid),
    Empty,
}

/// Owns the board, the viewport and the gesture state, and translates raw
/// pointer/keyboard events into graph mutations, viewport changes and
/// history commits. Everything here is synchronous and single-threaded.
pub struct CanvasController {
    pub graph: TaskGraph,
    pub viewport: Viewport,
    config: CanvasConfig,
    gesture: Gesture,
    history: History<GraphSnapshot>,
    listeners: Vec<Arc<dyn CommitListener>>,
}

impl CanvasController {
    pub fn new(config: CanvasConfig, surface_width: f64, surface_height: f64) -> Self {
        Self::with_graph(config, TaskGraph::new(), surface_width, surface_height)
    }

    pub fn with_graph(
        config: CanvasConfig,
        graph: TaskGraph,
        surface_width: f64,
        surface_height: f64,
    ) -> Self {
        let viewport = Viewport::new(&config, surface_width, surface_height);
        let mut history = History::new(config.history_limit);
        // Baseline snapshot so the very first edit can be undone.
        history.commit(graph.clone());
        Self {
            graph,
            viewport,
            config,
            gesture: Gesture::Idle,
            history,
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &CanvasConfig {
        &self.config
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    pub fn add_commit_listener(&mut self, listener: Arc<dyn CommitListener>) {
        self.listeners.push(listener);
    }

    // Pointer events ------------------------------------------------------

    pub fn pointer_down(&mut self, screen: ScreenPoint, button: PointerButton, modifiers: Modifiers) {
        let world = self.viewport.screen_to_world(screen);

        // A pending click-to-connect consumes the next pointer-down: a
        // different node completes the edge, the source keeps it pending,
        // anything else cancels it and starts no other gesture.
        if let Gesture::ConnectingEdge { source_id, .. } = self.gesture {
            match self.hit_test(world) {
                Hit::Node(id) | Hit::ConnectHandle(id, _) | Hit::ResizeGlyph(id)
                    if id != source_id =>
                {
                    self.complete_connection(source_id, id);
                }
                Hit::Node(_) | Hit::ConnectHandle(_, _) | Hit::ResizeGlyph(_) => {}
                _ => {
                    debug!("pending connection from {source_id} cancelled");
                    self.gesture = Gesture::Idle;
                }
            }
            return;
        }

        // Gestures are only ever entered from Idle.
        if self.gesture != Gesture::Idle {
            return;
        }

        if button == PointerButton::Middle || (button == PointerButton::Primary && modifiers.alt) {
            if matches!(self.hit_test(world), Hit::Empty) {
                self.gesture = Gesture::Panning { last_screen: screen };
            }
            return;
        }
        if button != PointerButton::Primary {
            return;
        }

        match self.hit_test(world) {
            Hit::ResizeGlyph(id) => {
                if let Some(node) = self.graph.node(id) {
                    self.gesture = Gesture::ResizingNode {
                        id,
                        start_pointer: world,
                        original_width: node.width,
                        original_height: node.height,
                    };
                }
            }
            Hit::ConnectHandle(id, anchor) => {
                self.update_click_selection(id, modifiers);
                self.gesture = Gesture::ConnectingEdge {
                    source_id: id,
                    source_anchor: anchor,
                    pointer: world,
                };
            }
            Hit::Node(id) => {
                self.update_click_selection(id, modifiers);
                let offsets = self
                    .graph
                    .selected_node_ids
                    .iter()
                    .filter_map(|&sid| {
                        self.graph
                            .node(sid)
                            .map(|n| (sid, Position::new(n.x - world.x, n.y - world.y)))
                    })
                    .collect();
                self.gesture = Gesture::DraggingNodes { offsets };
            }
            Hit::Edge(id) => {
                if self.graph.selected_edge_id == Some(id) {
                    self.graph.clear_selection();
                } else {
                    self.graph.select_edge(id);
                }
                self.commit();
            }
            Hit::Empty => {
                let before = self.graph.selected_node_ids.clone();
                if self.graph.selected_edge_id.is_some() {
                    self.graph.clear_selection();
                    self.commit();
                }
                if !modifiers.shift {
                    self.graph.selected_node_ids.clear();
                }
                self.gesture = Gesture::BoxSelecting {
                    start: world,
                    current: world,
                    additive: modifiers.shift,
                    before,
                };
            }
        }
    }

    pub fn pointer_move(&mut self, screen: ScreenPoint) {
        let world = self.viewport.screen_to_world(screen);
        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Panning { last_screen } => {
                let delta = ScreenPoint::new(screen.x - last_screen.x, screen.y - last_screen.y);
                *last_screen = screen;
                self.viewport.pan(delta);
            }
            Gesture::DraggingNodes { offsets } => {
                for (id, offset) in offsets.iter() {
                    if let Some(node) = self.graph.node_mut(*id) {
                        node.x = self.config.snap(world.x + offset.x);
                        node.y = self.config.snap(world.y + offset.y);
                    }
                }
            }
            Gesture::ResizingNode {
                id,
                start_pointer,
                original_width,
                original_height,
            } => {
                let (width, height) = self.config.snap_size(
                    *original_width + (world.x - start_pointer.x),
                    *original_height + (world.y - start_pointer.y),
                );
                if let Some(node) = self.graph.node_mut(*id) {
                    node.width = width;
                    node.height = height;
                }
            }
            Gesture::BoxSelecting { current, .. } => {
                *current = world;
            }
            Gesture::ConnectingEdge { pointer, .. } => {
                *pointer = world;
            }
        }
    }

    pub fn pointer_up(&mut self, screen: ScreenPoint) {
        let world = self.viewport.screen_to_world(screen);
        let gesture = std::mem::replace(&mut self.gesture, Gesture::Idle);
        match gesture {
            Gesture::Idle => {}
            // Viewport changes are not part of the edit history.
            Gesture::Panning { .. } => {}
            Gesture::DraggingNodes { offsets } => {
                // Re-snap against floating point drift accumulated while
                // moving.
                for (id, offset) in offsets {
                    if let Some(node) = self.graph.node_mut(id) {
                        node.x = self.config.snap(world.x + offset.x);
                        node.y = self.config.snap(world.y + offset.y);
                    }
                }
                self.commit();
            }
            Gesture::ResizingNode {
                id,
                start_pointer,
                original_width,
                original_height,
            } => {
                let (width, height) = self.config.snap_size(
                    original_width + (world.x - start_pointer.x),
                    original_height + (world.y - start_pointer.y),
                );
                if let Some(node) = self.graph.node_mut(id) {
                    node.width = width;
                    node.height = height;
                }
                self.commit();
            }
            Gesture::BoxSelecting {
                start,
                additive,
                before,
                ..
            } => {
                let rect = WorldRect::from_corners(start, world);
                let mut selected: Vec<Uuid> = if additive { before.clone() } else { Vec::new() };
                for node in &self.graph.nodes {
                    if rect.contains(node.center()) && !selected.contains(&node.id) {
                        selected.push(node.id);
                    }
                }
                debug!("box select picked {} nodes", selected.len());
                let changed = selected != before;
                self.graph.selected_node_ids = selected;
                self.graph.selected_edge_id = None;
                if changed {
                    self.commit();
                }
            }
            Gesture::ConnectingEdge {
                source_id,
                source_anchor,
                ..
            } => match self.hit_test(world) {
                Hit::Node(id) | Hit::ConnectHandle(id, _) | Hit::ResizeGlyph(id)
                    if id != source_id =>
                {
                    self.complete_connection(source_id, id);
                }
                Hit::Node(_) | Hit::ConnectHandle(_, _) | Hit::ResizeGlyph(_) => {
                    // Released over the source node: keep the connection
                    // pending for a later click on the target.
                    self.gesture = Gesture::ConnectingEdge {
                        source_id,
                        source_anchor,
                        pointer: world,
                    };
                }
                _ => {
                    debug!("connection from {source_id} released over empty canvas, discarded");
                }
            },
        }
    }

    /// Double-click on empty canvas creates a node there with the
    /// configured defaults, selects it and commits.
    pub fn double_click(&mut self, screen: ScreenPoint) -> Option<Uuid> {
        let world = self.viewport.screen_to_world(screen);
        if matches!(self.hit_test(world), Hit::Empty) {
            Some(self.create_node_at(world))
        } else {
            None
        }
    }

    /// Right-click: the menu itself belongs to the host; "create node here"
    /// re-enters `create_node_at`.
    pub fn context_menu(&mut self, screen: ScreenPoint) -> UiRequest {
        let world = self.viewport.screen_to_world(screen);
        UiRequest::ContextMenu { screen, world }
    }

    pub fn key_pressed(&mut self, key: Key) {
        match key {
            Key::Delete | Key::Backspace => {
                if let Some(edge_id) = self.graph.selected_edge_id {
                    self.graph.remove_edge(edge_id);
                    self.graph.clear_selection();
                    self.commit();
                } else if !self.graph.selected_node_ids.is_empty() {
                    for id in self.graph.selected_node_ids.clone() {
                        self.graph.remove_node(id);
                    }
                    self.graph.clear_selection();
                    self.commit();
                }
            }
        }
    }

    // Edits ---------------------------------------------------------------

    /// Insert a node at the given world point through the shared snapping
    /// and default-size path. Does not select or commit; interactive and
    /// programmatic creation both build on this so the two are
    /// indistinguishable on the board.
    pub(crate) fn spawn_node(&mut self, title: String, description: String, world: Position) -> Uuid {
        let mut node = Node::new(title, description);
        node.x = self.config.snap(world.x);
        node.y = self.config.snap(world.y);
        node.width = self.config.default_node_width;
        node.height = self.config.default_node_height;
        self.graph.add_node(node)
    }

    pub fn create_node_at(&mut self, world: Position) -> Uuid {
        let id = self.spawn_node(self.config.default_node_title.clone(), String::new(), world);
        self.graph.select_only_node(id);
        self.commit();
        id
    }

    /// Re-run the tree layout over the whole board and commit the result.
    pub fn auto_layout(&mut self) {
        let positions = layout::arrange(&self.graph, &self.config);
        for (id, position) in positions {
            if let Some(node) = self.graph.node_mut(id) {
                node.x = position.x;
                node.y = position.y;
            }
        }
        self.commit();
    }

    fn complete_connection(&mut self, source_id: Uuid, target_id: Uuid) {
        let (Some(source), Some(target)) = (self.graph.node(source_id), self.graph.node(target_id))
        else {
            self.gesture = Gesture::Idle;
            return;
        };
        let edge = Edge::between(source_id, source.center(), target_id, target.center());
        debug!("connected {source_id} -> {target_id}");
        self.graph.add_edge(edge);
        self.graph.select_only_node(target_id);
        self.gesture = Gesture::Idle;
        self.commit();
    }

    fn update_click_selection(&mut self, id: Uuid, modifiers: Modifiers) {
        if modifiers.shift {
            self.graph.toggle_node_selection(id);
        } else if self.graph.selected_node_ids.as_slice() != [id] {
            self.graph.select_only_node(id);
        }
    }

    // History -------------------------------------------------------------

    pub(crate) fn commit(&mut self) {
        self.history.commit(self.graph.clone());
        self.notify();
    }

    pub fn undo(&mut self) -> bool {
        if let Some(snapshot) = self.history.undo() {
            self.graph = snapshot.clone();
            self.notify();
            true
        } else {
            false
        }
    }

    pub fn redo(&mut self) -> bool {
        if let Some(snapshot) = self.history.redo() {
            self.graph = snapshot.clone();
            self.notify();
            true
        } else {
            false
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener.state_changed();
        }
    }

    // Viewport handle -----------------------------------------------------

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    /// Scroll-wheel zoom anchored at the pointer.
    pub fn zoom_at(&mut self, screen: ScreenPoint, factor: f64) {
        let anchor = self.viewport.screen_to_world(screen);
        self.viewport.zoom(factor, Some(anchor));
    }

    /// Frame the given nodes, or the whole board when `ids` is `None`.
    pub fn fit_to_content(&mut self, ids: Option<&[Uuid]>) {
        let bounds: Vec<WorldRect> = match ids {
            Some(ids) => ids
                .iter()
                .filter_map(|&id| self.graph.node(id))
                .map(node_bounds)
                .collect(),
            None => self.graph.nodes.iter().map(node_bounds).collect(),
        };
        self.viewport.fit_to_content(&bounds);
    }

    pub fn set_surface_size(&mut self, width: f64, height: f64) {
        self.viewport.set_surface_size(width, height);
    }

    // Render support ------------------------------------------------------

    /// World endpoints of an edge, or `None` when an endpoint node no
    /// longer exists (the edge is then simply not drawn).
    pub fn edge_endpoints(&self, edge: &Edge) -> Option<(Position, Position)> {
        let source = self.graph.node(edge.source_id)?;
        let target = self.graph.node(edge.target_id)?;
        let source_anchor = edge
            .source_handle
            .unwrap_or_else(|| Anchor::facing(source.center(), target.center()));
        let target_anchor = edge
            .target_handle
            .unwrap_or_else(|| Anchor::facing(target.center(), source.center()));
        Some((source.anchor_point(source_anchor), target.anchor_point(target_anchor)))
    }

    /// The in-progress connection line, from the source anchor to the live
    /// pointer position.
    pub fn connection_preview(&self) -> Option<(Position, Position)> {
        if let Gesture::ConnectingEdge {
            source_id,
            source_anchor,
            pointer,
        } = self.gesture
        {
            let source = self.graph.node(source_id)?;
            Some((source.anchor_point(source_anchor), pointer))
        } else {
            None
        }
    }

    // Hit testing ---------------------------------------------------------

    /// Topmost first (later in the node list draws on top); within a node
    /// the resize glyph beats the connection handles beats the body. Edges
    /// are only reachable where no node covers the pointer.
    fn hit_test(&self, world: Position) -> Hit {
        let scale = self.viewport.scale();
        let handle_tolerance = self.config.handle_hit_radius / scale;
        let glyph = self.config.resize_glyph_size / scale;
        let sole_selected = match self.graph.selected_node_ids.as_slice() {
            [only] => Some(*only),
            _ => None,
        };

        for node in self.graph.nodes.iter().rev() {
            if sole_selected == Some(node.id)
                && world.x >= node.x + node.width - glyph
                && world.x <= node.x + node.width
                && world.y >= node.y + node.height - glyph
                && world.y <= node.y + node.height
            {
                return Hit::ResizeGlyph(node.id);
            }
            for anchor in [Anchor::Top, Anchor::Bottom, Anchor::Left, Anchor::Right] {
                let point = node.anchor_point(anchor);
                let dx = point.x - world.x;
                let dy = point.y - world.y;
                if (dx * dx + dy * dy).sqrt() <= handle_tolerance {
                    return Hit::ConnectHandle(node.id, anchor);
                }
            }
            if node.contains(world) {
                return Hit::Node(node.id);
            }
        }

        for edge in self.graph.edges.iter().rev() {
            if let Some((a, b)) = self.edge_endpoints(edge)
                && segment_distance(world, a, b) <= handle_tolerance
            {
                return Hit::Edge(edge.id);
            }
        }

        Hit::Empty
    }
}

fn node_bounds(node: &Node) -> WorldRect {
    WorldRect::new(node.x, node.y, node.width, node.height)
}

fn segment_distance(point: Position, a: Position, b: Position) -> f64 {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let len2 = abx * abx + aby * aby;
    let t = if len2 == 0.0 {
        0.0
    } else {
        (((point.x - a.x) * abx + (point.y - a.y) * aby) / len2).clamp(0.0, 1.0)
    };
    let dx = a.x + t * abx - point.x;
    let dy = a.y + t * aby - point.y;
    (dx * dx + dy * dy).sqrt()
}
