use ordered_float::OrderedFloat;
use std::collections::{HashMap, VecDeque};
use tracing::debug;
use uuid::Uuid;

use crate::config::CanvasConfig;
use crate::domain::{Position, TaskGraph};

/// Compute a bottom-up tree layout for the whole board: a new position for
/// every node, sizes untouched. Pure with respect to the graph; the caller
/// writes the positions back.
///
/// Roots are the nodes with no incoming resolvable edge, placed left to
/// right in order of their current x so repeated runs do not shuffle the
/// board. Components left over after that (pure cycles) get a synthetic
/// root, again the leftmost unvisited node, which guarantees termination on
/// any input. Each node belongs to exactly one tree.
pub fn arrange(graph: &TaskGraph, config: &CanvasConfig) -> HashMap<Uuid, Position> {
    let count = graph.nodes.len();
    if count == 0 {
        return HashMap::new();
    }

    let index: HashMap<Uuid, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id, i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut in_degree = vec![0usize; count];
    for edge in graph.resolved_edges() {
        let source = index[&edge.source_id];
        let target = index[&edge.target_id];
        children[source].push(target);
        in_degree[target] += 1;
    }

    let mut roots: Vec<usize> = (0..count).filter(|&i| in_degree[i] == 0).collect();
    roots.sort_by_key(|&i| (OrderedFloat(graph.nodes[i].x), i));

    let mut visited = vec![false; count];
    let mut tree_children: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut tree_roots: Vec<usize> = Vec::new();

    for &root in &roots {
        if !visited[root] {
            claim_tree(root, &children, &mut visited, &mut tree_children);
            tree_roots.push(root);
        }
    }

    // Whatever is still unvisited sits on a cycle; break it with a
    // synthetic root per remaining component.
    loop {
        let Some(root) = (0..count)
            .filter(|&i| !visited[i])
            .min_by_key(|&i| (OrderedFloat(graph.nodes[i].x), i))
        else {
            break;
        };
        claim_tree(root, &children, &mut visited, &mut tree_children);
        tree_roots.push(root);
    }

    // Post-order: how much horizontal room each subtree needs.
    let mut subtree_width = vec![0.0f64; count];
    for &root in &tree_roots {
        let mut stack = vec![(root, false)];
        while let Some((node, processed)) = stack.pop() {
            if processed {
                let kids = &tree_children[node];
                let own = graph.nodes[node].width;
                subtree_width[node] = if kids.is_empty() {
                    own
                } else {
                    own.max(combined_width(kids, &subtree_width, config))
                };
            } else {
                stack.push((node, true));
                for &child in tree_children[node].iter().rev() {
                    stack.push((child, false));
                }
            }
        }
    }

    // Pre-order: hand each subtree a horizontal span, center the node over
    // its children, one row per depth level.
    let mut positions = HashMap::with_capacity(count);
    let mut cursor = 0.0f64;
    for &root in &tree_roots {
        let mut stack = vec![(root, cursor, 0usize)];
        while let Some((node, span_x, depth)) = stack.pop() {
            let data = &graph.nodes[node];
            let x = span_x + (subtree_width[node] - data.width) / 2.0;
            let y = depth as f64 * config.vertical_spacing;
            positions.insert(data.id, Position::new(config.snap(x), config.snap(y)));

            let kids = &tree_children[node];
            if !kids.is_empty() {
                let combined = combined_width(kids, &subtree_width, config);
                let mut child_x = span_x + (subtree_width[node] - combined) / 2.0;
                for &child in kids {
                    stack.push((child, child_x, depth + 1));
                    child_x += subtree_width[child] + config.sibling_spacing;
                }
            }
        }
        cursor += subtree_width[root] + config.root_spacing;
    }

    debug!("arranged {count} nodes into {} trees", tree_roots.len());
    positions
}

/// Claim every node reachable from `root` that no earlier tree took.
/// Marking at discovery both deduplicates parallel edges and breaks
/// cycles, so both layout passes see the same tree.
fn claim_tree(
    root: usize,
    children: &[Vec<usize>],
    visited: &mut [bool],
    tree_children: &mut [Vec<usize>],
) {
    visited[root] = true;
    let mut queue = VecDeque::from([root]);
    while let Some(node) = queue.pop_front() {
        for &child in &children[node] {
            if !visited[child] {
                visited[child] = true;
                tree_children[node].push(child);
                queue.push_back(child);
            }
        }
    }
}

fn combined_width(kids: &[usize], subtree_width: &[f64], config: &CanvasConfig) -> f64 {
    kids.iter().map(|&c| subtree_width[c]).sum::<f64>()
        + config.sibling_spacing * (kids.len() - 1) as f64
}
