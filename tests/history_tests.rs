use taskmap::canvas::{CanvasController, Modifiers, PointerButton, ScreenPoint};
use taskmap::config::CanvasConfig;
use taskmap::domain::TaskGraph;

fn controller() -> CanvasController {
    CanvasController::new(CanvasConfig::default(), 1400.0, 900.0)
}

fn sp(x: f64, y: f64) -> ScreenPoint {
    ScreenPoint::new(x, y)
}

#[test]
fn test_undo_redo_round_trip_restores_every_state() {
    let mut canvas = controller();
    let mut states: Vec<TaskGraph> = vec![canvas.graph.clone()];

    // Three creations and one drag: four discrete commits.
    canvas.double_click(sp(100.0, 100.0));
    states.push(canvas.graph.clone());
    canvas.double_click(sp(500.0, 100.0));
    states.push(canvas.graph.clone());
    canvas.double_click(sp(900.0, 100.0));
    states.push(canvas.graph.clone());

    canvas.pointer_down(sp(200.0, 150.0), PointerButton::Primary, Modifiers::NONE);
    canvas.pointer_move(sp(260.0, 350.0));
    canvas.pointer_up(sp(260.0, 350.0));
    states.push(canvas.graph.clone());

    let commits = states.len() - 1;
    for i in (0..commits).rev() {
        assert!(canvas.undo());
        assert_eq!(canvas.graph, states[i]);
    }
    assert!(!canvas.undo()); // baseline reached

    for state in states.iter().skip(1) {
        assert!(canvas.redo());
        assert_eq!(&canvas.graph, state);
    }
    assert!(!canvas.redo());
    assert_eq!(&canvas.graph, states.last().unwrap());
}

#[test]
fn test_history_limit_evicts_oldest_states() {
    let config = CanvasConfig {
        history_limit: 3,
        ..CanvasConfig::default()
    };
    let mut canvas = CanvasController::new(config, 1400.0, 900.0);

    // Five commits against a limit of three.
    for i in 0..5 {
        canvas.double_click(sp(100.0 + 300.0 * i as f64, 100.0));
    }

    assert_eq!(canvas.history_len(), 3);
    assert!(canvas.undo());
    assert!(canvas.undo());
    assert!(!canvas.undo());
    assert!(!canvas.undo());
    // The oldest surviving state already holds the first three nodes.
    assert_eq!(canvas.graph.nodes.len(), 3);
}

#[test]
fn test_new_commit_discards_the_redo_branch() {
    let mut canvas = controller();
    canvas.double_click(sp(100.0, 100.0));
    canvas.double_click(sp(500.0, 100.0));

    assert!(canvas.undo());
    assert!(canvas.can_redo());

    canvas.double_click(sp(900.0, 500.0));
    assert!(!canvas.can_redo());
    assert!(!canvas.redo());
    assert_eq!(canvas.graph.nodes.len(), 2);
}

#[test]
fn test_undo_restores_selection() {
    let mut canvas = controller();
    let a = canvas.double_click(sp(100.0, 100.0)).unwrap();
    let b = canvas.double_click(sp(500.0, 100.0)).unwrap();

    assert_eq!(canvas.graph.selected_node_ids, vec![b]);
    assert!(canvas.undo());
    assert_eq!(canvas.graph.selected_node_ids, vec![a]);
    assert!(canvas.graph.node(b).is_none());
}

#[test]
fn test_undo_at_the_baseline_is_a_no_op() {
    let mut canvas = controller();
    assert!(!canvas.can_undo());
    assert!(!canvas.undo());
    assert!(!canvas.redo());
    assert!(canvas.graph.nodes.is_empty());
}
