use serde::{Deserialize, Serialize};

/// What `CreateSubtasks` does when a subtask title matches an existing node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SubtaskMergePolicy {
    /// Reuse the existing node and skip the edge if one already links them.
    MergeByTitle,
    /// Always create a fresh node, even for duplicate titles.
    AlwaysCreate,
}

/// Tunable constants for the canvas. Fixed defaults, no external tuning
/// surface required.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Snapping increment for all position and size edits, in world units.
    pub grid_unit: f64,

    /// Lower bounds for node size.
    pub min_node_width: f64,
    pub min_node_height: f64,

    /// Size given to newly created nodes.
    pub default_node_width: f64,
    pub default_node_height: f64,

    /// Title given to nodes created by double-click.
    pub default_node_title: String,

    /// Where programmatic node creation lands when no position is given.
    pub default_spawn_x: f64,
    pub default_spawn_y: f64,

    /// Horizontal gap between sibling subtrees in auto-layout.
    pub sibling_spacing: f64,
    /// Horizontal gap between layout roots.
    pub root_spacing: f64,
    /// Vertical gap between tree rows.
    pub vertical_spacing: f64,

    /// Padding added around the content box by fit-to-content.
    pub fit_padding: f64,

    /// Zoom scale clamp relative to the baseline window.
    pub min_scale: f64,
    pub max_scale: f64,
    /// Factor applied by one zoom-in/zoom-out step.
    pub zoom_step: f64,

    /// Hit radius for connection handles and edge picking, in screen pixels.
    pub handle_hit_radius: f64,
    /// Side length of the resize glyph square, in screen pixels.
    pub resize_glyph_size: f64,

    /// Maximum number of undo snapshots kept.
    pub history_limit: usize,

    /// Quiet period before a commit burst is handed to the persistence
    /// callback, in milliseconds.
    pub autosave_debounce_ms: u64,

    pub subtask_merge: SubtaskMergePolicy,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            grid_unit: 20.0,
            min_node_width: 120.0,
            min_node_height: 60.0,
            default_node_width: 200.0,
            default_node_height: 100.0,
            default_node_title: "New Task".to_string(),
            default_spawn_x: 0.0,
            default_spawn_y: 0.0,
            sibling_spacing: 40.0,
            root_spacing: 80.0,
            vertical_spacing: 160.0,
            fit_padding: 80.0,
            min_scale: 0.1,
            max_scale: 5.0,
            zoom_step: 1.2,
            handle_hit_radius: 10.0,
            resize_glyph_size: 12.0,
            history_limit: 50,
            autosave_debounce_ms: 500,
            subtask_merge: SubtaskMergePolicy::MergeByTitle,
        }
    }
}

impl CanvasConfig {
    /// Snap a coordinate to the nearest multiple of the grid unit.
    pub fn snap(&self, value: f64) -> f64 {
        (value / self.grid_unit).round() * self.grid_unit
    }

    /// Snap a width/height pair and clamp it to the minimum node size.
    pub fn snap_size(&self, width: f64, height: f64) -> (f64, f64) {
        (
            self.snap(width).max(self.min_node_width),
            self.snap(height).max(self.min_node_height),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0)]
    #[case(9.9)]
    #[case(10.0)]
    #[case(-37.2)]
    #[case(123_456.7)]
    fn snap_is_idempotent(#[case] value: f64) {
        let config = CanvasConfig::default();
        let once = config.snap(value);
        assert_eq!(config.snap(once), once);
    }

    #[test]
    fn snap_rounds_to_nearest_grid_line() {
        let config = CanvasConfig::default();
        assert_eq!(config.snap(29.0), 20.0);
        assert_eq!(config.snap(31.0), 40.0);
        assert_eq!(config.snap(-9.0), 0.0);
        assert_eq!(config.snap(-11.0), -20.0);
    }

    #[test]
    fn snap_size_clamps_to_minimum() {
        let config = CanvasConfig::default();
        let (w, h) = config.snap_size(35.0, 10.0);
        assert_eq!(w, config.min_node_width);
        assert_eq!(h, config.min_node_height);

        let (w, h) = config.snap_size(205.0, 95.0);
        assert_eq!(w, 200.0);
        assert_eq!(h, 100.0);
    }
}
