use serde::{Deserialize, Serialize};

use crate::canvas::input::ScreenPoint;
use crate::config::CanvasConfig;
use crate::domain::Position;

/// An axis-aligned rectangle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl WorldRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Normalized rectangle spanning two arbitrary corners, so a box-select
    /// dragged in any direction yields the same rect.
    pub fn from_corners(a: Position, b: Position) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self {
            x,
            y,
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Boundary-inclusive containment.
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }

    pub fn union(&self, other: &WorldRect) -> WorldRect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        WorldRect::new(x, y, right - x, bottom - y)
    }
}

/// The visible world-space window mapped onto the rendering surface.
/// Position is unbounded (infinite canvas); the scale is clamped relative
/// to the baseline window, which is the surface at scale 1.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    rect: WorldRect,
    surface_width: f64,
    surface_height: f64,
    baseline: WorldRect,
    min_scale: f64,
    max_scale: f64,
    zoom_step: f64,
    fit_padding: f64,
}

impl Viewport {
    pub fn new(config: &CanvasConfig, surface_width: f64, surface_height: f64) -> Self {
        let baseline = WorldRect::new(0.0, 0.0, surface_width.max(1.0), surface_height.max(1.0));
        Self {
            rect: baseline,
            surface_width: surface_width.max(1.0),
            surface_height: surface_height.max(1.0),
            baseline,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            zoom_step: config.zoom_step,
            fit_padding: config.fit_padding,
        }
    }

    pub fn rect(&self) -> WorldRect {
        self.rect
    }

    pub fn baseline(&self) -> WorldRect {
        self.baseline
    }

    /// Screen pixels per world unit.
    pub fn scale(&self) -> f64 {
        self.surface_width / self.rect.width
    }

    /// The host surface was resized; keep the world center and scale. The
    /// baseline window follows the surface, so resetting an empty board
    /// afterwards frames the new surface rather than the original one.
    pub fn set_surface_size(&mut self, width: f64, height: f64) {
        let scale = self.scale();
        let center = self.rect.center();
        self.surface_width = width.max(1.0);
        self.surface_height = height.max(1.0);
        self.baseline.width = self.surface_width;
        self.baseline.height = self.surface_height;
        self.rect.width = self.surface_width / scale;
        self.rect.height = self.surface_height / scale;
        self.rect.x = center.x - self.rect.width / 2.0;
        self.rect.y = center.y - self.rect.height / 2.0;
    }

    pub fn screen_to_world(&self, screen: ScreenPoint) -> Position {
        let scale = self.scale();
        Position::new(self.rect.x + screen.x / scale, self.rect.y + screen.y / scale)
    }

    pub fn world_to_screen(&self, world: Position) -> ScreenPoint {
        let scale = self.scale();
        ScreenPoint::new((world.x - self.rect.x) * scale, (world.y - self.rect.y) * scale)
    }

    /// Scale the view by `factor` (> 1 zooms in) around a world anchor that
    /// keeps its screen position, defaulting to the view center. The
    /// resulting scale is clamped to the configured range.
    pub fn zoom(&mut self, factor: f64, anchor: Option<Position>) {
        let anchor = anchor.unwrap_or_else(|| self.rect.center());
        let old = self.rect;
        let new_scale = (self.scale() * factor).clamp(self.min_scale, self.max_scale);
        let width = self.surface_width / new_scale;
        let height = self.surface_height / new_scale;
        // Keep the anchor at the same fraction of the view it occupied.
        let fx = if old.width > 0.0 { (anchor.x - old.x) / old.width } else { 0.5 };
        let fy = if old.height > 0.0 { (anchor.y - old.y) / old.height } else { 0.5 };
        self.rect = WorldRect::new(anchor.x - fx * width, anchor.y - fy * height, width, height);
    }

    pub fn zoom_in(&mut self) {
        self.zoom(self.zoom_step, None);
    }

    pub fn zoom_out(&mut self) {
        self.zoom(1.0 / self.zoom_step, None);
    }

    /// Translate the view so content follows a pointer dragged by
    /// `screen_delta` pixels. No positional clamping.
    pub fn pan(&mut self, screen_delta: ScreenPoint) {
        let scale = self.scale();
        self.rect.x -= screen_delta.x / scale;
        self.rect.y -= screen_delta.y / scale;
    }

    /// Frame the given content bounds: pad them, widen one axis so the box
    /// matches the surface aspect ratio, then center. Matching aspect
    /// before centering keeps a very wide or very tall board from being
    /// clipped on one axis. An empty or degenerate box resets to the
    /// baseline window.
    pub fn fit_to_content(&mut self, bounds: &[WorldRect]) {
        let Some(content) = bounds
            .iter()
            .copied()
            .reduce(|acc, r| acc.union(&r))
        else {
            self.rect = self.baseline;
            return;
        };
        if content.width <= f64::EPSILON && content.height <= f64::EPSILON {
            self.rect = self.baseline;
            return;
        }

        let padded = WorldRect::new(
            content.x - self.fit_padding,
            content.y - self.fit_padding,
            content.width + 2.0 * self.fit_padding,
            content.height + 2.0 * self.fit_padding,
        );

        let aspect = self.surface_width / self.surface_height;
        let (width, height) = if padded.width / padded.height < aspect {
            (padded.height * aspect, padded.height)
        } else {
            (padded.width, padded.width / aspect)
        };
        let center = padded.center();
        self.rect = WorldRect::new(center.x - width / 2.0, center.y - height / 2.0, width, height);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport::new(&CanvasConfig::default(), 1400.0, 900.0)
    }

    #[test]
    fn test_screen_world_round_trip() {
        let mut vp = viewport();
        vp.zoom(2.0, Some(Position::new(100.0, 100.0)));
        vp.pan(ScreenPoint::new(-35.0, 60.0));

        let screen = ScreenPoint::new(321.0, 87.0);
        let back = vp.world_to_screen(vp.screen_to_world(screen));
        assert!((back.x - screen.x).abs() < 1e-9);
        assert!((back.y - screen.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_keeps_anchor_fixed_on_screen() {
        let mut vp = viewport();
        let anchor = Position::new(250.0, 130.0);
        let before = vp.world_to_screen(anchor);

        vp.zoom(1.7, Some(anchor));
        let after = vp.world_to_screen(anchor);

        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_scale_is_clamped() {
        let mut vp = viewport();
        for _ in 0..50 {
            vp.zoom(2.0, None);
        }
        assert!((vp.scale() - 5.0).abs() < 1e-9);

        for _ in 0..100 {
            vp.zoom(0.5, None);
        }
        assert!((vp.scale() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_pan_moves_content_with_pointer() {
        let mut vp = viewport();
        let world = Position::new(0.0, 0.0);
        let before = vp.world_to_screen(world);

        vp.pan(ScreenPoint::new(100.0, -40.0));
        let after = vp.world_to_screen(world);

        assert!((after.x - (before.x + 100.0)).abs() < 1e-9);
        assert!((after.y - (before.y - 40.0)).abs() < 1e-9);
    }

    #[test]
    fn test_fit_to_content_empty_resets_to_baseline() {
        let mut vp = viewport();
        vp.zoom(3.0, None);
        vp.pan(ScreenPoint::new(500.0, 500.0));

        vp.fit_to_content(&[]);
        assert_eq!(vp.rect(), vp.baseline());
    }

    #[test]
    fn test_fit_to_content_empty_after_resize_frames_new_surface() {
        let mut vp = viewport();
        vp.zoom(2.0, None);
        vp.set_surface_size(800.0, 800.0);

        vp.fit_to_content(&[]);
        let rect = vp.rect();
        assert_eq!((rect.width, rect.height), (800.0, 800.0));
        assert!((vp.scale() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_to_content_degenerate_resets_to_baseline() {
        let mut vp = viewport();
        vp.fit_to_content(&[WorldRect::new(50.0, 50.0, 0.0, 0.0)]);
        assert_eq!(vp.rect(), vp.baseline());
    }

    #[test]
    fn test_fit_to_content_contains_padded_box_and_matches_aspect() {
        let mut vp = viewport();
        // Much wider than the surface aspect ratio.
        let content = WorldRect::new(0.0, 0.0, 10_000.0, 100.0);
        vp.fit_to_content(&[content]);

        let rect = vp.rect();
        let aspect = 1400.0 / 900.0;
        assert!((rect.width / rect.height - aspect).abs() < 1e-9);
        assert!(rect.contains(Position::new(-80.0, -80.0)));
        assert!(rect.contains(Position::new(10_080.0, 180.0)));

        // And a very tall one.
        vp.fit_to_content(&[WorldRect::new(0.0, 0.0, 100.0, 10_000.0)]);
        let rect = vp.rect();
        assert!((rect.width / rect.height - aspect).abs() < 1e-9);
        assert!(rect.contains(Position::new(180.0, 10_080.0)));
    }
}
