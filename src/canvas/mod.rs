pub mod controller;
pub mod input;
pub mod viewport;

pub use controller::{CanvasController, Gesture};
pub use input::{Key, Modifiers, PointerButton, ScreenPoint, UiRequest};
pub use viewport::{Viewport, WorldRect};
