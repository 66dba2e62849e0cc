//! What the viewer needs from a window, and what it gets back from one per tick.

use crate::ui::viewport::ZoomPreset;

/// Window/monitor side of the viewer. Sizes are logical; multiply by
/// [`Display::scale_factor`] for device pixels.
pub trait Display {
    fn window_size(&self) -> (f64, f64);
    fn monitor_size(&self) -> Option<(f64, f64)>;
    fn scale_factor(&self) -> f64;
    fn is_fullscreen(&self) -> bool;
    fn set_fullscreen(&mut self, on: bool);
    fn set_title(&mut self, title: &str);
}

/// Keyboard commands, already decoded from key presses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleFullscreen,
    ToggleAutoSize,
    Reload,
    Previous,
    Next,
    Zoom(ZoomPreset),
}

/// Input gathered between two update ticks.
#[derive(Clone, Debug, Default)]
pub struct FrameInput {
    pub actions: Vec<Action>,
    /// Pointer position in device pixels.
    pub cursor: (f64, f64),
    /// Where the left button went down, if it did this tick.
    pub press_at: Option<(f64, f64)>,
    /// Where the left button came up, if it did this tick.
    pub release_at: Option<(f64, f64)>,
    /// Wheel movement in lines.
    pub wheel: f64,
}

impl FrameInput {
    /// Forget edge-triggered input once a tick consumed it. The cursor
    /// position carries over.
    pub fn clear(&mut self) {
        self.actions.clear();
        self.press_at = None;
        self.release_at = None;
        self.wheel = 0.0;
    }
}
