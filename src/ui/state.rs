use clap::ValueEnum;

use crate::cli::PROGRAM;
use crate::loader::{Decoder, RasterImage};
use crate::navigator::{Direction, Navigator, Step};
use crate::resync::{Resynchronizer, Resynced};
use crate::ui::display::{Action, Display, FrameInput};
use crate::ui::viewport::{Transform, Viewport};

// ---------------------------------------------------------------------------
// Policies and outcomes
// ---------------------------------------------------------------------------

/// When auto-size recomputes the fit after navigation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum RefitPolicy {
    /// Only when the image had to be decoded. Cached images keep the
    /// current scale and pan.
    #[default]
    FirstLoad,
    /// On every navigation, cache hits included.
    EveryNavigation,
}

/// Why the session ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Termination {
    Quit,
    DirectoryUnreadable,
    DirectoryEmpty,
    NoViewableImages,
    ReloadFailed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit(Termination),
}

/// What to present this frame.
pub struct Frame<'a> {
    pub image: &'a RasterImage,
    pub transform: Transform,
}

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// Everything the update/draw cycle touches. Owned by the window loop, which
/// hands in a [`Display`] on every call.
pub struct ViewerState<D: Decoder> {
    decoder: D,
    pub navigator: Navigator,
    pub viewport: Viewport,
    resync: Resynchronizer,
    refit: RefitPolicy,
    /// Set for one frame after the image changed, so the old transform is
    /// never shown with the new image.
    skip_frame: bool,
    terminated: Option<Termination>,
}

impl<D: Decoder> ViewerState<D> {
    pub fn new(navigator: Navigator, decoder: D, resync_interval: u32, refit: RefitPolicy) -> Self {
        Self {
            decoder,
            navigator,
            viewport: Viewport::default(),
            resync: Resynchronizer::new(resync_interval),
            refit,
            skip_frame: false,
            terminated: None,
        }
    }

    /// Called once the window exists.
    pub fn start(&mut self, display: &mut dyn Display) {
        self.update_title(display);
        if self.viewport.auto_size {
            self.refit(display, display.is_fullscreen());
        }
    }

    /// The window changed size or moved to a screen with another scale.
    pub fn resized(&mut self, display: &dyn Display) {
        if self.viewport.auto_size {
            self.refit(display, display.is_fullscreen());
        }
    }

    pub fn termination(&self) -> Option<Termination> {
        self.terminated
    }

    /// One update step: resync when due, then apply this tick's input.
    pub fn update(&mut self, input: &FrameInput, display: &mut dyn Display) -> Flow {
        if let Some(t) = self.terminated {
            return Flow::Exit(t);
        }

        if self.resync.tick() {
            self.run_resync(display);
        }

        for &action in &input.actions {
            if self.terminated.is_some() {
                break;
            }
            self.apply(action, display);
        }

        if let Some(at) = input.press_at {
            self.viewport.begin_drag(at);
        }
        match input.release_at {
            Some(at) => {
                self.viewport.drag_to(at);
                self.viewport.end_drag();
            }
            None => self.viewport.drag_to(input.cursor),
        }
        if input.wheel != 0.0 {
            self.viewport.zoom_by(input.wheel);
        }

        match self.terminated {
            Some(t) => Flow::Exit(t),
            None => Flow::Continue,
        }
    }

    /// One draw step. `None` means keep whatever is on screen.
    pub fn draw(&mut self) -> Option<Frame<'_>> {
        if self.terminated.is_some() {
            return None;
        }
        if self.skip_frame {
            self.skip_frame = false;
            return None;
        }
        let image = self.navigator.active_handle()?;
        Some(Frame {
            image: image.as_ref(),
            transform: self.viewport.transform(),
        })
    }

    /// Back-buffer size in device pixels.
    pub fn layout(&self, display: &dyn Display) -> (u32, u32) {
        let (w, h) = display.window_size();
        let s = display.scale_factor();
        (((w * s).round() as u32).max(1), ((h * s).round() as u32).max(1))
    }

    fn apply(&mut self, action: Action, display: &mut dyn Display) {
        match action {
            Action::Quit => self.terminate(Termination::Quit),
            Action::ToggleFullscreen => {
                let on = !display.is_fullscreen();
                display.set_fullscreen(on);
                if self.viewport.auto_size {
                    self.refit(display, on);
                }
            }
            Action::ToggleAutoSize => {
                self.viewport.auto_size = !self.viewport.auto_size;
                log::debug!("auto-size {}", if self.viewport.auto_size { "on" } else { "off" });
                if self.viewport.auto_size {
                    self.refit(display, display.is_fullscreen());
                }
            }
            Action::Reload => match self.navigator.reload(&self.decoder) {
                Ok(_) => {
                    self.skip_frame = true;
                    if self.viewport.auto_size {
                        self.refit(display, display.is_fullscreen());
                    }
                }
                Err(e) => {
                    log::warn!("Reload failed: {e}");
                    self.terminate(Termination::ReloadFailed);
                }
            },
            Action::Previous => {
                let step = self.navigator.advance(Direction::Previous, &self.decoder);
                self.navigated(step, display);
            }
            Action::Next => {
                let step = self.navigator.advance(Direction::Next, &self.decoder);
                self.navigated(step, display);
            }
            Action::Zoom(preset) => {
                log::debug!("zoom preset {preset:?}");
                match preset.scale() {
                    Some(scale) => self.viewport.set_scale(scale),
                    None => self.refit(display, display.is_fullscreen()),
                }
            }
        }
    }

    fn navigated(&mut self, step: Step, display: &mut dyn Display) {
        match step {
            Step::Exhausted => self.terminate(Termination::NoViewableImages),
            Step::Shown { first_load, .. } => {
                self.skip_frame = true;
                let refit = match self.refit {
                    RefitPolicy::FirstLoad => first_load,
                    RefitPolicy::EveryNavigation => true,
                };
                if self.viewport.auto_size && refit {
                    self.refit(display, display.is_fullscreen());
                }
                self.update_title(display);
            }
        }
    }

    fn run_resync(&mut self, display: &mut dyn Display) {
        match self.navigator.resync() {
            Ok(Resynced::Kept { .. }) => self.update_title(display),
            Ok(Resynced::ActiveRemoved) => {
                if let Some(step) = self.navigator.settle(&self.decoder) {
                    self.navigated(step, display);
                }
            }
            Ok(Resynced::Empty) => self.terminate(Termination::DirectoryEmpty),
            Err(e) => {
                log::error!("{e}");
                self.terminate(Termination::DirectoryUnreadable);
            }
        }
    }

    /// Fit the active image to the window, or to the monitor when fullscreen.
    fn refit(&mut self, display: &dyn Display, fullscreen: bool) {
        let Some(image) = self.navigator.active_handle() else {
            return;
        };
        let (w, h) = if fullscreen {
            display.monitor_size().unwrap_or_else(|| display.window_size())
        } else {
            display.window_size()
        };
        let s = display.scale_factor();
        let image = (image.width as f64, image.height as f64);
        self.viewport.fit((w * s, h * s), image);
    }

    fn update_title(&self, display: &mut dyn Display) {
        let Some(entry) = self.navigator.active_entry() else {
            return;
        };
        let name = entry
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        display.set_title(&format!(
            "{PROGRAM} - {name} [{}/{}]",
            self.navigator.active_index() + 1,
            self.navigator.index().len()
        ));
    }

    fn terminate(&mut self, reason: Termination) {
        if self.terminated.is_none() {
            log::info!("Session ending: {reason:?}");
            self.terminated = Some(reason);
        }
    }
}
