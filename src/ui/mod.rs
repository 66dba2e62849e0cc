use std::error::Error;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use softbuffer::Surface;
use winit::application::ApplicationHandler;
use winit::dpi::{LogicalSize, PhysicalPosition};
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Fullscreen, Window, WindowId};

use crate::cli::PROGRAM;
use crate::loader::Decoder;
use crate::ui::display::{Action, Display, FrameInput};
use crate::ui::state::{Flow, Termination, ViewerState};
use crate::ui::viewport::ZoomPreset;

pub mod display;
pub mod render;
pub mod state;
pub mod viewport;

// ---------------------------------------------------------------------------
// Key bindings
// ---------------------------------------------------------------------------

pub fn action_for_key(key: &Key) -> Option<Action> {
    match key {
        Key::Named(NamedKey::Escape) => Some(Action::Quit),
        Key::Named(NamedKey::ArrowLeft | NamedKey::Backspace) => Some(Action::Previous),
        Key::Named(NamedKey::ArrowRight | NamedKey::Space) => Some(Action::Next),
        Key::Character(s) => match s.to_lowercase().as_str() {
            "q" => Some(Action::Quit),
            "f" => Some(Action::ToggleFullscreen),
            "a" => Some(Action::ToggleAutoSize),
            "r" => Some(Action::Reload),
            "h" => Some(Action::Previous),
            "l" => Some(Action::Next),
            "1" => Some(Action::Zoom(ZoomPreset::Actual)),
            "2" => Some(Action::Zoom(ZoomPreset::Double)),
            "3" => Some(Action::Zoom(ZoomPreset::Fit)),
            "4" => Some(Action::Zoom(ZoomPreset::Quad)),
            _ => None,
        },
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// winit window as the display capability
// ---------------------------------------------------------------------------

struct WinitDisplay<'a> {
    window: &'a Window,
}

impl Display for WinitDisplay<'_> {
    fn window_size(&self) -> (f64, f64) {
        let size = self.window.inner_size().to_logical::<f64>(self.window.scale_factor());
        (size.width, size.height)
    }

    fn monitor_size(&self) -> Option<(f64, f64)> {
        self.window.current_monitor().map(|m| {
            let size = m.size().to_logical::<f64>(m.scale_factor());
            (size.width, size.height)
        })
    }

    fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }

    fn is_fullscreen(&self) -> bool {
        self.window.fullscreen().is_some()
    }

    fn set_fullscreen(&mut self, on: bool) {
        self.window
            .set_fullscreen(on.then_some(Fullscreen::Borderless(None)));
    }

    fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }
}

// ---------------------------------------------------------------------------
// Application handler (winit 0.30 style)
// ---------------------------------------------------------------------------

pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    /// Time between update ticks.
    pub tick: Duration,
}

pub struct App<D: Decoder> {
    pub state: ViewerState<D>,
    config: WindowConfig,
    window: Option<Arc<Window>>,
    _context: Option<softbuffer::Context<Arc<Window>>>,
    surface: Option<Surface<Arc<Window>, Arc<Window>>>,
    input: FrameInput,
    next_tick: Instant,
    tick_due: bool,
}

impl<D: Decoder> App<D> {
    pub fn new(state: ViewerState<D>, config: WindowConfig) -> Self {
        Self {
            state,
            config,
            window: None,
            _context: None,
            surface: None,
            input: FrameInput::default(),
            next_tick: Instant::now(),
            tick_due: false,
        }
    }

    /// Why the loop stopped, once it has.
    pub fn termination(&self) -> Option<Termination> {
        self.state.termination()
    }

    fn create_window(&mut self, event_loop: &ActiveEventLoop) -> Result<(), Box<dyn Error>> {
        let attrs = Window::default_attributes()
            .with_title(PROGRAM)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height))
            .with_maximized(true);
        let window = Arc::new(event_loop.create_window(attrs)?);
        let context = softbuffer::Context::new(Arc::clone(&window))?;
        let surface = Surface::new(&context, Arc::clone(&window))?;

        self.state.start(&mut WinitDisplay { window: &*window });
        window.request_redraw();
        self.window = Some(window);
        self._context = Some(context);
        self.surface = Some(surface);
        Ok(())
    }

    fn present(&mut self, window: &Window) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };
        let (fb_w, fb_h) = self.state.layout(&WinitDisplay { window });
        let Some(frame) = self.state.draw() else {
            return;
        };
        let (Some(w), Some(h)) = (NonZeroU32::new(fb_w), NonZeroU32::new(fb_h)) else {
            return;
        };
        if let Err(e) = surface.resize(w, h) {
            log::warn!("Surface resize failed: {e}");
            return;
        }
        match surface.buffer_mut() {
            Ok(mut buffer) => {
                render::draw_frame(&mut buffer, fb_w, fb_h, frame.image, &frame.transform);
                if let Err(e) = buffer.present() {
                    log::warn!("Present failed: {e}");
                }
            }
            Err(e) => log::warn!("No frame buffer: {e}"),
        }
    }
}

impl<D: Decoder> ApplicationHandler for App<D> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(e) = self.create_window(event_loop) {
            log::error!("Cannot open window: {e}");
            event_loop.exit();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(window) = self.window.clone() {
                    self.state.resized(&WinitDisplay { window: &*window });
                    window.request_redraw();
                }
            }

            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed {
                    return;
                }
                if let Some(action) = action_for_key(&event.logical_key) {
                    // Holding a navigation key keeps stepping; everything else fires once.
                    let repeatable = matches!(action, Action::Previous | Action::Next);
                    if !event.repeat || repeatable {
                        self.input.actions.push(action);
                    }
                }
            }

            WindowEvent::MouseInput { state, button, .. } => {
                if button == MouseButton::Left {
                    match state {
                        ElementState::Pressed => {
                            self.input.press_at = Some(self.input.cursor);
                            self.input.release_at = None;
                        }
                        ElementState::Released => self.input.release_at = Some(self.input.cursor),
                    }
                }
            }

            WindowEvent::CursorMoved {
                position: PhysicalPosition { x, y },
                ..
            } => {
                self.input.cursor = (x, y);
            }

            WindowEvent::MouseWheel { delta, .. } => {
                let y = match delta {
                    MouseScrollDelta::LineDelta(_, y) => y as f64,
                    MouseScrollDelta::PixelDelta(PhysicalPosition { y, .. }) => y / 40.0,
                };
                self.input.wheel += y;
            }

            WindowEvent::RedrawRequested => {
                let Some(window) = self.window.clone() else {
                    return;
                };
                if self.tick_due {
                    self.tick_due = false;
                    let flow = self.state.update(&self.input, &mut WinitDisplay { window: &*window });
                    self.input.clear();
                    if let Flow::Exit(reason) = flow {
                        log::info!("Exiting: {reason:?}");
                        event_loop.exit();
                        return;
                    }
                }
                self.present(&window);
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        if now >= self.next_tick {
            self.next_tick = now + self.config.tick;
            self.tick_due = true;
            if let Some(ref window) = self.window {
                window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }
}
