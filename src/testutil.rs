//! Fakes for the decoder and display capabilities, plus scratch-file helpers.

use std::cell::Cell;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::DecodeError;
use crate::loader::{Decoder, RasterImage};
use crate::ui::display::Display;

/// Write a fake image: a text file holding `WxH`.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("{width}x{height}")).unwrap();
    path
}

/// Write a file the fake decoder refuses.
pub fn write_broken(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "garbage").unwrap();
    path
}

pub fn set_mtime(path: &Path, t: SystemTime) {
    fs::File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(t)
        .unwrap();
}

/// Decodes `WxH` text files into blank images and counts every attempt.
#[derive(Default)]
pub struct FakeDecoder {
    calls: Cell<usize>,
}

impl FakeDecoder {
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl Decoder for FakeDecoder {
    fn decode(&self, path: &Path) -> Result<RasterImage, DecodeError> {
        self.calls.set(self.calls.get() + 1);
        let text = fs::read_to_string(path).map_err(|source| DecodeError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let dims = text
            .trim()
            .split_once('x')
            .and_then(|(w, h)| Some((w.parse().ok()?, h.parse().ok()?)));
        match dims {
            Some((w, h)) => Ok(RasterImage::blank(w, h)),
            None => Err(DecodeError::Unsupported(path.to_path_buf())),
        }
    }
}

/// Fixed geometry; records what the runtime asks of the window.
pub struct FakeDisplay {
    pub window: (f64, f64),
    pub monitor: Option<(f64, f64)>,
    pub scale_factor: f64,
    pub fullscreen: bool,
    pub title: String,
}

impl Default for FakeDisplay {
    fn default() -> Self {
        Self {
            window: (1920.0, 1080.0),
            monitor: Some((2560.0, 1440.0)),
            scale_factor: 1.0,
            fullscreen: false,
            title: String::new(),
        }
    }
}

impl Display for FakeDisplay {
    fn window_size(&self) -> (f64, f64) {
        self.window
    }

    fn monitor_size(&self) -> Option<(f64, f64)> {
        self.monitor
    }

    fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn set_fullscreen(&mut self, on: bool) {
        self.fullscreen = on;
    }

    fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }
}
