use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{BrowseError, DecodeError};
use crate::files::{DirectoryIndex, RasterEntry};
use crate::loader::{Decoder, RasterImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

impl Direction {
    /// Index `k` steps away from `from` in this direction, wrapping around.
    pub fn offset(self, from: usize, k: usize, len: usize) -> usize {
        let k = k % len;
        match self {
            Direction::Next => (from + k) % len,
            Direction::Previous => (from + len - k) % len,
        }
    }
}

/// Result of moving the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The entry at `index` is now active. `first_load` is set when its image
    /// was decoded by this step rather than taken from the cache.
    Shown { index: usize, first_load: bool },
    /// Every entry is unloadable; there is nothing left to show.
    Exhausted,
}

/// Cursor over the images of one directory.
///
/// The index owns the decoded images. `active_handle` is a second reference
/// to whatever is on screen, which can outlive the entry's own handle when a
/// resync finds the file modified.
pub struct Navigator {
    dir: PathBuf,
    pub(crate) index: DirectoryIndex,
    pub(crate) active: usize,
    pub(crate) active_handle: Option<Arc<RasterImage>>,
}

impl Navigator {
    /// Index the directory containing `path` and decode `path` itself.
    /// Any failure here is fatal: the viewer never opens a window for it.
    pub fn open(path: &Path, decoder: &dyn Decoder) -> Result<Self, BrowseError> {
        let path = fs::canonicalize(path).map_err(|source| BrowseError::Resolve {
            path: path.to_path_buf(),
            source,
        })?;
        let dir = path
            .parent()
            .ok_or_else(|| BrowseError::NoParent(path.clone()))?
            .to_path_buf();

        let mut index = DirectoryIndex::build(&dir)?;
        log::info!("Indexed {} images in {}", index.len(), dir.display());

        let active = index
            .position(&path)
            .ok_or_else(|| BrowseError::NotAnImage(path.clone()))?;
        let handle = match index.get_mut(active) {
            Some(entry) => Arc::clone(entry.load(decoder)?.image()),
            None => return Err(BrowseError::NotAnImage(path)),
        };

        Ok(Self {
            dir,
            index,
            active,
            active_handle: Some(handle),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn index(&self) -> &DirectoryIndex {
        &self.index
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_entry(&self) -> Option<&RasterEntry> {
        self.index.get(self.active)
    }

    pub fn active_handle(&self) -> Option<&Arc<RasterImage>> {
        self.active_handle.as_ref()
    }

    /// Move one step, skipping unloadable entries and decoding lazily.
    ///
    /// At most `len` candidates are tried; the last one is the entry we
    /// started from, so a directory with a single good image cycles back to it.
    pub fn advance(&mut self, direction: Direction, decoder: &dyn Decoder) -> Step {
        let len = self.index.len();
        if len == 0 {
            return Step::Exhausted;
        }
        let from = self.active;
        self.visit((1..=len).map(move |k| direction.offset(from, k, len)), decoder)
    }

    /// Make sure the active entry has something on screen. Needed after a
    /// resync dropped the previously active file. Returns `None` when nothing
    /// had to change.
    pub fn settle(&mut self, decoder: &dyn Decoder) -> Option<Step> {
        if self.active_handle.is_some() {
            return None;
        }
        let len = self.index.len();
        if len == 0 {
            return Some(Step::Exhausted);
        }
        let from = self.active;
        Some(self.visit((0..len).map(move |k| Direction::Next.offset(from, k, len)), decoder))
    }

    /// Decode the active file again, replacing its cached image.
    pub fn reload(&mut self, decoder: &dyn Decoder) -> Result<Arc<RasterImage>, DecodeError> {
        let Some(entry) = self.index.get_mut(self.active) else {
            return Err(DecodeError::NoActive(self.dir.clone()));
        };
        match entry.reload(decoder) {
            Ok(handle) => {
                self.active_handle = Some(Arc::clone(&handle));
                Ok(handle)
            }
            Err(e) => {
                self.active_handle = None;
                Err(e)
            }
        }
    }

    fn visit(&mut self, candidates: impl Iterator<Item = usize>, decoder: &dyn Decoder) -> Step {
        for idx in candidates {
            let Some(entry) = self.index.get_mut(idx) else {
                continue;
            };
            if entry.unloadable {
                continue;
            }
            // Failures are logged and flagged by `load`; just try the next one.
            let Ok(loaded) = entry.load(decoder) else {
                continue;
            };
            log::debug!(
                "[nav] move {} -> {} (first_load={})",
                self.active,
                idx,
                loaded.is_first_load()
            );
            self.active = idx;
            self.active_handle = Some(Arc::clone(loaded.image()));
            return Step::Shown {
                index: idx,
                first_load: loaded.is_first_load(),
            };
        }
        Step::Exhausted
    }
}
