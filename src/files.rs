use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::BrowseError;
use crate::loader::RasterImage;

/// Extensions we have a decoder for. Matched case-sensitively against the
/// text after the last dot of the file name.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpeg", "jpg", "tiff", "tif", "png", "bmp", "webp"];

/// Extension of `path` as it appears in the file name, without the dot.
pub fn extension_of(path: &Path) -> Option<&str> {
    let name = path.file_name()?.to_str()?;
    name.rfind('.').map(|i| &name[i + 1..])
}

pub fn is_image_file(path: &Path) -> bool {
    extension_of(path).is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext))
}

// ---------------------------------------------------------------------------
// Raster cache entry
// ---------------------------------------------------------------------------

/// Everything we know about one file in the browsed directory.
#[derive(Debug)]
pub struct RasterEntry {
    pub path: PathBuf,
    pub mod_time: SystemTime,
    /// Set once a decode attempt failed. Sticky until the entry is rebuilt
    /// cold by a resync that saw a newer modification time.
    pub unloadable: bool,
    pub(crate) handle: Option<Arc<RasterImage>>,
}

impl RasterEntry {
    pub fn new(path: PathBuf, mod_time: SystemTime) -> Self {
        Self {
            path,
            mod_time,
            unloadable: false,
            handle: None,
        }
    }

    pub fn cached(&self) -> Option<&Arc<RasterImage>> {
        self.handle.as_ref()
    }

    /// Take over the load state of the same file from a previous scan, unless
    /// the file changed on disk since then.
    fn inherit(&mut self, old: RasterEntry) {
        if self.mod_time > old.mod_time {
            log::info!("{} changed on disk, dropping cached image", self.path.display());
            return;
        }
        self.unloadable = old.unloadable;
        self.handle = old.handle;
    }
}

// ---------------------------------------------------------------------------
// Directory index
// ---------------------------------------------------------------------------

/// Supported images of one directory, in file-name order.
#[derive(Debug, Default)]
pub struct DirectoryIndex {
    entries: Vec<RasterEntry>,
}

impl DirectoryIndex {
    /// Scan `dir` once. Subdirectories and unsupported files are skipped; a
    /// file that vanishes between listing and stat is skipped too.
    pub fn build(dir: &Path) -> Result<Self, BrowseError> {
        let read_dir = fs::read_dir(dir).map_err(|source| BrowseError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut entries = Vec::new();
        for dirent in read_dir {
            let dirent = dirent.map_err(|source| BrowseError::ReadDir {
                path: dir.to_path_buf(),
                source,
            })?;
            let path = dir.join(dirent.file_name());
            if !is_image_file(&path) {
                continue;
            }
            // Follows symlinks, so a link to a directory is skipped as well.
            let meta = match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(e) => {
                    log::debug!("skipping {}: {}", path.display(), e);
                    continue;
                }
            };
            if meta.is_dir() {
                continue;
            }
            let mod_time = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
            entries.push(RasterEntry::new(path, mod_time));
        }
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        Ok(Self { entries })
    }

    /// Move cached handles and failure flags over from `old` for every file
    /// that has not been modified since `old` was built.
    pub fn carry_forward(&mut self, old: DirectoryIndex) {
        let mut previous: HashMap<PathBuf, RasterEntry> = old
            .entries
            .into_iter()
            .map(|e| (e.path.clone(), e))
            .collect();
        for entry in &mut self.entries {
            if let Some(old_entry) = previous.remove(&entry.path) {
                entry.inherit(old_entry);
            }
        }
        // Whatever is left in `previous` was deleted; its handles drop here.
    }

    pub fn position(&self, path: &Path) -> Option<usize> {
        self.entries.iter().position(|e| e.path == path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&RasterEntry> {
        self.entries.get(idx)
    }

    pub fn get_mut(&mut self, idx: usize) -> Option<&mut RasterEntry> {
        self.entries.get_mut(idx)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RasterEntry> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub(crate) fn from_entries(entries: Vec<RasterEntry>) -> Self {
        Self { entries }
    }
}
