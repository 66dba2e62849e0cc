//! Periodic reconciliation of the directory index against the filesystem.

use crate::error::BrowseError;
use crate::files::DirectoryIndex;
use crate::navigator::Navigator;

/// Counts update ticks and fires every `interval` of them.
#[derive(Debug, Clone)]
pub struct Resynchronizer {
    interval: u32,
    elapsed: u32,
}

impl Resynchronizer {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            elapsed: 0,
        }
    }

    /// Advance by one tick. Returns true when a resync is due.
    pub fn tick(&mut self) -> bool {
        self.elapsed += 1;
        if self.elapsed >= self.interval {
            self.elapsed = 0;
            true
        } else {
            false
        }
    }
}

/// What a resync did to the active cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resynced {
    /// The active file is still there, now at `index`.
    Kept { index: usize },
    /// The active file is gone; the cursor is at 0 with nothing loaded yet.
    ActiveRemoved,
    /// The directory holds no supported images any more.
    Empty,
}

impl Navigator {
    /// Rescan the directory and swap in the new index.
    ///
    /// Unchanged files keep their decoded images and failure flags. The image
    /// on screen stays on screen even if its file was modified; only the
    /// entry goes cold. Running this twice without filesystem changes in
    /// between is a no-op the second time.
    pub fn resync(&mut self) -> Result<Resynced, BrowseError> {
        let mut fresh = DirectoryIndex::build(self.dir())?;
        let active_path = self.active_entry().map(|e| e.path.clone());
        let before = self.index.len();

        fresh.carry_forward(std::mem::take(&mut self.index));
        self.index = fresh;
        if self.index.len() != before {
            log::info!(
                "Directory {} now has {} images (was {})",
                self.dir().display(),
                self.index.len(),
                before
            );
        }

        if self.index.is_empty() {
            self.active = 0;
            self.active_handle = None;
            return Ok(Resynced::Empty);
        }

        match active_path.and_then(|p| self.index.position(&p)) {
            Some(index) => {
                if index != self.active {
                    log::debug!("[resync] active moved {} -> {}", self.active, index);
                }
                self.active = index;
                Ok(Resynced::Kept { index })
            }
            None => {
                log::info!("Active image was removed, returning to the first image");
                self.active = 0;
                self.active_handle = None;
                Ok(Resynced::ActiveRemoved)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::{Direction, Step};
    use crate::testutil::{FakeDecoder, set_mtime, write_broken, write_image};
    use std::fs;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::{Duration, SystemTime};

    const T0: Duration = Duration::from_secs(1_700_000_000);

    fn at(secs: Duration) -> SystemTime {
        SystemTime::UNIX_EPOCH + secs
    }

    /// a.png, b.png (broken), c.png, d.png, all stamped T0.
    fn populate(dir: &Path) {
        write_image(dir, "a.png", 4, 3);
        write_broken(dir, "b.png");
        write_image(dir, "c.png", 4, 3);
        write_image(dir, "d.png", 4, 3);
        for name in ["a.png", "b.png", "c.png", "d.png"] {
            set_mtime(&dir.join(name), at(T0));
        }
    }

    fn handles(nav: &Navigator) -> Vec<Option<Arc<crate::loader::RasterImage>>> {
        nav.index().iter().map(|e| e.cached().cloned()).collect()
    }

    fn same_handles(
        a: &[Option<Arc<crate::loader::RasterImage>>],
        b: &[Option<Arc<crate::loader::RasterImage>>],
    ) -> bool {
        a.len() == b.len()
            && a.iter().zip(b).all(|(x, y)| match (x, y) {
                (Some(x), Some(y)) => Arc::ptr_eq(x, y),
                (None, None) => true,
                _ => false,
            })
    }

    #[test]
    fn test_timer_fires_every_interval() {
        let mut timer = Resynchronizer::new(3);
        let fired: Vec<bool> = (0..7).map(|_| timer.tick()).collect();
        assert_eq!(fired, vec![false, false, true, false, false, true, false]);
        assert!(Resynchronizer::new(0).tick());
    }

    #[test]
    fn test_resync_twice_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let decoder = FakeDecoder::default();
        let mut nav = Navigator::open(&dir.path().join("a.png"), &decoder).unwrap();
        nav.advance(Direction::Next, &decoder);
        assert_eq!(nav.active_index(), 2);

        let first = nav.resync().unwrap();
        let handles_after_first = handles(&nav);
        let flags_after_first: Vec<bool> = nav.index().iter().map(|e| e.unloadable).collect();
        let shown = Arc::clone(nav.active_handle().unwrap());

        let second = nav.resync().unwrap();
        assert_eq!(first, Resynced::Kept { index: 2 });
        assert_eq!(second, first);
        assert_eq!(nav.active_index(), 2);
        assert!(same_handles(&handles_after_first, &handles(&nav)));
        let flags: Vec<bool> = nav.index().iter().map(|e| e.unloadable).collect();
        assert_eq!(flags, flags_after_first);
        assert_eq!(flags, vec![false, true, false, false]);
        assert!(Arc::ptr_eq(&shown, nav.active_handle().unwrap()));
    }

    #[test]
    fn test_resync_does_not_decode() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let decoder = FakeDecoder::default();
        let mut nav = Navigator::open(&dir.path().join("a.png"), &decoder).unwrap();

        nav.resync().unwrap();
        write_image(dir.path(), "e.png", 4, 3);
        nav.resync().unwrap();
        assert_eq!(decoder.calls(), 1);
        assert_eq!(nav.index().len(), 5);
    }

    #[test]
    fn test_modified_file_starts_cold() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let decoder = FakeDecoder::default();
        let mut nav = Navigator::open(&dir.path().join("c.png"), &decoder).unwrap();
        nav.advance(Direction::Previous, &decoder); // b is broken, lands on a
        nav.advance(Direction::Next, &decoder); // back to c
        let a_before = nav.index().get(0).unwrap().cached().cloned().unwrap();
        let shown = Arc::clone(nav.active_handle().unwrap());

        // Touch c (active) and b (failed); leave a alone.
        set_mtime(&dir.path().join("c.png"), at(T0 + Duration::from_secs(5)));
        set_mtime(&dir.path().join("b.png"), at(T0 + Duration::from_secs(5)));
        assert_eq!(nav.resync().unwrap(), Resynced::Kept { index: 2 });

        let a = nav.index().get(0).unwrap();
        assert!(Arc::ptr_eq(a.cached().unwrap(), &a_before));
        let b = nav.index().get(1).unwrap();
        assert!(!b.unloadable);
        let c = nav.index().get(2).unwrap();
        assert!(c.cached().is_none());
        assert!(!c.unloadable);
        // The stale image stays on screen until the user moves or reloads.
        assert!(Arc::ptr_eq(nav.active_handle().unwrap(), &shown));
    }

    #[test]
    fn test_older_mod_time_is_treated_as_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let decoder = FakeDecoder::default();
        let mut nav = Navigator::open(&dir.path().join("a.png"), &decoder).unwrap();
        let before = Arc::clone(nav.index().get(0).unwrap().cached().unwrap());

        set_mtime(&dir.path().join("a.png"), at(T0 - Duration::from_secs(60)));
        nav.resync().unwrap();
        assert!(Arc::ptr_eq(nav.index().get(0).unwrap().cached().unwrap(), &before));
    }

    #[test]
    fn test_active_relocates_when_files_appear() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let decoder = FakeDecoder::default();
        let mut nav = Navigator::open(&dir.path().join("c.png"), &decoder).unwrap();
        let shown = Arc::clone(nav.active_handle().unwrap());

        write_image(dir.path(), "0.png", 4, 3);
        assert_eq!(nav.resync().unwrap(), Resynced::Kept { index: 3 });
        assert!(Arc::ptr_eq(nav.active_handle().unwrap(), &shown));
        assert!(Arc::ptr_eq(nav.index().get(3).unwrap().cached().unwrap(), &shown));
    }

    #[test]
    fn test_deleted_active_resets_to_zero() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let decoder = FakeDecoder::default();
        let mut nav = Navigator::open(&dir.path().join("d.png"), &decoder).unwrap();

        fs::remove_file(dir.path().join("d.png")).unwrap();
        assert_eq!(nav.resync().unwrap(), Resynced::ActiveRemoved);
        assert_eq!(nav.active_index(), 0);
        assert!(nav.active_handle().is_none());
        assert_eq!(
            nav.settle(&decoder),
            Some(Step::Shown { index: 0, first_load: true })
        );
    }

    #[test]
    fn test_emptied_directory_reports_empty() {
        let dir = tempfile::tempdir().unwrap();
        populate(dir.path());
        let decoder = FakeDecoder::default();
        let mut nav = Navigator::open(&dir.path().join("a.png"), &decoder).unwrap();

        for name in ["a.png", "b.png", "c.png", "d.png"] {
            fs::remove_file(dir.path().join(name)).unwrap();
        }
        write_image(dir.path(), "readme.txt", 1, 1);
        assert_eq!(nav.resync().unwrap(), Resynced::Empty);
        assert!(nav.index().is_empty());
    }

    #[test]
    fn test_vanished_directory_is_an_error_and_keeps_state() {
        let dir = tempfile::tempdir().unwrap();
        let sub = dir.path().join("photos");
        fs::create_dir(&sub).unwrap();
        populate(&sub);
        let decoder = FakeDecoder::default();
        let mut nav = Navigator::open(&sub.join("a.png"), &decoder).unwrap();

        fs::remove_dir_all(&sub).unwrap();
        assert!(matches!(nav.resync(), Err(BrowseError::ReadDir { .. })));
        assert_eq!(nav.index().len(), 4);
        assert!(nav.active_handle().is_some());
    }
}
