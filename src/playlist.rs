use std::collections::{HashSet, VecDeque};
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Result, bail};
use rand::seq::SliceRandom;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::{SortMode, SortOrder};

/// Hard cap on the collected file list; the walk stops early once exceeded.
pub const MAX_FILES: usize = 2000;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "webp"];

#[inline]
pub fn is_image(path: &Path) -> bool {
    matches!(
        path.extension()
            .and_then(OsStr::to_str)
            .map(|s| s.to_ascii_lowercase()),
        Some(ref ext) if IMAGE_EXTENSIONS.contains(&ext.as_str())
    )
}

fn absolutize(path: &Path) -> PathBuf {
    let expanded = match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    };
    std::path::absolute(&expanded).unwrap_or(expanded)
}

/// Collect image files from the given file/folder arguments.
///
/// # Errors
/// Fails when no images are found at all.
pub fn collect_files(args: &[PathBuf]) -> Result<Vec<PathBuf>> {
    collect_files_capped(args, MAX_FILES)
}

fn collect_files_capped(args: &[PathBuf], cap: usize) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    'args: for arg in args {
        let path = absolutize(arg);
        if path.is_file() {
            if is_image(&path) {
                files.push(path);
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(&path)
                .follow_links(true)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
            {
                if is_image(entry.path()) {
                    files.push(entry.path().to_path_buf());
                    if files.len() > cap {
                        debug!(cap, "file cap reached; stopping collection");
                        break 'args;
                    }
                }
            }
        } else {
            debug!(path = %path.display(), "argument is neither an image nor a folder");
        }
    }
    if files.is_empty() {
        bail!("you should specify some image files or folders");
    }
    Ok(files)
}

fn mtime(path: &Path) -> SystemTime {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .unwrap_or(UNIX_EPOCH)
}

/// Apply the configured ordering in place. `name` and `date` sorts are
/// stable, so `keep`-order ties survive; `desc` reverses the base order.
pub fn order_files(files: &mut [PathBuf], sort: SortMode, order: SortOrder) {
    match sort {
        SortMode::Keep => {}
        SortMode::Name => files.sort(),
        SortMode::Date => files.sort_by_key(|p| mtime(p)),
        SortMode::Random => files.shuffle(&mut rand::rng()),
    }
    if order == SortOrder::Desc {
        files.reverse();
    }
}

/// Result of one traversal step.
#[derive(Debug, PartialEq, Eq)]
pub enum NextFile {
    Path(PathBuf),
    /// Every file is known-bad; the show should stop.
    Exhausted,
}

/// Round-robin traversal over the ordered file list.
///
/// Holds the cursor, the known-bad set and a small out-of-band queue served
/// ahead of the regular rotation.
#[derive(Debug)]
pub struct Playlist {
    files: Vec<PathBuf>,
    cursor: usize,
    queued: VecDeque<PathBuf>,
    known_bad: HashSet<PathBuf>,
}

impl Playlist {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            cursor: 0,
            queued: VecDeque::new(),
            known_bad: HashSet::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Queue a file to be served ahead of the regular rotation.
    pub fn queue(&mut self, path: PathBuf) {
        self.queued.push_back(path);
    }

    /// Permanently exclude a file that failed to decode. Logged once.
    pub fn mark_bad(&mut self, path: PathBuf) {
        if self.known_bad.insert(path.clone()) {
            info!(path = %path.display(), "error in file, skipping it from now on");
        }
    }

    pub fn is_bad(&self, path: &Path) -> bool {
        self.known_bad.contains(path)
    }

    /// Next file to display: the pending queue first, then the file at the
    /// cursor, skipping known-bad entries. The skip is a loop bounded by the
    /// list length, so a deeply blacklisted list cannot recurse away.
    pub fn next_file(&mut self) -> NextFile {
        if let Some(queued) = self.queued.pop_front() {
            return NextFile::Path(queued);
        }
        for _ in 0..self.files.len() {
            let candidate = self.files[self.cursor].clone();
            self.cursor = (self.cursor + 1) % self.files.len();
            if !self.known_bad.contains(&candidate) {
                return NextFile::Path(candidate);
            }
        }
        NextFile::Exhausted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn playlist(names: &[&str]) -> Playlist {
        Playlist::new(names.iter().map(PathBuf::from).collect())
    }

    fn next_path(p: &mut Playlist) -> PathBuf {
        match p.next_file() {
            NextFile::Path(path) => path,
            NextFile::Exhausted => panic!("unexpected exhaustion"),
        }
    }

    #[test]
    fn cycles_in_order_and_wraps() {
        let mut p = playlist(&["a", "b", "c"]);
        let seen: Vec<_> = (0..5).map(|_| next_path(&mut p)).collect();
        assert_eq!(
            seen,
            ["a", "b", "c", "a", "b"]
                .iter()
                .map(PathBuf::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn skips_known_bad_files() {
        let mut p = playlist(&["a", "b", "c"]);
        p.mark_bad(PathBuf::from("b"));
        let seen: Vec<_> = (0..4).map(|_| next_path(&mut p)).collect();
        assert_eq!(
            seen,
            ["a", "c", "a", "c"]
                .iter()
                .map(PathBuf::from)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn all_bad_signals_exhausted() {
        let mut p = playlist(&["a", "b"]);
        p.mark_bad(PathBuf::from("a"));
        p.mark_bad(PathBuf::from("b"));
        assert_eq!(p.next_file(), NextFile::Exhausted);
    }

    #[test]
    fn queued_files_are_served_first() {
        let mut p = playlist(&["a", "b"]);
        p.queue(PathBuf::from("x"));
        assert_eq!(next_path(&mut p), PathBuf::from("x"));
        assert_eq!(next_path(&mut p), PathBuf::from("a"));
    }

    #[test]
    fn single_bad_file_among_good_ones_never_repeats() {
        let mut p = playlist(&["good", "bad"]);
        p.mark_bad(PathBuf::from("bad"));
        for _ in 0..10 {
            assert_eq!(next_path(&mut p), PathBuf::from("good"));
        }
    }
}
