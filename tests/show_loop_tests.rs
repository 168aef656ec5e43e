//! Drives the playlist + decode worker the way the viewer's advance tick
//! does, without a window: request the next file, consume the one-slot
//! result channel, blacklist failures.

use image::{Rgba, RgbaImage};
use slidedrift::events::{DecodeJob, PrefetchOutcome};
use slidedrift::playlist::{NextFile, Playlist};
use slidedrift::render::loader::Prefetcher;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;

fn write_png(path: &Path) {
    RgbaImage::from_pixel(4, 4, Rgba([200, 100, 0, 255]))
        .save(path)
        .unwrap();
}

/// One controller step: prefetch the traversal's next file and wait for the
/// outcome, marking failures bad, until a frame or exhaustion.
fn advance(playlist: &mut Playlist, prefetcher: &Prefetcher) -> Option<PathBuf> {
    loop {
        match playlist.next_file() {
            NextFile::Path(path) => {
                prefetcher.request(DecodeJob {
                    path,
                    max_width: 64,
                    max_height: 64,
                });
                match prefetcher
                    .results
                    .recv_timeout(Duration::from_secs(5))
                    .expect("decode worker reply")
                {
                    PrefetchOutcome::Ready(img) => return Some(img.path),
                    PrefetchOutcome::Failed(path) => playlist.mark_bad(path),
                }
            }
            NextFile::Exhausted => return None,
        }
    }
}

#[test]
fn keep_order_show_loops_back_to_the_first_image() {
    let tmp = tempdir().unwrap();
    let paths: Vec<PathBuf> = ["a.png", "b.png", "c.png"]
        .iter()
        .map(|name| {
            let p = tmp.path().join(name);
            write_png(&p);
            p
        })
        .collect();

    let mut playlist = Playlist::new(paths.clone());
    let prefetcher = Prefetcher::spawn();

    let shown: Vec<PathBuf> = (0..5)
        .map(|_| advance(&mut playlist, &prefetcher).expect("frame"))
        .collect();
    assert_eq!(
        shown,
        vec![
            paths[0].clone(),
            paths[1].clone(),
            paths[2].clone(),
            paths[0].clone(),
            paths[1].clone()
        ]
    );
}

#[test]
fn corrupt_file_is_blacklisted_and_the_valid_one_keeps_showing() {
    let tmp = tempdir().unwrap();
    let good = tmp.path().join("good.png");
    write_png(&good);
    let corrupt = tmp.path().join("corrupt.jpg");
    std::fs::write(&corrupt, b"definitely not a jpeg").unwrap();

    let mut playlist = Playlist::new(vec![good.clone(), corrupt.clone()]);
    let prefetcher = Prefetcher::spawn();

    for _ in 0..6 {
        assert_eq!(advance(&mut playlist, &prefetcher), Some(good.clone()));
    }
    assert!(playlist.is_bad(&corrupt));
    assert!(!playlist.is_bad(&good));
}

#[test]
fn all_corrupt_files_end_the_show() {
    let tmp = tempdir().unwrap();
    let paths: Vec<PathBuf> = ["x.jpg", "y.jpg"]
        .iter()
        .map(|name| {
            let p = tmp.path().join(name);
            std::fs::write(&p, b"garbage").unwrap();
            p
        })
        .collect();

    let mut playlist = Playlist::new(paths);
    let prefetcher = Prefetcher::spawn();
    assert_eq!(advance(&mut playlist, &prefetcher), None);
}
