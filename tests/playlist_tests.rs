use slidedrift::config::{SortMode, SortOrder};
use slidedrift::playlist::{collect_files, is_image, order_files};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::tempdir;

fn touch(path: &Path) {
    fs::write(path, b"x").unwrap();
}

fn names(files: &[PathBuf]) -> Vec<String> {
    files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect()
}

#[test]
fn extension_filter_is_case_insensitive() {
    assert!(is_image(Path::new("/a/b.jpg")));
    assert!(is_image(Path::new("/a/b.JPEG")));
    assert!(is_image(Path::new("/a/b.Png")));
    assert!(!is_image(Path::new("/a/b.txt")));
    assert!(!is_image(Path::new("/a/noext")));
}

#[test]
fn collects_image_files_recursively_and_skips_others() {
    let tmp = tempdir().unwrap();
    fs::create_dir_all(tmp.path().join("nested")).unwrap();
    touch(&tmp.path().join("a.jpg"));
    touch(&tmp.path().join("nested/b.png"));
    touch(&tmp.path().join("notes.txt"));

    let files = collect_files(&[tmp.path().to_path_buf()]).unwrap();
    let mut got = names(&files);
    got.sort();
    assert_eq!(got, vec!["a.jpg", "b.png"]);
}

#[test]
fn accepts_single_image_file_arguments() {
    let tmp = tempdir().unwrap();
    let img = tmp.path().join("only.webp");
    touch(&img);

    let files = collect_files(&[img.clone()]).unwrap();
    assert_eq!(files.len(), 1);
    assert!(files[0].ends_with("only.webp"));
}

#[test]
fn no_images_is_an_error() {
    let tmp = tempdir().unwrap();
    touch(&tmp.path().join("readme.md"));
    assert!(collect_files(&[tmp.path().to_path_buf()]).is_err());
}

#[test]
fn name_sort_is_lexicographic_and_desc_reverses() {
    let tmp = tempdir().unwrap();
    for name in ["c.jpg", "a.jpg", "b.jpg"] {
        touch(&tmp.path().join(name));
    }
    let mut files = collect_files(&[tmp.path().to_path_buf()]).unwrap();

    order_files(&mut files, SortMode::Name, SortOrder::Asc);
    assert_eq!(names(&files), vec!["a.jpg", "b.jpg", "c.jpg"]);

    order_files(&mut files, SortMode::Name, SortOrder::Desc);
    assert_eq!(names(&files), vec!["c.jpg", "b.jpg", "a.jpg"]);
}

#[test]
fn date_sort_is_non_decreasing_by_mtime() {
    let tmp = tempdir().unwrap();
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
    // Oldest file gets the lexicographically largest name on purpose.
    for (name, age) in [("z.jpg", 0u64), ("m.jpg", 60), ("a.jpg", 120)] {
        let path = tmp.path().join(name);
        touch(&path);
        File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(base + Duration::from_secs(age))
            .unwrap();
    }

    let mut files = collect_files(&[tmp.path().to_path_buf()]).unwrap();
    order_files(&mut files, SortMode::Date, SortOrder::Asc);
    assert_eq!(names(&files), vec!["z.jpg", "m.jpg", "a.jpg"]);

    order_files(&mut files, SortMode::Date, SortOrder::Desc);
    assert_eq!(names(&files), vec!["a.jpg", "m.jpg", "z.jpg"]);
}

#[test]
fn keep_sort_preserves_argument_order() {
    let tmp = tempdir().unwrap();
    let first = tmp.path().join("zz.jpg");
    let second = tmp.path().join("aa.jpg");
    touch(&first);
    touch(&second);

    let mut files = collect_files(&[first.clone(), second.clone()]).unwrap();
    order_files(&mut files, SortMode::Keep, SortOrder::Asc);
    assert_eq!(names(&files), vec!["zz.jpg", "aa.jpg"]);
}

#[test]
fn collection_stops_just_past_the_cap() {
    let tmp = tempdir().unwrap();
    for i in 0..2010 {
        touch(&tmp.path().join(format!("img{i:04}.jpg")));
    }
    let files = collect_files(&[tmp.path().to_path_buf()]).unwrap();
    assert_eq!(files.len(), slidedrift::playlist::MAX_FILES + 1);
}
