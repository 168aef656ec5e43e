//! Background decode worker for the slideshow.
//!
//! One dedicated thread decodes a single image at a time and hands the frame
//! back through a one-slot channel, so the event loop never blocks on codec
//! work and never has more than one decode in flight.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::thread;

use anyhow::{Context, Result, anyhow};
use crossbeam_channel::{Receiver, Sender, bounded};
use fast_image_resize as fir;
use image::RgbaImage;
use tracing::{debug, warn};

use crate::events::{DecodeJob, PrefetchOutcome, PreparedImage};

/// Handle to the decode worker. The thread is detached and exits when the
/// handle (and thus the job channel) is dropped.
pub struct Prefetcher {
    jobs: Sender<DecodeJob>,
    pub results: Receiver<PrefetchOutcome>,
}

impl Prefetcher {
    pub fn spawn() -> Self {
        let (job_tx, job_rx) = bounded::<DecodeJob>(1);
        let (result_tx, result_rx) = bounded::<PrefetchOutcome>(1);
        thread::spawn(move || worker(&job_rx, &result_tx));
        Self {
            jobs: job_tx,
            results: result_rx,
        }
    }

    /// Ask the worker to decode the next image. The controller only requests
    /// after consuming the previous result, so the one-slot queue never holds
    /// more than the single in-flight job.
    pub fn request(&self, job: DecodeJob) {
        if self.jobs.send(job).is_err() {
            warn!("decode worker is gone; dropping prefetch request");
        }
    }
}

fn worker(jobs: &Receiver<DecodeJob>, results: &Sender<PrefetchOutcome>) {
    while let Ok(job) = jobs.recv() {
        let outcome = match decode_bounded(&job.path, job.max_width, job.max_height) {
            Ok(prepared) => PrefetchOutcome::Ready(prepared),
            Err(err) => {
                warn!(path = %job.path.display(), "could not decode: {err:#}");
                PrefetchOutcome::Failed(job.path)
            }
        };
        if results.send(outcome).is_err() {
            break;
        }
    }
}

/// Decode an image to RGBA8, apply its EXIF orientation, and shrink it to
/// fit within the given bounds. The bounds keep the buffer proportional to
/// the stage rather than the source file.
pub fn decode_bounded(path: &Path, max_width: u32, max_height: u32) -> Result<PreparedImage> {
    let img = image::ImageReader::open(path)
        .with_context(|| format!("opening {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("sniffing format of {}", path.display()))?
        .decode()
        .with_context(|| format!("decoding {}", path.display()))?;

    let mut rgba = img.to_rgba8();
    rgba = apply_orientation(rgba, read_orientation(path).unwrap_or(1));

    let (w, h) = rgba.dimensions();
    let (target_w, target_h) = fit_within(w, h, max_width, max_height);
    if (target_w, target_h) != (w, h) {
        debug!(
            path = %path.display(),
            from = format_args!("{w}x{h}"),
            to = format_args!("{target_w}x{target_h}"),
            "downscaling decoded frame"
        );
        rgba = resize_rgba(&rgba, target_w, target_h)?;
    }

    let (width, height) = rgba.dimensions();
    Ok(PreparedImage {
        path: path.to_path_buf(),
        width,
        height,
        pixels: rgba.into_raw(),
    })
}

/// Largest size at most `max_w`×`max_h` with the source aspect ratio.
/// Images already within bounds are kept as-is.
fn fit_within(w: u32, h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if (w <= max_w && h <= max_h) || max_w == 0 || max_h == 0 {
        return (w, h);
    }
    let scale = (max_w as f64 / w as f64).min(max_h as f64 / h as f64);
    let target_w = ((w as f64 * scale).round() as u32).max(1);
    let target_h = ((h as f64 * scale).round() as u32).max(1);
    (target_w, target_h)
}

fn read_orientation(path: &Path) -> Option<u16> {
    let file = File::open(path).ok()?;
    let mut buf = BufReader::new(file);
    let exif = exif::Reader::new().read_from_container(&mut buf).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    let value = field.value.get_uint(0)?;
    debug!("exif orientation {} for {}", value, path.display());
    Some(value as u16)
}

// Maps the common EXIF orientations; unsupported values fall through as-is.
fn apply_orientation(img: RgbaImage, orientation: u16) -> RgbaImage {
    match orientation {
        2 => image::imageops::flip_horizontal(&img),
        3 => image::imageops::rotate180(&img),
        4 => image::imageops::flip_vertical(&img),
        5 => image::imageops::flip_horizontal(&image::imageops::rotate90(&img)),
        6 => image::imageops::rotate90(&img),
        7 => image::imageops::flip_horizontal(&image::imageops::rotate270(&img)),
        8 => image::imageops::rotate270(&img),
        _ => img,
    }
}

fn resize_rgba(source: &RgbaImage, target_w: u32, target_h: u32) -> Result<RgbaImage> {
    let src_view = fir::images::ImageRef::new(
        source.width(),
        source.height(),
        source.as_raw(),
        fir::PixelType::U8x4,
    )
    .context("creating source view for resize")?;
    let mut dst_image = fir::images::Image::new(target_w, target_h, fir::PixelType::U8x4);
    let options = fir::ResizeOptions::new()
        .resize_alg(fir::ResizeAlg::Convolution(fir::FilterType::CatmullRom));
    let mut resizer = fir::Resizer::new();
    resizer
        .resize(&src_view, &mut dst_image, Some(&options))
        .context("resize failed")?;
    RgbaImage::from_raw(target_w, target_h, dst_image.into_vec())
        .ok_or_else(|| anyhow!("failed to construct resized RGBA image"))
}
