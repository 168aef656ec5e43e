use std::path::PathBuf;

/// Decode request handed to the background worker.
#[derive(Debug, Clone)]
pub struct DecodeJob {
    pub path: PathBuf,
    /// Maximum dimensions for the decoded frame: the stage size inflated by
    /// the zoom margin, so extreme zoom never forces a full-size decode.
    pub max_width: u32,
    pub max_height: u32,
}

/// RGBA8 frame decoded off the main thread, ready for GPU upload.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// One decode attempt, delivered through the single-slot result channel.
///
/// A failed decode carries the offending path so the traversal can
/// blacklist it; the variant shape keeps it distinguishable from a frame.
#[derive(Debug)]
pub enum PrefetchOutcome {
    Ready(PreparedImage),
    Failed(PathBuf),
}
