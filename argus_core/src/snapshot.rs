// argus_core/src/snapshot.rs

//! Naming and encoding of on-disk captures.

use crate::abstractions::ImageEncoder;
use crate::error::{Result, SensorError};
use crate::types::PixelBuffer;

pub const FRAME_PREFIX: &str = "Frame";

/// Extracts `N` from the last `FrameN` in a file name, ignoring directories.
pub fn frame_number(name: &str) -> Option<u32> {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    file_name
        .rmatch_indices(FRAME_PREFIX)
        .find_map(|(at, _)| {
            let rest = &file_name[at + FRAME_PREFIX.len()..];
            let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
            rest[..digits_len].parse().ok()
        })
}

/// The next free frame name: one past the highest `FrameN` already present,
/// or `Frame1` when nothing parses. Fails once `Frame4294967295` exists.
pub fn next_frame_name(existing: &[String], extension: &str) -> Result<String> {
    let next = match existing.iter().filter_map(|name| frame_number(name)).max() {
        Some(n) => n.checked_add(1).ok_or_else(|| {
            SensorError::Storage(format!("frame numbering exhausted at {FRAME_PREFIX}{n}"))
        })?,
        None => 1,
    };
    Ok(format!("{FRAME_PREFIX}{next}.{extension}"))
}

pub fn snapshot(buffer: &PixelBuffer, encoder: &dyn ImageEncoder) -> Vec<u8> {
    encoder.encode_image(buffer)
}
