// argus_sim/src/simulation/storage.rs

//! Snapshot encoding and on-disk frame storage.

use std::fs;
use std::path::{Path, PathBuf};

use argus_core::prelude::{FrameStore, ImageEncoder, PixelBuffer, SensorError};
use tracing::debug;
use walkdir::WalkDir;

/// Binary PPM (`P6`), 8 bits per channel. Alpha is dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct PpmEncoder;

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

impl ImageEncoder for PpmEncoder {
    fn extension(&self) -> &str {
        "ppm"
    }

    fn encode_image(&self, buffer: &PixelBuffer) -> Vec<u8> {
        let mut bytes = format!("P6\n{} {}\n255\n", buffer.width, buffer.height).into_bytes();
        bytes.reserve(buffer.len() * 3);
        // PPM stores the top row first.
        for row in buffer.rows().rev() {
            for pixel in row {
                bytes.extend([to_byte(pixel.r), to_byte(pixel.g), to_byte(pixel.b)]);
            }
        }
        bytes
    }
}

/// Frames stored as files directly inside one directory.
#[derive(Debug, Clone)]
pub struct DirectoryFrameStore {
    dir: PathBuf,
}

impl DirectoryFrameStore {
    /// Opens `dir`, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FrameStore for DirectoryFrameStore {
    fn list_frames(&self) -> Result<Vec<String>, SensorError> {
        let mut names = Vec::new();
        for entry in WalkDir::new(&self.dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| SensorError::Storage(e.to_string()))?;
            if entry.file_type().is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(names)
    }

    fn write_frame(&mut self, name: &str, bytes: &[u8]) -> Result<(), SensorError> {
        let path = self.dir.join(name);
        fs::write(&path, bytes).map_err(|e| SensorError::Storage(format!("{path:?}: {e}")))?;
        debug!("Wrote {} bytes to {:?}", bytes.len(), path);
        Ok(())
    }
}
