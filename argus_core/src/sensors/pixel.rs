// argus_core/src/sensors/pixel.rs

use serde::{Deserialize, Serialize};
use tracing::{trace, warn};

use super::require;
use crate::abstractions::{FrameStore, ImageEncoder, RenderTarget, Sensor};
use crate::encoding::{encode_pixels, pixel_channels};
use crate::error::{Result, SensorError};
use crate::snapshot::{next_frame_name, snapshot};
use crate::types::{CameraHandle, CaptureType, PixelBuffer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PixelSensorConfig {
    pub width: u32,
    pub height: u32,
    pub capture: CaptureType,
}

impl Default for PixelSensorConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            capture: CaptureType::Rgb,
        }
    }
}

impl PixelSensorConfig {
    pub fn validate(&self) -> Result<()> {
        require("pixel", self.width >= 1 && self.height >= 1, || {
            format!(
                "image size must be at least 1x1, got {}x{}",
                self.width, self.height
            )
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// Replaces every pixel's colour channels with its luma, keeping alpha.
pub fn to_grayscale(buffer: &mut PixelBuffer) {
    for pixel in &mut buffer.pixels {
        *pixel = pixel.grayscale();
    }
}

/// Renders `camera` and applies the configured post-processing.
///
/// A render target that answers with the wrong number of pixels is reported
/// as [`SensorError::BufferSize`] rather than silently truncated.
pub fn capture(
    config: &PixelSensorConfig,
    camera: CameraHandle,
    renderer: &dyn RenderTarget,
) -> Result<PixelBuffer> {
    let mut buffer = renderer.render_to_buffer(camera, config.width, config.height);
    let expected = config.pixel_count();
    if buffer.len() != expected || buffer.width != config.width || buffer.height != config.height
    {
        return Err(SensorError::BufferSize {
            expected,
            actual: buffer.len(),
        });
    }
    if config.capture == CaptureType::Grayscale {
        to_grayscale(&mut buffer);
    }
    Ok(buffer)
}

/// A camera-backed sensor.
///
/// Without a camera every capture, encode or snapshot fails with
/// [`SensorError::MissingCamera`] and nothing is rendered.
#[derive(Debug, Clone)]
pub struct PixelSensor {
    config: PixelSensorConfig,
    camera: Option<CameraHandle>,
    texture: Option<PixelBuffer>,
}

impl PixelSensor {
    pub fn new(config: PixelSensorConfig, camera: Option<CameraHandle>) -> Result<Self> {
        config.validate()?;
        if camera.is_none() {
            warn!("pixel sensor created without a camera; attach one before capturing");
        }
        Ok(Self {
            config,
            camera,
            texture: None,
        })
    }

    pub fn config(&self) -> &PixelSensorConfig {
        &self.config
    }

    /// Drops the last frame, so the vector reads as zeros until the next capture.
    pub fn set_config(&mut self, config: PixelSensorConfig) -> Result<()> {
        config.validate()?;
        self.texture = None;
        self.config = config;
        Ok(())
    }

    pub fn camera(&self) -> Option<CameraHandle> {
        self.camera
    }

    pub fn attach_camera(&mut self, camera: CameraHandle) {
        self.camera = Some(camera);
    }

    fn require_camera(&self) -> Result<CameraHandle> {
        self.camera.ok_or(SensorError::MissingCamera)
    }

    /// Renders a new frame and keeps it as the current observation.
    pub fn capture(&mut self, renderer: &dyn RenderTarget) -> Result<&PixelBuffer> {
        let camera = self.require_camera()?;
        let buffer = capture(&self.config, camera, renderer)?;
        trace!(
            width = buffer.width,
            height = buffer.height,
            "pixel capture complete"
        );
        let stored: &PixelBuffer = self.texture.insert(buffer);
        Ok(stored)
    }

    /// Captures and encodes in one go.
    pub fn observe(&mut self, renderer: &dyn RenderTarget) -> Result<Vec<f32>> {
        let capture_type = self.config.capture;
        let buffer = self.capture(renderer)?;
        Ok(encode_pixels(buffer, capture_type))
    }

    /// The last captured frame, if any.
    pub fn observation_texture(&self) -> Option<&PixelBuffer> {
        self.texture.as_ref()
    }

    /// Captures a fresh frame and writes it to `store` under the next free
    /// `FrameN` name. Returns the name written.
    pub fn take_shot(
        &mut self,
        renderer: &dyn RenderTarget,
        encoder: &dyn ImageEncoder,
        store: &mut dyn FrameStore,
    ) -> Result<String> {
        self.require_camera()?;
        let existing = store.list_frames()?;
        let name = next_frame_name(&existing, encoder.extension())?;
        let bytes = snapshot(self.capture(renderer)?, encoder);
        store.write_frame(&name, &bytes)?;
        Ok(name)
    }
}

impl Sensor for PixelSensor {
    fn observation_dim(&self) -> usize {
        pixel_channels(self.config.capture) * self.config.pixel_count()
    }

    fn advertised_dim(&self) -> usize {
        match self.config.capture {
            CaptureType::Grayscale => self.config.pixel_count(),
            CaptureType::Rgb => 3 * self.config.pixel_count(),
        }
    }

    /// Encodes the last captured frame; all zeros before the first capture.
    fn observations_vector(&self) -> Result<Vec<f32>> {
        self.require_camera()?;
        match &self.texture {
            Some(buffer) => Ok(encode_pixels(buffer, self.config.capture)),
            None => Ok(vec![0.0; self.observation_dim()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Rgba;
    use approx::assert_abs_diff_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Paints pixel `i` red when `i` is even and blue otherwise.
    #[derive(Default)]
    struct Stripes {
        renders: AtomicUsize,
        short_by: usize,
    }

    impl RenderTarget for Stripes {
        fn render_to_buffer(&self, _camera: CameraHandle, width: u32, height: u32) -> PixelBuffer {
            self.renders.fetch_add(1, Ordering::SeqCst);
            let count = (width * height) as usize - self.short_by;
            let pixels = (0..count)
                .map(|i| {
                    if i % 2 == 0 {
                        Rgba::new(1.0, 0.0, 0.0, 1.0)
                    } else {
                        Rgba::new(0.0, 0.0, 1.0, 0.5)
                    }
                })
                .collect();
            PixelBuffer {
                width,
                height,
                pixels,
            }
        }
    }

    struct RawEncoder;

    impl ImageEncoder for RawEncoder {
        fn extension(&self) -> &str {
            "raw"
        }

        fn encode_image(&self, buffer: &PixelBuffer) -> Vec<u8> {
            buffer.pixels.iter().map(|p| (p.r * 255.0) as u8).collect()
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        files: Vec<(String, Vec<u8>)>,
    }

    impl FrameStore for MemoryStore {
        fn list_frames(&self) -> Result<Vec<String>> {
            Ok(self.files.iter().map(|(n, _)| n.clone()).collect())
        }

        fn write_frame(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
            self.files.push((name.to_string(), bytes.to_vec()));
            Ok(())
        }
    }

    fn config(capture: CaptureType) -> PixelSensorConfig {
        PixelSensorConfig {
            width: 2,
            height: 2,
            capture,
        }
    }

    #[test]
    fn grayscale_capture_keeps_alpha() {
        let buffer = capture(
            &config(CaptureType::Grayscale),
            CameraHandle(1),
            &Stripes::default(),
        )
        .unwrap();
        let red = buffer.pixels[0];
        assert_abs_diff_eq!(red.r, 0.299, epsilon = 1e-6);
        assert_eq!(red.r, red.g);
        assert_eq!(red.g, red.b);
        assert_eq!(red.a, 1.0);
        assert_eq!(buffer.pixels[1].a, 0.5);
    }

    #[test]
    fn rgb_capture_is_untouched() {
        let buffer = capture(&config(CaptureType::Rgb), CameraHandle(1), &Stripes::default())
            .unwrap();
        assert_eq!(buffer.pixels[0], Rgba::new(1.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn short_render_is_reported() {
        let renderer = Stripes {
            short_by: 1,
            ..Default::default()
        };
        let err = capture(&config(CaptureType::Rgb), CameraHandle(1), &renderer).unwrap_err();
        assert_eq!(
            err,
            SensorError::BufferSize {
                expected: 4,
                actual: 3
            }
        );
    }

    #[test]
    fn missing_camera_never_renders() {
        let renderer = Stripes::default();
        let mut sensor = PixelSensor::new(config(CaptureType::Rgb), None).unwrap();
        assert_eq!(sensor.capture(&renderer).unwrap_err(), SensorError::MissingCamera);
        assert_eq!(sensor.observe(&renderer).unwrap_err(), SensorError::MissingCamera);
        assert_eq!(
            sensor.observations_vector().unwrap_err(),
            SensorError::MissingCamera
        );
        let mut store = MemoryStore::default();
        assert_eq!(
            sensor
                .take_shot(&renderer, &RawEncoder, &mut store)
                .unwrap_err(),
            SensorError::MissingCamera
        );
        assert_eq!(renderer.renders.load(Ordering::SeqCst), 0);
        assert!(store.files.is_empty());

        sensor.attach_camera(CameraHandle(7));
        assert!(sensor.capture(&renderer).is_ok());
    }

    #[test]
    fn vector_dimensions_follow_capture_type() {
        let renderer = Stripes::default();
        let mut rgb = PixelSensor::new(config(CaptureType::Rgb), Some(CameraHandle(1))).unwrap();
        assert_eq!(rgb.observations_vector().unwrap(), vec![0.0; 4]);
        let v = rgb.observe(&renderer).unwrap();
        assert_eq!(v.len(), 4);
        assert_abs_diff_eq!(v[0], 0.299, epsilon = 1e-6);
        assert_abs_diff_eq!(v[1], 0.114, epsilon = 1e-6);
        assert_eq!(rgb.advertised_dim(), 12);

        let mut gray =
            PixelSensor::new(config(CaptureType::Grayscale), Some(CameraHandle(1))).unwrap();
        let v = gray.observe(&renderer).unwrap();
        assert_eq!(v.len(), 12);
        assert_eq!(gray.observation_dim(), 12);
        assert_eq!(gray.advertised_dim(), 4);
        assert_eq!(v, gray.observations_vector().unwrap());
    }

    #[test]
    fn shots_are_numbered() {
        let renderer = Stripes::default();
        let mut sensor = PixelSensor::new(config(CaptureType::Rgb), Some(CameraHandle(1))).unwrap();
        let mut store = MemoryStore::default();
        let first = sensor.take_shot(&renderer, &RawEncoder, &mut store).unwrap();
        let second = sensor.take_shot(&renderer, &RawEncoder, &mut store).unwrap();
        assert_eq!(first, "Frame1.raw");
        assert_eq!(second, "Frame2.raw");
        assert_eq!(store.files[0].1, vec![255, 0, 255, 0]);
    }

    #[test]
    fn exhausted_numbering_writes_nothing() {
        let renderer = Stripes::default();
        let mut sensor = PixelSensor::new(config(CaptureType::Rgb), Some(CameraHandle(1))).unwrap();
        let mut store = MemoryStore::default();
        store.files.push((format!("Frame{}.raw", u32::MAX), Vec::new()));
        let err = sensor.take_shot(&renderer, &RawEncoder, &mut store).unwrap_err();
        assert!(matches!(err, SensorError::Storage(_)));
        assert_eq!(store.files.len(), 1);
        assert_eq!(renderer.renders.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reconfiguring_drops_the_last_frame() {
        let renderer = Stripes::default();
        let mut sensor = PixelSensor::new(config(CaptureType::Rgb), Some(CameraHandle(1))).unwrap();
        sensor.observe(&renderer).unwrap();

        sensor
            .set_config(PixelSensorConfig {
                width: 3,
                ..config(CaptureType::Grayscale)
            })
            .unwrap();
        assert!(sensor.observation_texture().is_none());
        assert_eq!(sensor.observation_dim(), 18);
        assert_eq!(sensor.observations_vector().unwrap(), vec![0.0; 18]);
        assert_eq!(sensor.observe(&renderer).unwrap().len(), 18);
    }
}
