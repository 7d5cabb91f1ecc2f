//! Asset slots and the background loader.
//!
//! Every asset the scene uses lives in an [`AssetSlot`] that starts
//! [`Pending`](AssetSlot::Pending). The [`AssetLoader`] reads and decodes files
//! on a worker thread; the app drains finished [`LoadOutcome`]s at the top of
//! each frame and resolves them into their slots.

mod error;
mod loader;
mod slot;

pub use error::AssetError;
pub use loader::{AssetId, AssetKind, AssetLoader, LoadOutcome, LoadedAsset};
pub use slot::AssetSlot;

/// Decoded RGBA8 image, rows top to bottom.
#[derive(Clone, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl std::fmt::Debug for TextureData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextureData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.rgba.len())
            .finish()
    }
}

/// Decoded audio, interleaved `f32` samples.
#[derive(Clone, PartialEq)]
pub struct AudioClip {
    /// File name the clip was read from, for logging.
    pub name: String,
    pub channels: u16,
    pub sample_rate: u32,
    pub samples: Vec<f32>,
}

impl AudioClip {
    pub fn duration(&self) -> std::time::Duration {
        let frames = self.samples.len() as f64 / f64::from(self.channels.max(1));
        std::time::Duration::from_secs_f64(frames / f64::from(self.sample_rate.max(1)))
    }
}

impl std::fmt::Debug for AudioClip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioClip")
            .field("name", &self.name)
            .field("channels", &self.channels)
            .field("sample_rate", &self.sample_rate)
            .field("samples", &self.samples.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clip_duration() {
        let clip = AudioClip {
            name: "ambient.mp3".into(),
            channels: 2,
            sample_rate: 44_100,
            samples: vec![0.0; 2 * 22_050],
        };
        assert_eq!(clip.duration(), std::time::Duration::from_millis(500));
    }
}
