//! Background file loading over a crossbeam channel.
//!
//! One worker thread reads and decodes requested files in submission order.
//! Results come back over a second channel and are collected on the main
//! thread with [`AssetLoader::drain`], which never blocks.
//!
//! Textures decode to RGBA8 with `image`; audio decodes to PCM with `rodio`.

use std::path::{Path, PathBuf};
use std::thread::JoinHandle;

use rodio::Source;

use crate::{AssetError, AudioClip, TextureData};

/// Caller-chosen name tying a request to its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssetId(pub &'static str);

impl std::fmt::Display for AssetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    /// Decoded to RGBA8.
    Texture,
    /// Decoded to interleaved PCM samples.
    Audio,
}

struct LoadRequest {
    id: AssetId,
    kind: AssetKind,
    path: PathBuf,
}

#[derive(Debug)]
pub enum LoadedAsset {
    Texture(TextureData),
    Audio(AudioClip),
}

/// A finished request, successful or not.
#[derive(Debug)]
pub struct LoadOutcome {
    pub id: AssetId,
    pub result: Result<LoadedAsset, AssetError>,
}

impl LoadOutcome {
    /// Split into the texture result, or `None` if this was not a texture.
    pub fn into_texture(self) -> Option<Result<TextureData, AssetError>> {
        match self.result {
            Ok(LoadedAsset::Texture(t)) => Some(Ok(t)),
            Ok(LoadedAsset::Audio(_)) => None,
            Err(e) => Some(Err(e)),
        }
    }

    /// Split into the audio result, or `None` if this was not audio.
    pub fn into_audio(self) -> Option<Result<AudioClip, AssetError>> {
        match self.result {
            Ok(LoadedAsset::Audio(a)) => Some(Ok(a)),
            Ok(LoadedAsset::Texture(_)) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

pub struct AssetLoader {
    request_sender: Option<crossbeam_channel::Sender<LoadRequest>>,
    /// Second handle on the request queue, used to discard unstarted work.
    pending: crossbeam_channel::Receiver<LoadRequest>,
    outcome_receiver: crossbeam_channel::Receiver<LoadOutcome>,
    worker: Option<JoinHandle<()>>,
    root: PathBuf,
}

impl AssetLoader {
    /// Start the worker. Relative request paths resolve against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<LoadRequest>();
        let (outcome_tx, outcome_rx) = crossbeam_channel::unbounded();

        let pending = request_rx.clone();

        let worker = std::thread::Builder::new()
            .name("asset-loader".into())
            .spawn(move || {
                while let Ok(request) = request_rx.recv() {
                    let result = load(request.kind, &request.path);
                    match &result {
                        Ok(_) => {
                            log::info!("Loaded {} from {}", request.id, request.path.display())
                        }
                        Err(e) => log::warn!("Asset {} unavailable: {e}", request.id),
                    }
                    if outcome_tx
                        .send(LoadOutcome {
                            id: request.id,
                            result,
                        })
                        .is_err()
                    {
                        break;
                    }
                }
            });

        let worker = match worker {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::error!("Failed to spawn asset loader thread: {e}");
                None
            }
        };

        Self {
            request_sender: worker.as_ref().map(|_| request_tx),
            pending,
            outcome_receiver: outcome_rx,
            worker,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn request_texture(&self, id: AssetId, path: impl AsRef<Path>) -> bool {
        self.submit(id, AssetKind::Texture, path.as_ref())
    }

    pub fn request_audio(&self, id: AssetId, path: impl AsRef<Path>) -> bool {
        self.submit(id, AssetKind::Audio, path.as_ref())
    }

    /// Queue a request. Returns `false` if the worker is gone, in which case
    /// the request will never complete.
    fn submit(&self, id: AssetId, kind: AssetKind, path: &Path) -> bool {
        let Some(sender) = &self.request_sender else {
            return false;
        };
        let request = LoadRequest {
            id,
            kind,
            path: self.root.join(path),
        };
        log::debug!("Requesting {id} ({kind:?}) from {}", request.path.display());
        sender.send(request).is_ok()
    }

    /// Every outcome finished since the last call.
    pub fn drain(&self) -> Vec<LoadOutcome> {
        self.outcome_receiver.try_iter().collect()
    }

    /// Stop accepting requests, drop the ones the worker has not started and
    /// wait for the one in flight. Returns how many requests were dropped.
    pub fn shutdown(&mut self) -> usize {
        self.request_sender.take();
        let dropped = self.pending.try_iter().count();
        if dropped > 0 {
            log::info!("Dropped {dropped} queued asset requests");
        }
        if let Some(handle) = self.worker.take() {
            let _ = handle.join();
        }
        dropped
    }
}

impl Drop for AssetLoader {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn load(kind: AssetKind, path: &Path) -> Result<LoadedAsset, AssetError> {
    match kind {
        AssetKind::Texture => load_texture(path).map(LoadedAsset::Texture),
        AssetKind::Audio => load_audio(path).map(LoadedAsset::Audio),
    }
}

fn load_texture(path: &Path) -> Result<TextureData, AssetError> {
    let bytes = read_non_empty(path)?;
    let image = image::load_from_memory(&bytes).map_err(|source| AssetError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let rgba = image.into_rgba8();
    Ok(TextureData {
        width: rgba.width(),
        height: rgba.height(),
        rgba: rgba.into_raw(),
    })
}

/// Decode the whole clip up front; a clip that yields no samples is empty.
fn load_audio(path: &Path) -> Result<AudioClip, AssetError> {
    let bytes = read_non_empty(path)?;
    let decoder = rodio::Decoder::new(std::io::Cursor::new(bytes)).map_err(|source| {
        AssetError::AudioDecode {
            path: path.to_path_buf(),
            source,
        }
    })?;
    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    let samples: Vec<f32> = decoder.collect();
    if samples.is_empty() {
        return Err(AssetError::Empty {
            path: path.to_path_buf(),
        });
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(AudioClip {
        name,
        channels,
        sample_rate,
        samples,
    })
}

fn read_non_empty(path: &Path) -> Result<Vec<u8>, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if bytes.is_empty() {
        return Err(AssetError::Empty {
            path: path.to_path_buf(),
        });
    }
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::AssetSlot;
    use std::time::{Duration, Instant};

    /// Drain until `n` outcomes arrive or a generous timeout passes.
    fn wait_for(loader: &AssetLoader, n: usize) -> Vec<LoadOutcome> {
        let start = Instant::now();
        let mut outcomes = Vec::new();
        while outcomes.len() < n && start.elapsed() < Duration::from_secs(10) {
            outcomes.extend(loader.drain());
            std::thread::sleep(Duration::from_millis(5));
        }
        outcomes
    }

    fn write_png(dir: &Path, name: &str) {
        let mut img = image::RgbaImage::new(4, 2);
        img.put_pixel(3, 1, image::Rgba([10, 20, 30, 255]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_texture_loads_and_decodes() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "earth.png");
        let loader = AssetLoader::new(dir.path());
        assert!(loader.request_texture(AssetId("earth"), "earth.png"));

        let outcomes = wait_for(&loader, 1);
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].id, AssetId("earth"));

        let mut slot = AssetSlot::Pending;
        let result = outcomes.into_iter().next().unwrap().into_texture().unwrap();
        slot.resolve(result);
        let tex = slot.get().unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
        assert_eq!(tex.rgba.len(), 4 * 2 * 4);
        let last = &tex.rgba[tex.rgba.len() - 4..];
        assert_eq!(last, &[10, 20, 30, 255]);
    }

    #[test]
    fn test_missing_file_fails_slot() {
        let dir = tempfile::tempdir().unwrap();
        let loader = AssetLoader::new(dir.path());
        loader.request_texture(AssetId("moon"), "moon_1024.jpg");

        let outcomes = wait_for(&loader, 1);
        let outcome = outcomes.into_iter().next().unwrap();
        assert!(matches!(outcome.result, Err(AssetError::Read { .. })));

        let mut slot = AssetSlot::Pending;
        slot.resolve(outcome.into_texture().unwrap());
        assert!(slot.is_failed());
    }

    #[test]
    fn test_garbage_image_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("nebula.png"), b"not a png").unwrap();
        let loader = AssetLoader::new(dir.path());
        loader.request_texture(AssetId("nebula"), "nebula.png");
        let outcome = wait_for(&loader, 1).into_iter().next().unwrap();
        assert!(matches!(outcome.result, Err(AssetError::Decode { .. })));
    }

    /// 16-bit PCM mono WAV.
    fn wav_bytes(samples: &[i16], sample_rate: u32) -> Vec<u8> {
        let data_len = (samples.len() * 2) as u32;
        let mut out = Vec::with_capacity(44 + data_len as usize);
        out.extend_from_slice(b"RIFF");
        out.extend_from_slice(&(36 + data_len).to_le_bytes());
        out.extend_from_slice(b"WAVEfmt ");
        out.extend_from_slice(&16u32.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&sample_rate.to_le_bytes());
        out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
        out.extend_from_slice(&2u16.to_le_bytes());
        out.extend_from_slice(&16u16.to_le_bytes());
        out.extend_from_slice(b"data");
        out.extend_from_slice(&data_len.to_le_bytes());
        for s in samples {
            out.extend_from_slice(&s.to_le_bytes());
        }
        out
    }

    #[test]
    fn test_audio_decodes_to_samples() {
        let dir = tempfile::tempdir().unwrap();
        let pcm: Vec<i16> = (0..400).map(|i| ((i % 40) * 800 - 16_000) as i16).collect();
        std::fs::write(dir.path().join("ambient.wav"), wav_bytes(&pcm, 8000)).unwrap();
        let loader = AssetLoader::new(dir.path());
        loader.request_audio(AssetId("ambient"), "ambient.wav");

        let clip = wait_for(&loader, 1)
            .into_iter()
            .next()
            .unwrap()
            .into_audio()
            .unwrap()
            .unwrap();
        assert_eq!(clip.name, "ambient.wav");
        assert_eq!(clip.channels, 1);
        assert_eq!(clip.sample_rate, 8000);
        assert_eq!(clip.samples.len(), 400);
        assert!(clip.samples.iter().any(|s| *s != 0.0));
    }

    #[test]
    fn test_corrupt_or_empty_audio_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("ambient.mp3"), [1u8, 2, 3, 4]).unwrap();
        std::fs::write(dir.path().join("silence.mp3"), b"").unwrap();
        let loader = AssetLoader::new(dir.path());
        loader.request_audio(AssetId("ambient"), "ambient.mp3");
        loader.request_audio(AssetId("silence"), "silence.mp3");

        let outcomes = wait_for(&loader, 2);
        assert_eq!(outcomes.len(), 2);
        // One worker, so outcomes arrive in request order.
        let mut it = outcomes.into_iter();
        let corrupt = it.next().unwrap();
        assert!(matches!(corrupt.result, Err(AssetError::AudioDecode { .. })));
        let empty = it.next().unwrap();
        assert!(matches!(empty.result, Err(AssetError::Empty { .. })));

        let mut slot = AssetSlot::Pending;
        slot.resolve(corrupt.into_audio().unwrap());
        assert!(slot.is_failed());
    }

    #[test]
    fn test_kind_mismatch_is_none() {
        let outcome = LoadOutcome {
            id: AssetId("ambient"),
            result: Ok(LoadedAsset::Audio(AudioClip {
                name: "a".into(),
                channels: 1,
                sample_rate: 8000,
                samples: vec![0.0],
            })),
        };
        assert!(outcome.into_texture().is_none());
    }

    #[test]
    fn test_shutdown_drops_queued_requests() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = AssetLoader::new(dir.path());
        for _ in 0..200 {
            loader.request_texture(AssetId("missing"), "missing.png");
        }
        let dropped = loader.shutdown();
        // Every request was either finished by the worker or dropped, never both.
        assert_eq!(dropped + loader.drain().len(), 200);
    }

    #[test]
    fn test_shutdown_rejects_new_requests() {
        let dir = tempfile::tempdir().unwrap();
        let mut loader = AssetLoader::new(dir.path());
        loader.shutdown();
        assert!(!loader.request_texture(AssetId("late"), "late.png"));
        assert!(loader.drain().is_empty());
    }
}
