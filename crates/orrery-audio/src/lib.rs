//! Ambient track gating.
//!
//! The ambient track may only start from a user click, and only after its
//! clip has loaded. A click that arrives early is dropped, not queued; the
//! next click after the load starts playback. Playback starts at most once.

use orrery_assets::{AssetError, AssetSlot, AudioClip};

/// Playback parameters handed to the output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackSettings {
    /// Linear gain in `[0, 1]`.
    pub volume: f32,
    pub looping: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            volume: 0.3,
            looping: true,
        }
    }
}

/// Something that can play a clip.
pub trait AudioOutput {
    fn play(&mut self, clip: &AudioClip, settings: PlaybackSettings);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlaybackState {
    #[default]
    NotStarted,
    Started,
}

#[derive(Debug, Default)]
pub struct AmbientTrack {
    state: PlaybackState,
    clip: AssetSlot<AudioClip>,
    settings: PlaybackSettings,
}

impl AmbientTrack {
    pub fn new(settings: PlaybackSettings) -> Self {
        Self {
            state: PlaybackState::NotStarted,
            clip: AssetSlot::Pending,
            settings,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn clip(&self) -> &AssetSlot<AudioClip> {
        &self.clip
    }

    pub fn settings(&self) -> PlaybackSettings {
        self.settings
    }

    /// Settle the clip slot with a load result.
    pub fn resolve_clip(&mut self, result: Result<AudioClip, AssetError>) {
        if self.clip.resolve(result) {
            log::debug!("Ambient clip {}", self.clip.state_name());
        }
    }

    /// Handle a user activation. Returns `true` only on the call that
    /// started playback.
    pub fn on_activation(&mut self, output: &mut dyn AudioOutput) -> bool {
        if self.state == PlaybackState::Started {
            return false;
        }
        let Some(clip) = self.clip.get() else {
            log::debug!("Activation ignored, ambient clip {}", self.clip.state_name());
            return false;
        };
        output.play(clip, self.settings);
        self.state = PlaybackState::Started;
        log::info!(
            "Ambient track started (volume {}, looping {})",
            self.settings.volume,
            self.settings.looping
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[derive(Default)]
    struct RecordingOutput {
        plays: Vec<(String, PlaybackSettings)>,
    }

    impl AudioOutput for RecordingOutput {
        fn play(&mut self, clip: &AudioClip, settings: PlaybackSettings) {
            self.plays.push((clip.name.clone(), settings));
        }
    }

    fn clip() -> AudioClip {
        AudioClip {
            name: "ambient.mp3".into(),
            channels: 2,
            sample_rate: 44_100,
            samples: vec![0.0; 64],
        }
    }

    #[test]
    fn test_click_before_load_then_after() {
        let mut track = AmbientTrack::new(PlaybackSettings::default());
        let mut out = RecordingOutput::default();

        assert!(!track.on_activation(&mut out));
        assert_eq!(track.state(), PlaybackState::NotStarted);
        assert!(out.plays.is_empty());

        track.resolve_clip(Ok(clip()));
        assert!(track.on_activation(&mut out));
        assert_eq!(track.state(), PlaybackState::Started);
        assert_eq!(out.plays.len(), 1);

        assert!(!track.on_activation(&mut out));
        assert_eq!(out.plays.len(), 1);
    }

    #[test]
    fn test_settings_passed_through() {
        let mut track = AmbientTrack::new(PlaybackSettings::default());
        track.resolve_clip(Ok(clip()));
        let mut out = RecordingOutput::default();
        track.on_activation(&mut out);
        let (name, settings) = &out.plays[0];
        assert_eq!(name, "ambient.mp3");
        assert_eq!(settings.volume, 0.3);
        assert!(settings.looping);
    }

    #[test]
    fn test_failed_clip_never_plays() {
        let mut track = AmbientTrack::new(PlaybackSettings::default());
        track.resolve_clip(Err(AssetError::Empty {
            path: PathBuf::from("ambient.mp3"),
        }));
        let mut out = RecordingOutput::default();
        for _ in 0..3 {
            assert!(!track.on_activation(&mut out));
        }
        assert!(out.plays.is_empty());
        assert!(track.clip().is_failed());
    }

    #[test]
    fn test_late_resolve_does_not_replace_clip() {
        let mut track = AmbientTrack::new(PlaybackSettings::default());
        track.resolve_clip(Ok(clip()));
        track.resolve_clip(Err(AssetError::Empty {
            path: PathBuf::from("other.mp3"),
        }));
        assert!(track.clip().is_loaded());
    }
}
