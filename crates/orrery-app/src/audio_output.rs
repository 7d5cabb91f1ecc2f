//! The app's [`AudioOutput`]: plays decoded clips on the default output
//! device through `rodio`.
//!
//! The device is opened on the first play, which only happens after a click.
//! Without a device the request is logged and the scene runs silently.

use orrery_assets::AudioClip;
use orrery_audio::{AudioOutput, PlaybackSettings};
use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};
use tracing::{info, warn};

#[derive(Default)]
pub struct SpeakerOutput {
    /// Must outlive `sink`; dropping it stops playback.
    stream: Option<OutputStream>,
    sink: Option<Sink>,
    playing: Option<(String, PlaybackSettings)>,
}

impl SpeakerOutput {
    /// Name and settings of the clip most recently started.
    pub fn playing(&self) -> Option<&(String, PlaybackSettings)> {
        self.playing.as_ref()
    }

    /// Whether an output device is open.
    pub fn has_device(&self) -> bool {
        self.sink.is_some()
    }

    fn sink(&mut self) -> Option<&Sink> {
        if self.sink.is_none() {
            match OutputStreamBuilder::open_default_stream() {
                Ok(stream) => {
                    self.sink = Some(Sink::connect_new(stream.mixer()));
                    self.stream = Some(stream);
                }
                Err(e) => {
                    warn!("No audio output device, ambient track stays silent: {e}");
                    return None;
                }
            }
        }
        self.sink.as_ref()
    }
}

impl AudioOutput for SpeakerOutput {
    fn play(&mut self, clip: &AudioClip, settings: PlaybackSettings) {
        info!(
            clip = %clip.name,
            seconds = clip.duration().as_secs_f32(),
            volume = settings.volume,
            looping = settings.looping,
            "Playing ambient clip"
        );
        self.playing = Some((clip.name.clone(), settings));

        let Some(sink) = self.sink() else {
            return;
        };
        let source = SamplesBuffer::new(clip.channels, clip.sample_rate, clip.samples.clone());
        sink.set_volume(settings.volume);
        if settings.looping {
            sink.append(source.repeat_infinite());
        } else {
            sink.append(source);
        }
    }
}
