//! Window creation and event handling via winit.
//!
//! [`AppState`] implements winit's [`ApplicationHandler`]: window events feed
//! [`InputState`], and every redraw drains finished asset loads, takes one
//! input snapshot, advances the scene and renders it.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use orrery_assets::{AssetLoader, AssetSlot, LoadOutcome};
use orrery_audio::AmbientTrack;
use orrery_config::Config;
use orrery_input::InputState;
use orrery_render::{
    RenderContext, RenderContextError, SurfaceError, SurfaceWrapper, init_render_context_blocking,
};
use orrery_scene::{FrameUpdater, SceneLayout, SceneState};
use orrery_space::{Rgb, Starfield};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Fullscreen, Window, WindowAttributes, WindowId};

use crate::audio_output::SpeakerOutput;
use crate::frame_clock::FrameClock;
use crate::renderer::SceneRenderer;
use crate::scene_setup::{
    AMBIENT_TRACK, TextureSlot, playback_settings, star_layer_params, timing_mode,
};

/// Frames between periodic status lines at `debug`.
const STATUS_INTERVAL: u64 = 600;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    #[error("GPU initialization failed: {0}")]
    Render(#[from] RenderContextError),

    #[error("surface failed: {0}")]
    Surface(#[from] SurfaceError),
}

pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    let attributes = WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.window.width as f64,
            config.window.height as f64,
        ));
    if config.window.fullscreen {
        attributes.with_fullscreen(Some(Fullscreen::Borderless(None)))
    } else {
        attributes
    }
}

/// GPU-side state, created once the window exists.
struct Graphics {
    window: Arc<Window>,
    gpu: RenderContext,
    renderer: SceneRenderer,
}

pub struct AppState {
    config: Config,
    asset_root: PathBuf,
    graphics: Option<Graphics>,
    surface_wrapper: SurfaceWrapper,
    input: InputState,
    clock: FrameClock,
    layout: SceneLayout,
    starfield: Starfield,
    updater: FrameUpdater,
    scene: SceneState,
    loader: Option<AssetLoader>,
    textures: HashMap<TextureSlot, AssetSlot<(u32, u32)>>,
    ambient: AmbientTrack,
    audio_output: SpeakerOutput,
    /// Set when the app stopped because of an error.
    failure: Option<AppError>,
}

impl AppState {
    pub fn new(config: Config, asset_root: PathBuf) -> Self {
        let starfield = Starfield::generate(config.scene.seed, &star_layer_params(&config.scene));
        let updater = FrameUpdater::new(
            timing_mode(config.motion.timing),
            starfield.parallax_factors(),
        );
        let scene = SceneState::initial(starfield.layers().len());
        let input = InputState::new(
            config.window.width,
            config.window.height,
            config.scroll.pages,
            config.scroll.pixels_per_line,
        );
        let ambient = AmbientTrack::new(playback_settings(&config.audio));

        Self {
            surface_wrapper: SurfaceWrapper::new(config.window.width, config.window.height, 1.0),
            asset_root,
            graphics: None,
            input,
            clock: FrameClock::new(),
            layout: SceneLayout::default(),
            starfield,
            updater,
            scene,
            loader: None,
            textures: TextureSlot::ALL
                .into_iter()
                .map(|slot| (slot, AssetSlot::Pending))
                .collect(),
            ambient,
            audio_output: SpeakerOutput::default(),
            failure: None,
            config,
        }
    }

    pub fn scene(&self) -> &SceneState {
        &self.scene
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.failure = Some(err);
        event_loop.exit();
    }

    fn init_graphics(&mut self, event_loop: &ActiveEventLoop) -> Result<(), AppError> {
        let window = Arc::new(event_loop.create_window(window_attributes_from_config(&self.config))?);

        let scale_factor = window.scale_factor();
        let inner_size = window.inner_size();
        self.surface_wrapper = SurfaceWrapper::new(inner_size.width, inner_size.height, scale_factor);
        self.input.resize(inner_size.width, inner_size.height);
        info!(
            "Surface wrapper initialized: {}x{} (scale: {:.2})",
            inner_size.width, inner_size.height, scale_factor
        );

        let gpu = init_render_context_blocking(Arc::clone(&window), self.config.window.vsync)?;
        let renderer = SceneRenderer::new(
            &gpu,
            &self.layout,
            &self.starfield,
            self.config.scene.seed,
            Rgb::from_hex(self.config.scene.background),
        );
        self.graphics = Some(Graphics {
            window,
            gpu,
            renderer,
        });
        Ok(())
    }

    /// Queue every texture and, unless muted, the ambient track.
    fn request_assets(&mut self) {
        let loader = AssetLoader::new(&self.asset_root);
        info!("Loading assets from {}", self.asset_root.display());
        for slot in TextureSlot::ALL {
            if !loader.request_texture(slot.id(), slot.file(&self.config.assets)) {
                warn!("Asset loader unavailable, {} stays pending", slot.id());
            }
        }
        if self.config.audio.enabled {
            loader.request_audio(AMBIENT_TRACK, &self.config.audio.track);
        } else {
            info!("Ambient audio disabled");
        }
        self.loader = Some(loader);
    }

    /// Settle slots for every load that finished since the last frame.
    fn apply_loaded_assets(&mut self) {
        let Some(loader) = &self.loader else {
            return;
        };
        for outcome in loader.drain() {
            self.apply_outcome(outcome);
        }
    }

    fn apply_outcome(&mut self, outcome: LoadOutcome) {
        let id = outcome.id;
        if id == AMBIENT_TRACK {
            if let Some(result) = outcome.into_audio() {
                self.ambient.resolve_clip(result);
            }
            return;
        }
        let Some(slot) = TextureSlot::from_id(id) else {
            warn!("Unexpected asset outcome for {id}");
            return;
        };
        let Some(result) = outcome.into_texture() else {
            return;
        };
        let entry = self.textures.entry(slot).or_default();
        match result {
            Ok(data) => {
                let uploaded = match &mut self.graphics {
                    Some(g) => g.renderer.apply_texture(&g.gpu, slot, &data),
                    None => Ok(()),
                };
                match uploaded {
                    Ok(()) => {
                        entry.resolve(Ok((data.width, data.height)));
                    }
                    Err(e) => {
                        warn!("Texture {id} could not be uploaded: {e}");
                        if entry.is_pending() {
                            *entry = AssetSlot::Failed(e.to_string());
                        }
                    }
                }
            }
            Err(e) => {
                entry.resolve(Err(e));
            }
        }
        debug!("Texture {id} {}", entry.state_name());
    }

    fn handle_resize(&mut self, width: u32, height: u32) {
        // A minimized window keeps the last real viewport for input.
        if self.surface_wrapper.is_drawable() {
            self.input.resize(width, height);
        }
        if let Some(g) = &mut self.graphics {
            g.gpu.resize(width, height);
            g.renderer.resize(&g.gpu.device, width, height);
        }
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        self.apply_loaded_assets();

        let dt = self.clock.tick();
        let input = self.input.snapshot();
        if input.activated {
            self.ambient.on_activation(&mut self.audio_output);
        }
        self.scene = self.updater.advance(&self.scene, input, dt);

        if self.clock.frame_count().is_multiple_of(STATUS_INTERVAL) {
            debug!(
                tick = self.scene.tick,
                camera_z = self.scene.camera.position.z,
                scroll = input.scroll_progress,
                "Scene status"
            );
        }

        let Some(g) = &mut self.graphics else {
            return;
        };
        if self.surface_wrapper.is_drawable() {
            let transforms = self.layout.body_transforms(&self.scene);
            match g
                .renderer
                .render(&g.gpu, &self.scene, &transforms, self.updater.look_at())
            {
                Ok(()) => {}
                Err(SurfaceError::Timeout) => warn!("Surface timeout, skipping frame"),
                Err(e) => {
                    self.fail(event_loop, e.into());
                    return;
                }
            }
        }
        g.window.request_redraw();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.graphics.is_some() {
            return;
        }
        if let Err(e) = self.init_graphics(event_loop) {
            self.fail(event_loop, e);
            return;
        }
        self.request_assets();
        if let Some(g) = &self.graphics {
            g.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.input.handle_window_event(&event) {
            return;
        }
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(size) = self
                    .surface_wrapper
                    .handle_resize(new_size.width, new_size.height)
                {
                    self.handle_resize(size.width, size.height);
                    info!(
                        "Window resized to {}x{} (scale: {:.2})",
                        size.width,
                        size.height,
                        self.surface_wrapper.scale_factor()
                    );
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                let Some(inner) = self.graphics.as_ref().map(|g| g.window.inner_size()) else {
                    return;
                };
                if let Some(resize) = self.surface_wrapper.handle_scale_factor_changed(
                    scale_factor,
                    inner.width,
                    inner.height,
                ) {
                    self.handle_resize(resize.width, resize.height);
                    info!(
                        "Scale factor changed to {:.2}, resized to {}x{}",
                        scale_factor, resize.width, resize.height
                    );
                }
            }
            WindowEvent::RedrawRequested => self.redraw(event_loop),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(loader) = &mut self.loader {
            loader.shutdown();
        }
        info!(
            "Exiting after {} frames ({:.1}s)",
            self.clock.frame_count(),
            self.clock.total_time()
        );
    }
}

/// Create the event loop and run until the window closes.
#[instrument(skip(config))]
pub fn run(config: Config, asset_root: PathBuf) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = AppState::new(config, asset_root);
    event_loop.run_app(&mut app)?;
    match app.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orrery_assets::{AssetError, AudioClip, LoadedAsset, TextureData};
    use orrery_audio::PlaybackState;

    fn app() -> AppState {
        let mut config = Config::default();
        for layer in &mut config.scene.star_layers {
            layer.count = 16;
        }
        AppState::new(config, PathBuf::from("assets"))
    }

    fn texture_outcome(slot: TextureSlot) -> LoadOutcome {
        LoadOutcome {
            id: slot.id(),
            result: Ok(LoadedAsset::Texture(TextureData {
                width: 2,
                height: 1,
                rgba: vec![0; 8],
            })),
        }
    }

    #[test]
    fn test_new_app_starts_with_pending_slots() {
        let app = app();
        assert_eq!(app.textures.len(), TextureSlot::ALL.len());
        assert!(app.textures.values().all(AssetSlot::is_pending));
        assert_eq!(app.scene().layer_offsets.len(), 4);
        assert!(app.graphics.is_none());
    }

    #[test]
    fn test_texture_outcomes_settle_slots() {
        let mut app = app();
        app.apply_outcome(texture_outcome(TextureSlot::MoonBump));
        assert_eq!(
            app.textures[&TextureSlot::MoonBump],
            AssetSlot::Loaded((2, 1))
        );

        app.apply_outcome(LoadOutcome {
            id: TextureSlot::Nebula.id(),
            result: Err(AssetError::Empty {
                path: PathBuf::from("nebula.png"),
            }),
        });
        assert!(app.textures[&TextureSlot::Nebula].is_failed());

        // Settled slots never change.
        app.apply_outcome(texture_outcome(TextureSlot::Nebula));
        assert!(app.textures[&TextureSlot::Nebula].is_failed());
    }

    #[test]
    fn test_audio_outcome_arms_ambient_track() {
        let mut app = app();
        app.apply_outcome(LoadOutcome {
            id: AMBIENT_TRACK,
            result: Ok(LoadedAsset::Audio(AudioClip {
                name: "ambient.mp3".into(),
                channels: 1,
                sample_rate: 8000,
                samples: vec![0.0; 16],
            })),
        });
        assert!(app.ambient.clip().is_loaded());
        assert!(app.ambient.on_activation(&mut app.audio_output));
        assert_eq!(app.ambient.state(), PlaybackState::Started);
    }

    #[test]
    fn test_minimize_restore_keeps_scroll_progress() {
        let mut app = app();
        let (w, h) = (app.config.window.width, app.config.window.height);
        app.input.scroll.scroll_by(1.0e6);

        for (width, height) in [(0, 0), (w, h)] {
            if let Some(size) = app.surface_wrapper.handle_resize(width, height) {
                app.handle_resize(size.width, size.height);
            }
        }
        assert!(app.surface_wrapper.is_drawable());
        assert_eq!(app.input.snapshot().scroll_progress, 1.0);
    }

    #[test]
    fn test_fullscreen_attribute() {
        let mut config = Config::default();
        assert!(window_attributes_from_config(&config).fullscreen.is_none());
        config.window.fullscreen = true;
        assert!(window_attributes_from_config(&config).fullscreen.is_some());
    }
}
