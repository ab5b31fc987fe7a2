mod audio;
mod cli;
mod error;
mod postprocess;
mod renderer;
mod scheduler;
mod state;
mod ui;
mod utils;

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::OnceLock;
use std::time::Instant;

use audio::{enumerate_devices, AudioEngine};
use beatglow_api::FrameContext;
use clap::Parser;
use nannou::prelude::*;
use postprocess::{FxStore, PostProcessor, WgpuBackend};
use renderer::{Registry, SourceSurface, VisualizationMode};
use scheduler::{FrameScheduler, FrameTick, ViewWork};
use state::VisualState;
use tracing::{info, warn};
use ui::bindings::{parse_key, Action};
use ui::Notification;
use utils::Config;

/// Trail fade drawn over the surface before every frame
const FADE_ALPHA: f32 = 0.1;
const BLOOM_STEP: f32 = 0.1;

/// Parsed once in `main`; nannou's model callback cannot capture them.
static ARGS: OnceLock<cli::Args> = OnceLock::new();

fn args() -> &'static cli::Args {
    ARGS.get_or_init(cli::Args::parse)
}

fn main() {
    let args = args();

    if args.list_devices {
        for device in enumerate_devices() {
            let kind = if device.is_monitor { "monitor" } else { "input" };
            println!("{:<40} {} ({})", device.id, device.label, kind);
        }
        return;
    }

    nannou::app(model).update(update).run();
}

struct Model {
    engine: AudioEngine,
    scheduler: FrameScheduler,
    state: VisualState,
    registry: Registry,
    fx: FxStore,
    post: Rc<RefCell<PostProcessor<WgpuBackend>>>,
    surface: RefCell<SourceSurface>,
    /// Commands for the next surface update
    draw: Draw,
    /// Set when `draw` holds a frame the surface has not seen yet
    pending: Cell<bool>,
    last_tick: FrameTick,
    notification: Notification,
    started: Instant,
}

impl Model {
    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn set_mode(&mut self, mode: VisualizationMode) {
        self.registry.reset(mode);
        self.state.mode = mode;
        self.notification.show(self.registry.plugin_name(mode));
        info!("Mode: {}", mode);
    }

    fn connect(&mut self, id: &str) {
        match self.engine.connect(id) {
            Ok(()) => self.notification.show(format!("Connecting {}...", id)),
            Err(e) => {
                warn!("{}", e);
                self.notification.show(e.to_string());
            }
        }
    }

    /// Cycle to the device after the current one, wrapping around.
    fn connect_next_device(&mut self) {
        if self.engine.is_connecting() {
            self.notification.show("Still connecting...");
            return;
        }
        let devices = enumerate_devices();
        if devices.is_empty() {
            self.notification.show("No capture devices");
            return;
        }
        let next = self
            .engine
            .current_device()
            .and_then(|current| devices.iter().position(|d| d.id == current.id))
            .map_or(0, |i| (i + 1) % devices.len());
        let id = devices[next].id.clone();
        self.connect(&id);
    }
}

fn model(app: &App) -> Model {
    let args = args();
    let config = Config::load();
    utils::logging::init(config.log_level());

    app.set_exit_on_escape(false);

    let mut win = app
        .new_window()
        .title("beatglow")
        .view(view)
        .key_pressed(key_pressed)
        .resized(resized)
        .size(1280, 720);
    if !args.windowed {
        win = win.fullscreen();
    }
    let window_id = win.build().expect("failed to create the window");
    let window = app
        .window(window_id)
        .expect("window missing right after creation");
    if !args.windowed {
        window.set_cursor_visible(false);
    }

    let (width, height) = window.inner_size_pixels();
    let size = [width, height];
    let sample_count = window.msaa_samples();
    info!("Window size: {}x{} ({}x MSAA)", width, height, sample_count);

    let surface = SourceSurface::new(window.device(), size, sample_count, Frame::TEXTURE_FORMAT);

    let mut effects = config.effects();
    if args.no_fx {
        effects.toggles.enabled = false;
    }
    let backend = WgpuBackend::new(
        window.device_queue_pair().clone(),
        Frame::TEXTURE_FORMAT,
        sample_count,
    );
    let post = Rc::new(RefCell::new(PostProcessor::new(backend, effects)));
    if !post.borrow_mut().init(size) {
        warn!("Falling back to the unprocessed surface");
    }

    let mut fx = FxStore::new(effects);
    let listener = Rc::downgrade(&post);
    fx.subscribe(move |config| {
        if let Some(post) = listener.upgrade() {
            post.borrow_mut().apply_effects(config);
        }
    });

    let fps = args.fps.unwrap_or_else(|| config.target_fps());
    let mut scheduler = FrameScheduler::new(if fps > 0.0 { fps } else { config.target_fps() });
    let started = Instant::now();
    scheduler.start(0.0);
    info!("Frame pacing: {:.2}ms", scheduler.frame_interval());

    let mode = args.start_mode(config.default_mode());
    let mut model = Model {
        engine: AudioEngine::new(config.fft_size(), config.device_timeout()),
        scheduler,
        state: VisualState::with_mode(mode),
        registry: Registry::default(),
        fx,
        post,
        surface: RefCell::new(surface),
        draw: Draw::new(),
        pending: Cell::new(false),
        last_tick: FrameTick {
            time: 0.0,
            delta: 0.0,
        },
        notification: Notification::default(),
        started,
    };
    model.notification.show(mode.name());

    if let Some(id) = args.device.as_deref() {
        model.connect(id);
    }

    model
}

fn update(app: &App, model: &mut Model, _update: Update) {
    for result in model.engine.poll_connection() {
        match result {
            Ok(device) => model.notification.show(format!("Listening: {}", device.label)),
            Err(e) => {
                warn!("{}", e);
                model.notification.show(e.to_string());
            }
        }
    }
    model.notification.tick();

    let now = model.now_ms();
    let Some(tick) = model.scheduler.on_vsync(now) else {
        return;
    };
    debug_assert!(model.scheduler.is_running());
    model.last_tick = tick;

    let metrics = model.engine.update_metrics();
    model.state.advance(tick.time);

    let [width, height] = model.surface.borrow().size();
    let (width, height) = (width as f32, height as f32);

    let draw = &model.draw;
    draw.reset();
    draw.rect()
        .w_h(width, height)
        .color(rgba(5.0 / 255.0, 5.0 / 255.0, 5.0 / 255.0, FADE_ALPHA));

    let ctx = FrameContext {
        draw,
        width,
        height,
        spectrum: model.engine.spectrum(),
        metrics,
        palette: model.state.color.palette(),
        color_offset: model.state.color.offset(),
        rotation: model.state.rotation,
        time: tick.time,
    };
    model.registry.draw(model.state.mode, &ctx);
    model.pending.set(true);

    if app.elapsed_frames() % 600 == 0 {
        tracing::debug!(
            "bass {:.2} mid {:.2} high {:.2} frame {:.1}ms fx {}",
            metrics.bass,
            metrics.mid,
            metrics.high,
            tick.delta,
            model.post.borrow().opacity()
        );
    }
}

fn view(app: &App, model: &Model, frame: Frame) {
    let window = app.main_window();
    let device = window.device();
    let queue = window.queue();

    // Skipped candidates leave the frame holding the last composite
    let work = ViewWork::decide(model.pending.replace(false), model.notification.needs_redraw());
    if work == ViewWork::Skip {
        return;
    }

    let mut surface = model.surface.borrow_mut();
    if work == ViewWork::RenderAndComposite {
        surface.render(device, queue, &model.draw);
    }

    let bass = model.engine.metrics().bass;
    let processed = model.post.borrow_mut().render(
        surface.view(),
        frame.texture_view(),
        model.last_tick.time,
        bass,
    );
    if !processed {
        surface.present(device, queue, frame.texture_view());
    }

    // Notification overlay goes straight to the frame, never through post
    let overlay = app.draw();
    model.notification.draw(&overlay, app.window_rect());
    if let Err(e) = overlay.to_frame(app, &frame) {
        warn!("Overlay draw failed: {:?}", e);
    }
}

fn resized(app: &App, model: &mut Model, _size: Vec2) {
    let window = app.main_window();
    let (width, height) = window.inner_size_pixels();
    let size = [width, height];

    model.surface.borrow_mut().resize(
        window.device(),
        size,
        window.msaa_samples(),
        Frame::TEXTURE_FORMAT,
    );
    model.post.borrow_mut().resize(size);
    // Whatever was queued targeted the old surface size
    model.pending.set(false);
}

fn key_pressed(app: &App, model: &mut Model, key: Key) {
    let Some(action) = parse_key(key) else {
        return;
    };

    match action {
        Action::Quit => app.quit(),
        Action::TogglePlay => {
            if model.state.toggle_playing() {
                let now = model.now_ms();
                model.scheduler.start(now);
                model.notification.show("Playing");
            } else {
                model.scheduler.stop();
                model.notification.show("Paused");
            }
        }
        Action::NextPalette => {
            let palette = model.state.color.next_palette();
            model.notification.show(format!("Palette: {}", palette.name));
        }
        Action::NextMode => {
            let mode = model.state.mode.next();
            model.set_mode(mode);
        }
        Action::PrevMode => {
            let mode = model.state.mode.prev();
            model.set_mode(mode);
        }
        Action::ToggleEffects if !model.post.borrow().is_supported() => {
            model.notification.show("Effects unavailable");
        }
        Action::ToggleEffects => {
            let enabled = model.fx.toggle_enabled();
            model
                .notification
                .show(format!("Effects: {}", if enabled { "on" } else { "off" }));
        }
        Action::ToggleEffect(effect) => {
            let enabled = model.fx.toggle(effect);
            model.notification.show(format!(
                "{}: {}",
                effect.name(),
                if enabled { "on" } else { "off" }
            ));
        }
        Action::BloomUp | Action::BloomDown => {
            let step = if action == Action::BloomUp { BLOOM_STEP } else { -BLOOM_STEP };
            let intensity = model.fx.adjust_bloom_intensity(step);
            model
                .notification
                .show(format!("Bloom intensity: {:.1}", intensity));
        }
        Action::ConnectNextDevice => model.connect_next_device(),
        Action::Disconnect => {
            model.engine.disconnect();
            model.notification.show("Demo mode");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_are_parsed_once() {
        let parsed = cli::Args::try_parse_from(["beatglow", "-w", "--mode", "fire"]).unwrap();
        assert!(ARGS.set(parsed).is_ok());
        assert!(std::ptr::eq(args(), args()));
        assert!(args().windowed);
        assert_eq!(args().mode, Some(VisualizationMode::Fire));
    }
}
