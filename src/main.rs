// =============================================================================
// VULKAN BRING-UP HARNESS
// =============================================================================
//
// Opens a window, creates a Vulkan instance, picks a physical device and
// queue family, opens a logical device, then idles in the event loop until
// the window is closed. Nothing is rendered.
//
// INIT ORDER (strictly linear, each step runs once):
// 1. Instance (with the window system's surface extensions)
// 2. Device (selection policy -> logical device -> queue -> depth format check)
// 3. Window + surface (when the event loop resumes)
// 4. Event loop (blocking wait, exits on close)
// 5. Shutdown: surface -> window -> device -> instance
//
// Any failure along the way tears down what exists and exits non-zero.
//
// =============================================================================

mod backend;
mod config;
mod context;
mod error;

use backend::AshApi;
use config::Config;
use context::Context;
use error::Fatal;
use raw_window_handle::HasRawDisplayHandle;
use std::process::ExitCode;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
};

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> ExitCode {
    let (config, load_error) = Config::load();

    init_logging(&config);

    match load_error {
        Some(e) => log::warn!("Failed to load config.toml: {:#}. Using defaults.", e),
        None => log::debug!("Config: {:?}", config),
    }

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(fatal) => {
            eprintln!(
                "Error: {}: {} [{:?}]",
                fatal,
                fatal.source,
                fatal.source.status()
            );
            ExitCode::FAILURE
        }
    }
}

/// Informational lines go to stdout; `RUST_LOG` overrides the configured level.
fn init_logging(config: &Config) {
    use env_logger::{Builder, Target};
    use log::LevelFilter;

    let level = config.log_level();

    Builder::new()
        .filter_level(level.unwrap_or(LevelFilter::Info))
        .parse_default_env()
        .target(Target::Stdout)
        .init();

    if let Err(unknown) = level {
        log::warn!("Unknown log level '{}', defaulting to info", unknown);
    }
}

fn run(config: Config) -> Result<(), Fatal> {
    let mut context = Context::<AshApi>::new();

    let event_loop = EventLoop::new().map_err(backend::surface::display_error);
    let event_loop = context.check(event_loop, "failed to initialize window system")?;
    event_loop.set_control_flow(ControlFlow::Wait);

    log::info!("Creating vulkan instance");
    let result = context.create_instance(
        event_loop.raw_display_handle(),
        &config.instance,
        &config.debug,
    );
    context.check(result, "failed to create vulkan instance")?;

    log::info!("Creating device");
    let result = context.create_device(&config.device);
    context.check(result, "failed to create device")?;

    if let Some(device) = context.device() {
        log::info!(
            "Device ready: queue {:?} (family {}), {} memory heaps",
            device.queue,
            device.queue_family,
            device.memory_properties.memory_heap_count
        );
    }

    let mut app = App::new(config, context);
    let result = event_loop
        .run_app(&mut app)
        .map_err(backend::surface::display_error);
    app.context.check(result, "event loop failed")?;

    app.finish()
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// Event loop state: the context plus the first fatal error, if any.
struct App {
    config: Config,
    context: Context<AshApi>,
    failure: Option<Fatal>,
}

impl App {
    fn new(config: Config, context: Context<AshApi>) -> Self {
        Self {
            config,
            context,
            failure: None,
        }
    }

    /// Tear everything down and report how the run ended.
    fn finish(mut self) -> Result<(), Fatal> {
        self.context.shutdown();
        match self.failure.take() {
            Some(fatal) => Err(fatal),
            None => Ok(()),
        }
    }
}

// =============================================================================
// EVENT HANDLING
// =============================================================================

impl ApplicationHandler for App {
    /// Called when the application is ready to create windows.
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.context.window().is_some() || self.failure.is_some() {
            return;
        }

        log::info!("Creating window");
        let result = self.context.create_window(event_loop, &self.config.window);
        match self.context.check(result, "failed to create window") {
            Ok(()) => {
                if let Some(surface) = self.context.surface() {
                    log::debug!("Surface: {:?}", surface);
                }
            }
            Err(fatal) => {
                self.failure = Some(fatal);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        if let WindowEvent::CloseRequested = event {
            log::info!("Close requested, shutting down...");
            event_loop.exit();
        }
    }
}
