// Window + presentation surface
//
// The window comes from winit, the surface from ash-window. Any failure to
// get a usable window is reported as an incompatible display.

use ash::vk;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};
use std::fmt::Display;
use std::io::Write;
use winit::event_loop::ActiveEventLoop;
use winit::window::{Window, WindowAttributes};

use super::AshApi;
use crate::config::WindowConfig;
use crate::error::InitError;

/// Report an error coming out of the window system on stderr.
pub fn report_window_error(err: &dyn Display) {
    write_window_error(&mut std::io::stderr().lock(), err);
}

fn write_window_error(out: &mut impl Write, err: &dyn Display) {
    let _ = writeln!(out, "Window system error: {}", err);
}

/// Map a window-system failure to `IncompatibleDisplay`, reporting it on the way.
pub fn display_error(err: impl Display) -> InitError {
    report_window_error(&err);
    InitError::IncompatibleDisplay(err.to_string())
}

/// Attributes for a plain, non-GL window of the configured size.
pub fn window_attributes(config: &WindowConfig) -> Result<WindowAttributes, InitError> {
    if config.width == 0 || config.height == 0 {
        return Err(display_error(format!(
            "window size must be positive, got {}x{}",
            config.width, config.height
        )));
    }

    Ok(WindowAttributes::default()
        .with_title(&config.title)
        .with_inner_size(winit::dpi::PhysicalSize::new(config.width, config.height)))
}

pub fn open_window(event_loop: &ActiveEventLoop, config: &WindowConfig) -> Result<Window, InitError> {
    let attributes = window_attributes(config)?;
    event_loop.create_window(attributes).map_err(display_error)
}

/// Derive a presentation surface for `window` from the instance.
pub fn create_surface(api: &AshApi, window: &Window) -> Result<vk::SurfaceKHR, InitError> {
    let surface = unsafe {
        ash_window::create_surface(
            &api.entry,
            &api.instance,
            window.raw_display_handle(),
            window.raw_window_handle(),
            None,
        )
    }?;

    Ok(surface)
}
