// Bring-up context
//
// Owns every handle the init sequence creates. Each creation step stores
// its result here, and `shutdown` releases whatever exists in reverse
// order, clearing fields as it goes so a second call does nothing.

use ash::vk;
use raw_window_handle::RawDisplayHandle;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

use crate::backend::device::{create_logical_device, verify_depth_format, LogicalDevice, DEPTH_STENCIL_FORMAT};
use crate::backend::{surface, Api, AshApi};
use crate::config::{DebugConfig, DeviceConfig, InstanceConfig, WindowConfig};
use crate::error::{Fatal, InitError};

pub struct Context<A: Api> {
    // Released top to bottom
    surface: Option<vk::SurfaceKHR>,
    window: Option<Window>,
    device: Option<LogicalDevice<A::Device>>,
    api: Option<A>,
}

impl<A: Api> Context<A> {
    pub fn new() -> Self {
        Self {
            surface: None,
            window: None,
            device: None,
            api: None,
        }
    }

    /// Context around an already created instance.
    #[cfg(test)]
    pub fn with_instance(api: A) -> Self {
        Self {
            surface: None,
            window: None,
            device: None,
            api: Some(api),
        }
    }

    pub fn device(&self) -> Option<&LogicalDevice<A::Device>> {
        self.device.as_ref()
    }

    pub fn window(&self) -> Option<&Window> {
        self.window.as_ref()
    }

    pub fn surface(&self) -> Option<vk::SurfaceKHR> {
        self.surface
    }

    /// Select a physical device and open a logical device on it.
    ///
    /// The device is stored before the depth-stencil check runs, so a
    /// `FormatNotSupported` failure still leaves a valid device for shutdown.
    pub fn create_device(&mut self, config: &DeviceConfig) -> Result<(), InitError> {
        let api = self.api.as_ref().ok_or(InitError::MissingInstance)?;

        let policy = config.selection_policy();
        let device = create_logical_device(api, policy.as_ref(), config.queue_priority)?;
        let physical_device = device.physical_device;
        self.device = Some(device);

        if config.require_depth_stencil {
            verify_depth_format(api, physical_device, DEPTH_STENCIL_FORMAT)?;
        }

        Ok(())
    }

    /// Pass `Ok` through untouched; on `Err`, shut everything down and hand
    /// back a `Fatal` for the caller to report.
    pub fn check<T>(&mut self, result: Result<T, InitError>, message: &'static str) -> Result<T, Fatal> {
        result.map_err(|source| {
            log::debug!("{} ({}), shutting down", message, source);
            self.shutdown();
            Fatal { message, source }
        })
    }

    /// Release surface, window, device and instance, in that order.
    ///
    /// Safe to call any number of times.
    pub fn shutdown(&mut self) {
        if let Some(surface) = self.surface.take() {
            if let Some(api) = &self.api {
                log::info!("Destroying surface");
                api.destroy_surface(surface);
            }
        }

        if let Some(window) = self.window.take() {
            log::info!("Destroying window");
            drop(window);
        }

        if let Some(device) = self.device.take() {
            if let Some(api) = &self.api {
                log::info!("Destroying device");
                api.destroy_device(device.handle);
            }
        }

        if let Some(api) = self.api.take() {
            log::info!("Destroying vulkan instance");
            api.destroy();
        }
    }
}

impl<A: Api> Default for Context<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl Context<AshApi> {
    pub fn create_instance(
        &mut self,
        display_handle: RawDisplayHandle,
        config: &InstanceConfig,
        debug: &DebugConfig,
    ) -> Result<(), InitError> {
        self.api = Some(AshApi::new(display_handle, config, debug)?);
        Ok(())
    }

    /// Open the window and derive its presentation surface.
    pub fn create_window(
        &mut self,
        event_loop: &ActiveEventLoop,
        config: &WindowConfig,
    ) -> Result<(), InitError> {
        let api = self.api.as_ref().ok_or(InitError::MissingInstance)?;

        let window = surface::open_window(event_loop, config)?;
        let created = surface::create_surface(api, &window);
        self.window = Some(window);
        self.surface = Some(created?);

        Ok(())
    }
}

impl<A: Api> Drop for Context<A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
