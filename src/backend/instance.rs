// Vulkan instance - the real `Api` implementation
//
// Responsibilities:
// - Loading the Vulkan library
// - Instance creation with the window system's surface extensions
// - Optional validation layer + debug messenger
// - Forwarding the device-level queries used during selection

use ash::extensions::{ext::DebugUtils, khr::Surface};
use ash::prelude::VkResult;
use ash::{vk, Entry};
use raw_window_handle::RawDisplayHandle;
use std::ffi::{c_char, CStr, CString};

use super::Api;
use crate::config::{DebugConfig, InstanceConfig};
use crate::error::InitError;

const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/// Owns the loader entry, the instance and the instance-level extension loaders.
pub struct AshApi {
    pub(crate) entry: Entry,
    pub(crate) instance: ash::Instance,
    surface_loader: Surface,
    debug_utils: Option<(DebugUtils, vk::DebugUtilsMessengerEXT)>,
}

impl AshApi {
    /// Create the Vulkan instance.
    ///
    /// Uses the configured extension list if one is given, otherwise asks the
    /// window system which surface extensions it needs. Availability is not
    /// checked up front; a missing extension shows up as the creation status.
    pub fn new(
        display_handle: RawDisplayHandle,
        config: &InstanceConfig,
        debug: &DebugConfig,
    ) -> Result<Self, InitError> {
        let entry = unsafe { Entry::load() }?;

        let configured = config
            .extensions
            .iter()
            .map(|name| CString::new(name.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        let mut extensions: Vec<*const c_char> = if configured.is_empty() {
            ash_window::enumerate_required_extensions(display_handle)?.to_vec()
        } else {
            configured.iter().map(|name| name.as_ptr()).collect()
        };

        if debug.validation_layers {
            extensions.push(DebugUtils::name().as_ptr());
        }

        for name in &extensions {
            log::debug!(
                "Instance extension: {}",
                unsafe { CStr::from_ptr(*name) }.to_string_lossy()
            );
        }

        let layer_names = if debug.validation_layers {
            vec![VALIDATION_LAYER.as_ptr()]
        } else {
            vec![]
        };

        let app_name = CString::new(config.application_name.as_str())?;
        let app_info = vk::ApplicationInfo::builder()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, 0, 1, 0))
            .engine_name(c"vk-bringup")
            .engine_version(vk::make_api_version(0, 0, 1, 0))
            .api_version(vk::API_VERSION_1_0);

        let create_info = vk::InstanceCreateInfo::builder()
            .application_info(&app_info)
            .enabled_extension_names(&extensions)
            .enabled_layer_names(&layer_names);

        let instance = unsafe { entry.create_instance(&create_info, None) }?;

        let debug_utils = if debug.validation_layers {
            match setup_debug_messenger(&entry, &instance) {
                Ok(messenger) => Some(messenger),
                Err(err) => {
                    unsafe { instance.destroy_instance(None) };
                    return Err(err.into());
                }
            }
        } else {
            None
        };

        let surface_loader = Surface::new(&entry, &instance);

        Ok(Self {
            entry,
            instance,
            surface_loader,
            debug_utils,
        })
    }
}

impl Api for AshApi {
    type Device = ash::Device;

    fn enumerate_physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        unsafe { self.instance.enumerate_physical_devices() }
    }

    fn queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties> {
        unsafe {
            self.instance
                .get_physical_device_queue_family_properties(physical_device)
        }
    }

    fn physical_device_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceProperties {
        unsafe { self.instance.get_physical_device_properties(physical_device) }
    }

    fn memory_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceMemoryProperties {
        unsafe {
            self.instance
                .get_physical_device_memory_properties(physical_device)
        }
    }

    fn format_properties(
        &self,
        physical_device: vk::PhysicalDevice,
        format: vk::Format,
    ) -> vk::FormatProperties {
        unsafe {
            self.instance
                .get_physical_device_format_properties(physical_device, format)
        }
    }

    fn create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo,
    ) -> VkResult<ash::Device> {
        unsafe {
            self.instance
                .create_device(physical_device, create_info, None)
        }
    }

    fn device_queue(&self, device: &ash::Device, family: u32, index: u32) -> vk::Queue {
        unsafe { device.get_device_queue(family, index) }
    }

    fn destroy_device(&self, device: ash::Device) {
        unsafe {
            // Device must be idle before destruction
            let _ = device.device_wait_idle();
            device.destroy_device(None);
        }
    }

    fn destroy_surface(&self, surface: vk::SurfaceKHR) {
        unsafe { self.surface_loader.destroy_surface(surface, None) };
    }

    fn destroy(mut self) {
        unsafe {
            if let Some((debug_utils, messenger)) = self.debug_utils.take() {
                debug_utils.destroy_debug_utils_messenger(messenger, None);
            }
            self.instance.destroy_instance(None);
        }
    }
}

fn setup_debug_messenger(
    entry: &Entry,
    instance: &ash::Instance,
) -> VkResult<(DebugUtils, vk::DebugUtilsMessengerEXT)> {
    let debug_utils = DebugUtils::new(entry, instance);

    let create_info = vk::DebugUtilsMessengerCreateInfoEXT::builder()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(debug_callback));

    let messenger = unsafe { debug_utils.create_debug_utils_messenger(&create_info, None) }?;

    Ok((debug_utils, messenger))
}

unsafe extern "system" fn debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    _message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT,
    _p_user_data: *mut std::ffi::c_void,
) -> vk::Bool32 {
    let message = CStr::from_ptr((*p_callback_data).p_message);

    match message_severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => {
            log::error!("[Vulkan] {}", message.to_string_lossy());
        }
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => {
            log::warn!("[Vulkan] {}", message.to_string_lossy());
        }
        _ => {
            log::debug!("[Vulkan] {}", message.to_string_lossy());
        }
    }

    vk::FALSE
}
