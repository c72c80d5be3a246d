// Recording `Api` for unit tests - no GPU required

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use std::cell::RefCell;
use std::rc::Rc;

use super::Api;

pub fn family(queue_flags: vk::QueueFlags, queue_count: u32) -> vk::QueueFamilyProperties {
    vk::QueueFamilyProperties {
        queue_flags,
        queue_count,
        ..Default::default()
    }
}

/// One fake physical device.
#[derive(Debug, Clone)]
pub struct MockDevice {
    pub device_type: vk::PhysicalDeviceType,
    pub queue_families: Vec<vk::QueueFamilyProperties>,
    pub depth_stencil_features: vk::FormatFeatureFlags,
}

impl MockDevice {
    pub fn new(queue_families: Vec<vk::QueueFamilyProperties>) -> Self {
        Self {
            device_type: vk::PhysicalDeviceType::INTEGRATED_GPU,
            queue_families,
            depth_stencil_features: vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockLogicalDevice(pub u64);

/// What the code under test asked of the API.
#[derive(Debug, Default)]
pub struct Calls {
    /// (physical device, queue family, queue priority, device extension count)
    pub created_devices: Vec<(vk::PhysicalDevice, u32, f32, u32)>,
    pub format_queries: Vec<vk::Format>,
    pub destroyed_devices: Vec<MockLogicalDevice>,
    pub destroyed_surfaces: Vec<vk::SurfaceKHR>,
    pub destroyed_instances: u32,
}

pub struct MockApi {
    pub devices: Vec<MockDevice>,
    pub enumerate_error: Option<vk::Result>,
    pub create_error: Option<vk::Result>,
    pub calls: Rc<RefCell<Calls>>,
}

impl MockApi {
    pub fn new(devices: Vec<MockDevice>) -> Self {
        Self {
            devices,
            enumerate_error: None,
            create_error: None,
            calls: Rc::default(),
        }
    }

    /// Handle of the device at `index` in enumeration order.
    pub fn handle(index: usize) -> vk::PhysicalDevice {
        vk::PhysicalDevice::from_raw(index as u64 + 1)
    }

    fn device(&self, physical_device: vk::PhysicalDevice) -> &MockDevice {
        &self.devices[physical_device.as_raw() as usize - 1]
    }
}

impl Api for MockApi {
    type Device = MockLogicalDevice;

    fn enumerate_physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>> {
        if let Some(err) = self.enumerate_error {
            return Err(err);
        }
        Ok((0..self.devices.len()).map(Self::handle).collect())
    }

    fn queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties> {
        self.device(physical_device).queue_families.clone()
    }

    fn physical_device_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceProperties {
        vk::PhysicalDeviceProperties {
            device_type: self.device(physical_device).device_type,
            ..Default::default()
        }
    }

    fn memory_properties(
        &self,
        _physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceMemoryProperties {
        vk::PhysicalDeviceMemoryProperties {
            memory_type_count: 1,
            memory_heap_count: 1,
            ..Default::default()
        }
    }

    fn format_properties(
        &self,
        physical_device: vk::PhysicalDevice,
        format: vk::Format,
    ) -> vk::FormatProperties {
        self.calls.borrow_mut().format_queries.push(format);
        vk::FormatProperties {
            optimal_tiling_features: self.device(physical_device).depth_stencil_features,
            ..Default::default()
        }
    }

    fn create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo,
    ) -> VkResult<MockLogicalDevice> {
        if let Some(err) = self.create_error {
            return Err(err);
        }

        assert_eq!(create_info.queue_create_info_count, 1);
        let queue_info = unsafe { &*create_info.p_queue_create_infos };
        assert_eq!(queue_info.queue_count, 1);
        let priority = unsafe { *queue_info.p_queue_priorities };

        let mut calls = self.calls.borrow_mut();
        calls.created_devices.push((
            physical_device,
            queue_info.queue_family_index,
            priority,
            create_info.enabled_extension_count,
        ));
        Ok(MockLogicalDevice(calls.created_devices.len() as u64))
    }

    fn device_queue(&self, device: &MockLogicalDevice, family: u32, index: u32) -> vk::Queue {
        vk::Queue::from_raw(device.0 << 16 | (family as u64) << 8 | index as u64)
    }

    fn destroy_device(&self, device: MockLogicalDevice) {
        self.calls.borrow_mut().destroyed_devices.push(device);
    }

    fn destroy_surface(&self, surface: vk::SurfaceKHR) {
        self.calls.borrow_mut().destroyed_surfaces.push(surface);
    }

    fn destroy(self) {
        self.calls.borrow_mut().destroyed_instances += 1;
    }
}
