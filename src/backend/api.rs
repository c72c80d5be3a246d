// Graphics API seam
//
// Everything the bring-up sequence needs from Vulkan, and nothing more.
// `AshApi` is the real thing; tests plug in a recording mock.

use ash::prelude::VkResult;
use ash::vk;

/// Instance-level entry points used by device selection and teardown.
pub trait Api {
    /// Logical device handle produced by `create_device`.
    type Device;

    fn enumerate_physical_devices(&self) -> VkResult<Vec<vk::PhysicalDevice>>;

    fn queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties>;

    fn physical_device_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceProperties;

    fn memory_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceMemoryProperties;

    fn format_properties(
        &self,
        physical_device: vk::PhysicalDevice,
        format: vk::Format,
    ) -> vk::FormatProperties;

    fn create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo,
    ) -> VkResult<Self::Device>;

    fn device_queue(&self, device: &Self::Device, family: u32, index: u32) -> vk::Queue;

    fn destroy_device(&self, device: Self::Device);

    fn destroy_surface(&self, surface: vk::SurfaceKHR);

    /// Destroys the instance (and anything instance-owned, like a debug messenger).
    fn destroy(self);
}
