// Logical device creation
//
// Responsibilities:
// - Physical device + queue family selection (through a `SelectionPolicy`)
// - Logical device + queue creation
// - Memory properties lookup
// - Depth-stencil format check

use ash::vk;

use super::selection::{enumerate_candidates, SelectionPolicy};
use super::Api;
use crate::error::InitError;

/// Depth-stencil format the device must support as an optimal-tiling attachment.
pub const DEPTH_STENCIL_FORMAT: vk::Format = vk::Format::D24_UNORM_S8_UINT;

/// An opened device plus the facts gathered while opening it.
pub struct LogicalDevice<D> {
    pub handle: D,
    pub physical_device: vk::PhysicalDevice,
    pub queue_family: u32,
    pub queue: vk::Queue,
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,
}

/// Pick a device + queue family with `policy` and open it with a single queue.
///
/// Device creation is never attempted when nothing was selected.
pub fn create_logical_device<A: Api>(
    api: &A,
    policy: &dyn SelectionPolicy,
    queue_priority: f32,
) -> Result<LogicalDevice<A::Device>, InitError> {
    let candidates = enumerate_candidates(api)?;

    let selection = policy
        .select(&candidates)
        .ok_or(InitError::NoSuitableDevice)?;

    if let Some(candidate) = candidates
        .iter()
        .find(|c| c.physical_device == selection.physical_device)
    {
        let api_version = candidate.properties.api_version;
        log::info!("Selected GPU: {}", candidate.name());
        log::info!(
            "API Version: {}.{}.{}",
            vk::api_version_major(api_version),
            vk::api_version_minor(api_version),
            vk::api_version_patch(api_version)
        );
    }
    log::info!("Using queue family {}", selection.queue_family);

    let queue_priorities = [queue_priority];
    let queue_create_info = vk::DeviceQueueCreateInfo::builder()
        .queue_family_index(selection.queue_family)
        .queue_priorities(&queue_priorities)
        .build();

    let extensions = [ash::extensions::khr::Swapchain::name().as_ptr()];

    let create_info = vk::DeviceCreateInfo::builder()
        .queue_create_infos(std::slice::from_ref(&queue_create_info))
        .enabled_extension_names(&extensions);

    let handle = api.create_device(selection.physical_device, &create_info)?;
    let memory_properties = api.memory_properties(selection.physical_device);
    let queue = api.device_queue(&handle, selection.queue_family, 0);

    log::debug!(
        "Memory: {} types, {} heaps",
        memory_properties.memory_type_count,
        memory_properties.memory_heap_count
    );

    Ok(LogicalDevice {
        handle,
        physical_device: selection.physical_device,
        queue_family: selection.queue_family,
        queue,
        memory_properties,
    })
}

/// Fail unless `format` can be an optimal-tiling depth-stencil attachment.
///
/// There is no fallback search for another format.
pub fn verify_depth_format<A: Api>(
    api: &A,
    physical_device: vk::PhysicalDevice,
    format: vk::Format,
) -> Result<(), InitError> {
    let properties = api.format_properties(physical_device, format);

    if !properties
        .optimal_tiling_features
        .contains(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT)
    {
        return Err(InitError::FormatNotSupported(format));
    }

    log::debug!("Depth-stencil format {:?} supported", format);
    Ok(())
}
