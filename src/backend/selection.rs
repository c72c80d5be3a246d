// Physical device selection
//
// Enumeration is separate from the decision: `enumerate_candidates` gathers
// every device with at least one queue family, and a `SelectionPolicy`
// picks the device + queue family out of that list.

use ash::prelude::VkResult;
use ash::vk;
use std::ffi::CStr;

use super::Api;

/// A physical device that exposes at least one queue family.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub physical_device: vk::PhysicalDevice,
    pub properties: vk::PhysicalDeviceProperties,
    pub queue_families: Vec<vk::QueueFamilyProperties>,
}

impl Candidate {
    /// Indices of graphics-capable families with at least `min_queue_count` queues, in index order.
    pub fn graphics_families(&self, min_queue_count: u32) -> impl Iterator<Item = u32> + '_ {
        self.queue_families
            .iter()
            .enumerate()
            .filter(move |(_, family)| {
                family.queue_flags.contains(vk::QueueFlags::GRAPHICS)
                    && family.queue_count >= min_queue_count
            })
            .map(|(index, _)| index as u32)
    }

    pub fn name(&self) -> String {
        unsafe { CStr::from_ptr(self.properties.device_name.as_ptr()) }
            .to_string_lossy()
            .into_owned()
    }
}

/// The device and queue family a policy settled on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub physical_device: vk::PhysicalDevice,
    pub queue_family: u32,
}

/// Ranks enumerated candidates. `None` means nothing is usable.
pub trait SelectionPolicy {
    fn select(&self, candidates: &[Candidate]) -> Option<Selection>;
}

/// First device in enumeration order, first graphics family within it.
#[derive(Debug, Clone, Copy)]
pub struct FirstMatch {
    pub min_queue_count: u32,
}

impl Default for FirstMatch {
    fn default() -> Self {
        Self { min_queue_count: 1 }
    }
}

impl SelectionPolicy for FirstMatch {
    fn select(&self, candidates: &[Candidate]) -> Option<Selection> {
        candidates.iter().find_map(|candidate| {
            candidate
                .graphics_families(self.min_queue_count)
                .next()
                .map(|queue_family| Selection {
                    physical_device: candidate.physical_device,
                    queue_family,
                })
        })
    }
}

/// Scores eligible devices by type (discrete > integrated > anything else).
/// Equal scores keep enumeration order.
#[derive(Debug, Clone, Copy)]
pub struct PreferDiscrete {
    pub min_queue_count: u32,
}

impl PreferDiscrete {
    fn score(device_type: vk::PhysicalDeviceType) -> u32 {
        match device_type {
            vk::PhysicalDeviceType::DISCRETE_GPU => 1000,
            vk::PhysicalDeviceType::INTEGRATED_GPU => 100,
            _ => 1,
        }
    }
}

impl SelectionPolicy for PreferDiscrete {
    fn select(&self, candidates: &[Candidate]) -> Option<Selection> {
        let mut best: Option<(u32, Selection)> = None;

        for candidate in candidates {
            let Some(queue_family) = candidate.graphics_families(self.min_queue_count).next()
            else {
                continue;
            };

            let score = Self::score(candidate.properties.device_type);
            if best.map_or(true, |(best_score, _)| score > best_score) {
                best = Some((
                    score,
                    Selection {
                        physical_device: candidate.physical_device,
                        queue_family,
                    },
                ));
            }
        }

        best.map(|(_, selection)| selection)
    }
}

/// Query every physical device and its queue families.
///
/// Devices reporting zero queue families are skipped. Enumeration failure
/// is returned as-is.
pub fn enumerate_candidates<A: Api>(api: &A) -> VkResult<Vec<Candidate>> {
    let devices = api.enumerate_physical_devices()?;
    log::info!("Found {} physical device(s)", devices.len());

    let mut candidates = Vec::with_capacity(devices.len());
    for physical_device in devices {
        let queue_families = api.queue_family_properties(physical_device);
        if queue_families.is_empty() {
            log::debug!("Skipping device {:?}: no queue families", physical_device);
            continue;
        }

        log::info!(
            "Found {} queue families on device {:?}",
            queue_families.len(),
            physical_device
        );
        for (index, family) in queue_families.iter().enumerate() {
            if family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
                log::info!("Queue family {} supports graphics", index);
            } else {
                log::info!("Queue family {} unsupported", index);
            }
        }

        candidates.push(Candidate {
            physical_device,
            properties: api.physical_device_properties(physical_device),
            queue_families,
        });
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::{family, MockApi, MockDevice};
    use ash::vk::Handle;

    fn candidate(raw: u64, device_type: vk::PhysicalDeviceType, families: Vec<vk::QueueFamilyProperties>) -> Candidate {
        Candidate {
            physical_device: vk::PhysicalDevice::from_raw(raw),
            properties: vk::PhysicalDeviceProperties {
                device_type,
                ..Default::default()
            },
            queue_families: families,
        }
    }

    #[test]
    fn first_match_takes_lowest_graphics_family() {
        let candidates = vec![candidate(
            1,
            vk::PhysicalDeviceType::INTEGRATED_GPU,
            vec![
                family(vk::QueueFlags::TRANSFER, 1),
                family(vk::QueueFlags::GRAPHICS, 1),
                family(vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE, 4),
            ],
        )];

        let selection = FirstMatch::default().select(&candidates).unwrap();
        assert_eq!(selection.queue_family, 1);
    }

    #[test]
    fn first_match_ignores_more_capable_later_device() {
        let candidates = vec![
            candidate(1, vk::PhysicalDeviceType::INTEGRATED_GPU, vec![family(vk::QueueFlags::GRAPHICS, 1)]),
            candidate(2, vk::PhysicalDeviceType::DISCRETE_GPU, vec![family(vk::QueueFlags::GRAPHICS, 16)]),
        ];

        let selection = FirstMatch::default().select(&candidates).unwrap();
        assert_eq!(selection.physical_device, vk::PhysicalDevice::from_raw(1));
        assert_eq!(selection.queue_family, 0);
    }

    #[test]
    fn first_match_respects_min_queue_count() {
        let candidates = vec![candidate(
            1,
            vk::PhysicalDeviceType::DISCRETE_GPU,
            vec![family(vk::QueueFlags::GRAPHICS, 1), family(vk::QueueFlags::GRAPHICS, 2)],
        )];

        let selection = FirstMatch { min_queue_count: 2 }.select(&candidates).unwrap();
        assert_eq!(selection.queue_family, 1);
    }

    #[test]
    fn prefer_discrete_beats_enumeration_order() {
        let candidates = vec![
            candidate(1, vk::PhysicalDeviceType::INTEGRATED_GPU, vec![family(vk::QueueFlags::GRAPHICS, 1)]),
            candidate(2, vk::PhysicalDeviceType::CPU, vec![family(vk::QueueFlags::GRAPHICS, 1)]),
            candidate(
                3,
                vk::PhysicalDeviceType::DISCRETE_GPU,
                vec![family(vk::QueueFlags::COMPUTE, 1), family(vk::QueueFlags::GRAPHICS, 1)],
            ),
        ];

        let selection = PreferDiscrete { min_queue_count: 1 }.select(&candidates).unwrap();
        assert_eq!(selection.physical_device, vk::PhysicalDevice::from_raw(3));
        assert_eq!(selection.queue_family, 1);
    }

    #[test]
    fn prefer_discrete_ties_keep_enumeration_order() {
        let candidates = vec![
            candidate(1, vk::PhysicalDeviceType::DISCRETE_GPU, vec![family(vk::QueueFlags::GRAPHICS, 1)]),
            candidate(2, vk::PhysicalDeviceType::DISCRETE_GPU, vec![family(vk::QueueFlags::GRAPHICS, 1)]),
        ];

        let selection = PreferDiscrete { min_queue_count: 1 }.select(&candidates).unwrap();
        assert_eq!(selection.physical_device, vk::PhysicalDevice::from_raw(1));
    }

    #[test]
    fn no_graphics_family_selects_nothing() {
        let candidates = vec![candidate(
            1,
            vk::PhysicalDeviceType::DISCRETE_GPU,
            vec![family(vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER, 2)],
        )];

        assert!(FirstMatch::default().select(&candidates).is_none());
        assert!(PreferDiscrete { min_queue_count: 1 }.select(&candidates).is_none());
    }

    #[test]
    fn enumeration_skips_devices_without_queue_families() {
        let api = MockApi::new(vec![
            MockDevice::new(vec![]),
            MockDevice::new(vec![family(vk::QueueFlags::GRAPHICS, 1)]),
        ]);

        let candidates = enumerate_candidates(&api).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].physical_device, MockApi::handle(1));
    }

    #[test]
    fn enumeration_failure_propagates() {
        let mut api = MockApi::new(vec![MockDevice::new(vec![family(vk::QueueFlags::GRAPHICS, 1)])]);
        api.enumerate_error = Some(vk::Result::ERROR_INITIALIZATION_FAILED);

        let err = enumerate_candidates(&api).unwrap_err();
        assert_eq!(err, vk::Result::ERROR_INITIALIZATION_FAILED);
    }
}
