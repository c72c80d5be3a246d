// Error kinds for the bring-up sequence
//
// Two tiers: `InitError` is what each creation step returns, `Fatal` is
// what the context hands back once it has given up and torn everything down.

use ash::vk;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InitError {
    #[error("Failed to load Vulkan library: {0}")]
    Loading(#[from] ash::LoadingError),

    #[error("Vulkan call failed: {0}")]
    Vulkan(#[from] vk::Result),

    #[error("No physical device with a graphics-capable queue family")]
    NoSuitableDevice,

    #[error("Format {0:?} does not support optimal-tiling depth-stencil attachments")]
    FormatNotSupported(vk::Format),

    #[error("Incompatible display: {0}")]
    IncompatibleDisplay(String),

    #[error("Vulkan instance has not been created")]
    MissingInstance,

    #[error("Invalid name (contains interior NUL): {0}")]
    InvalidName(#[from] std::ffi::NulError),
}

impl InitError {
    /// The API status code this error corresponds to.
    pub fn status(&self) -> vk::Result {
        match self {
            InitError::Loading(_) => vk::Result::ERROR_INITIALIZATION_FAILED,
            InitError::Vulkan(result) => *result,
            InitError::NoSuitableDevice => vk::Result::ERROR_DEVICE_LOST,
            InitError::FormatNotSupported(_) => vk::Result::ERROR_FORMAT_NOT_SUPPORTED,
            InitError::IncompatibleDisplay(_) => vk::Result::ERROR_INCOMPATIBLE_DISPLAY_KHR,
            InitError::MissingInstance => vk::Result::ERROR_INITIALIZATION_FAILED,
            InitError::InvalidName(_) => vk::Result::ERROR_EXTENSION_NOT_PRESENT,
        }
    }
}

/// An initialization failure after which the context has already been shut down.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct Fatal {
    pub message: &'static str,
    #[source]
    pub source: InitError,
}
