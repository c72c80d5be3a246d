// Backend module - Vulkan bring-up layer
//
// Design: Thin wrapper around ash, one narrow trait (`Api`) at the seam
// so selection and teardown can run against a mock

pub mod api;
pub mod device;
pub mod instance;
pub mod selection;
pub mod surface;

#[cfg(test)]
pub mod mock;

pub use api::Api;
pub use instance::AshApi;
