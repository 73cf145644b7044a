//! Port definitions.

mod backend_port;
mod image_fetch_port;

pub use backend_port::BackendPort;
pub use image_fetch_port::ImageFetchPort;
