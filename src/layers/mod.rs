pub mod descriptor;
pub mod pane;
pub mod reconciler;
pub mod registry;

pub use descriptor::{DescriptorSnapshot, LayerDescriptor, LayerGroup, LayerKind, LayerSource};
pub use pane::Pane;
pub use registry::{ResourceHandle, ResourceRegistry};
