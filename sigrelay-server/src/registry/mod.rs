mod peer;
mod registry;
mod registry_actor;
mod registry_command;
mod registry_handle;

pub use peer::*;
pub use registry::*;
pub use registry_actor::*;
pub use registry_command::*;
pub use registry_handle::*;
