//! Host Module
//!
//! The boundary between the scripting runtime and the native stores: host
//! values, the CACHE class registry, and object handles with method dispatch.

mod object;
mod registry;
mod value;

pub use object::{StashObject, METHODS, SIZE_PROPERTY};
pub use registry::{ClassDef, ClassKind, ClassRegistry, MODULE_PATH};
pub use value::Value;
