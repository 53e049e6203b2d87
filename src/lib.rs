//! Module descriptor tooling for Java modular artifacts.
//!
//! [`module_info`] works with resolved module descriptors and the archives that
//! carry them; [`class_file`] is the underlying class-file layer.

pub use modinfo_class_file as class_file;
pub use modinfo_module_info as module_info;

pub use module_info::{decode, encode, ModuleDescriptor, ModuleInfoError};
