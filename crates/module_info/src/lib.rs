//! Decodes, re-encodes and locates the module descriptor of a Java module:
//! the `Module`, `ModulePackages`, `ModuleHashes`, `ModuleMainClass` and
//! `ModuleTarget` attributes of a `module-info.class`.
//!
//! ```
//! use modinfo_module_info::{decode, encode, ModuleDescriptor, Requirement};
//!
//! let descriptor = ModuleDescriptor::new("org.example")?
//!     .with(|m| m.requires.push(Requirement::new("java.sql").with(|r| r.transitive = true)))?;
//! let bytes = encode(&descriptor)?;
//!
//! assert_eq!(decode(&bytes)?, descriptor);
//! assert_eq!(descriptor.requires()[0].module, "java.base");
//! # Ok::<(), modinfo_module_info::ModuleInfoError>(())
//! ```

pub mod codec;
mod descriptor;
mod error;
#[cfg(feature = "zip")]
mod jar;
pub mod locator;
pub mod normalize;
mod scanner;

pub use descriptor::{
    Export, HashRecord, ModuleDescriptor, ModuleDescriptorBuilder, ModuleHash, ModuleName,
    PackageName, Provision, Requirement, ServiceUse,
};
pub use error::ModuleInfoError;
#[cfg(feature = "zip")]
pub use jar::read_module_info_from_zip;
pub use locator::{
    read_module_info, read_module_info_from_entries, select_entry, Archive, EntryKind,
};
pub use normalize::normalize;
pub use scanner::{decode, encode, from_class_file, to_class_file};

/// The module every other module implicitly requires.
pub const JAVA_BASE: &str = "java.base";

pub type Result<T, E = ModuleInfoError> = std::result::Result<T, E>;

impl ModuleDescriptor {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        encode(self)
    }
}
