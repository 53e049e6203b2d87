use modinfo_class_file::ClassFileError;
use thiserror::Error;

use crate::locator::BoxError;

#[derive(Debug, Error)]
pub enum ModuleInfoError {
    #[error(transparent)]
    ClassFile(#[from] ClassFileError),
    #[error("Class file does not represent a module")]
    NotAModuleRecord,
    #[error("Module record has no Module attribute")]
    MissingModuleAttribute,
    #[error("Empty {0} name")]
    EmptyIdentifier(&'static str),
    #[error("Invalid module descriptor: {0}")]
    InvalidDescriptor(String),
    #[error("Invalid {module} hash: {digest:?} is not hexadecimal")]
    InvalidHexDigest { module: String, digest: String },
    #[error("Unable to read archive entry {name}")]
    ArchiveEntryUnreadable {
        name: String,
        #[source]
        source: BoxError,
    },
    #[cfg(feature = "zip")]
    #[error("Zip operation failed: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl ModuleInfoError {
    /// The class-file level cause, if any.
    pub fn class_file_error(&self) -> Option<&ClassFileError> {
        match self {
            ModuleInfoError::ClassFile(e) => Some(e),
            _ => None,
        }
    }
}
