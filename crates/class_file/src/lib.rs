// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html

mod access_flags;
pub mod attributes;
mod class_file;
#[macro_use]
pub mod constant_pool;
mod error;
mod mutf8;
mod parser;
mod writer;

use std::fmt;

pub use self::class_file::{ClassFile, FieldInfo, MethodInfo, JAVA_9_VERSION, MAGIC};
pub use access_flags::{AccessFlags, ExportsFlags, ModuleFlags, RequiresFlags};
pub use constant_pool::{ConstantPool, CpInfo};
pub use error::ClassFileError;
pub use parser::Parser;
pub use writer::Writer;

pub type Result<T, E = ClassFileError> = std::result::Result<T, E>;

#[derive(Clone)]
pub struct Attribute {
    pub attribute_name_index: u16,
    pub info: Vec<u8>,
}
impl fmt::Debug for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attribute")
            .field("attribute_name_index", &self.attribute_name_index)
            .field("info", &format!("({} bytes)", self.info.len()))
            .finish()
    }
}
