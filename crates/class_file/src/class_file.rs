use crate::{attributes::Attributes, parser::Parser, writer::Writer, AccessFlags, ConstantPool, Result};

pub const MAGIC: u32 = 0xCAFEBABE;

/// Major version of the first class-file format that can describe a module.
pub const JAVA_9_VERSION: u16 = 53;

#[derive(Debug, Clone)]
pub struct ClassFile {
    /// `(major, minor)`
    pub version: (u16, u16),
    pub constant_pool: ConstantPool,
    pub access_flags: AccessFlags,
    pub this_class: u16,
    pub super_class: u16,
    pub interfaces: Vec<u16>,
    pub fields: Vec<FieldInfo>,
    pub methods: Vec<MethodInfo>,
    pub attributes: Attributes,
}
impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<ClassFile> {
        Parser::new(bytes).parse()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Writer::new().write_class_file(self)
    }

    /// A `module-info` record: `ACC_MODULE` set, no superclass, interfaces,
    /// fields or methods.
    pub fn new_module(constant_pool: ConstantPool, this_class: u16, attributes: Attributes) -> Self {
        Self {
            version: (JAVA_9_VERSION, 0),
            constant_pool,
            access_flags: AccessFlags::MODULE,
            this_class,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes,
        }
    }

    pub fn is_module_info(&self) -> bool {
        self.access_flags.contains(AccessFlags::MODULE)
    }

    pub fn class_name(&self) -> Result<&str> {
        // The constant_pool entry at this_class must be a CONSTANT_Class_info structure
        // representing the class, interface or module defined by this class file.
        self.constant_pool.class_internal_name(self.this_class)
    }
}

#[derive(Debug, Clone)]
pub struct FieldInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct MethodInfo {
    pub access_flags: AccessFlags,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Attributes,
}
