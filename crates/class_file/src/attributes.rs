use crate::{Attribute, ConstantPool, ExportsFlags, ModuleFlags, RequiresFlags};

#[derive(Debug, Default, Clone)]
pub struct Attributes(pub Vec<Attribute>);
impl Attributes {
    pub fn find_by_name(&self, name: &str, constant_pool: &ConstantPool) -> Option<&Attribute> {
        self.0
            .iter()
            .find(|a| constant_pool.utf8(a.attribute_name_index).ok() == Some(name))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Attribute> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The attributes of a `module-info` class file, in the order they are emitted.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AttributeKind {
    Module,
    ModulePackages,
    ModuleHashes,
    ModuleMainClass,
    ModuleTarget,
}
impl AttributeKind {
    pub const ALL: [AttributeKind; 5] = [
        AttributeKind::Module,
        AttributeKind::ModulePackages,
        AttributeKind::ModuleHashes,
        AttributeKind::ModuleMainClass,
        AttributeKind::ModuleTarget,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AttributeKind::Module => "Module",
            AttributeKind::ModulePackages => "ModulePackages",
            AttributeKind::ModuleHashes => "ModuleHashes",
            AttributeKind::ModuleMainClass => "ModuleMainClass",
            AttributeKind::ModuleTarget => "ModuleTarget",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }
}

// https://docs.oracle.com/javase/specs/jvms/se21/html/jvms-4.html#jvms-4.7.25
#[derive(Debug, PartialEq, Clone)]
pub struct ModuleAttribute {
    pub module_name_index: u16,
    pub module_flags: ModuleFlags,
    /// Zero when no version is recorded.
    pub module_version_index: u16,
    pub requires: Vec<RequiresEntry>,
    pub exports: Vec<ExportsEntry>,
    pub opens: Vec<OpensEntry>,
    pub uses_index: Vec<u16>,
    pub provides: Vec<ProvidesEntry>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct RequiresEntry {
    pub requires_index: u16,
    pub requires_flags: RequiresFlags,
    /// Zero when no version is recorded.
    pub requires_version_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ExportsEntry {
    pub exports_index: u16,
    pub exports_flags: ExportsFlags,
    pub exports_to_index: Vec<u16>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct OpensEntry {
    pub opens_index: u16,
    pub opens_flags: ExportsFlags,
    pub opens_to_index: Vec<u16>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ProvidesEntry {
    pub provides_index: u16,
    pub provides_with_index: Vec<u16>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ModulePackagesAttribute {
    pub package_index: Vec<u16>,
}

// Not part of the JVMS; written by jlink and the jmod tool.
#[derive(Debug, PartialEq, Clone)]
pub struct ModuleHashesAttribute {
    pub algorithm_index: u16,
    pub hashes: Vec<ModuleHashEntry>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ModuleHashEntry {
    pub module_name_index: u16,
    pub hash: Vec<u8>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ModuleMainClassAttribute {
    pub main_class_index: u16,
}

// Not part of the JVMS; written by jlink and the jmod tool.
#[derive(Debug, PartialEq, Clone)]
pub struct ModuleTargetAttribute {
    pub target_platform_index: u16,
}
