use std::collections::HashMap;

use crate::{ClassFileError, Result};

macro_rules! matches_cp_info {
    ($cp:expr, $index:expr, $i:ident) => {
        match $cp.get($index) {
            Some($crate::constant_pool::CpInfo::$i(n)) => Ok(n),
            _ => Err($crate::ClassFileError::InvalidConstantPoolIndex {
                index: $index,
                expected: stringify!($i),
            }),
        }
    };
}

/// The `constant_pool` table of a class file.
///
/// Slots are 1-indexed. `Long` and `Double` entries take two slots, the second
/// of which holds [`CpInfo::Unusable`].
#[derive(Debug, Default, Clone)]
pub struct ConstantPool {
    cp_infos: Vec<CpInfo>,
    interned: HashMap<InternKey, u16>,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone)]
enum InternKey {
    Utf8(String),
    Class(u16),
    Module(u16),
    Package(u16),
}
impl InternKey {
    fn of(cp_info: &CpInfo) -> Option<Self> {
        match cp_info {
            CpInfo::Utf8(s) => Some(InternKey::Utf8(s.clone())),
            CpInfo::Class(ClassInfo { name_index }) => Some(InternKey::Class(*name_index)),
            CpInfo::Module(ModuleInfo { name_index }) => Some(InternKey::Module(*name_index)),
            CpInfo::Package(PackageInfo { name_index }) => Some(InternKey::Package(*name_index)),
            _ => None,
        }
    }
}

impl ConstantPool {
    pub fn new(cp_infos: Vec<CpInfo>) -> Self {
        let mut interned = HashMap::new();
        for (i, cp_info) in cp_infos.iter().enumerate() {
            if let Some(key) = InternKey::of(cp_info) {
                interned.entry(key).or_insert(i as u16 + 1);
            }
        }

        Self { cp_infos, interned }
    }

    /// Number of occupied slots, not counting the reserved slot 0.
    pub fn len(&self) -> usize {
        self.cp_infos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cp_infos.is_empty()
    }

    pub fn get(&self, index: u16) -> Option<&CpInfo> {
        match index {
            0 => None,
            i => self.cp_infos.get(i as usize - 1),
        }
    }

    pub fn utf8(&self, index: u16) -> Result<&str> {
        matches_cp_info!(self, index, Utf8).map(String::as_str)
    }

    /// Name of a `CONSTANT_Class_info` in internal form, e.g. `java/lang/Object`.
    pub fn class_internal_name(&self, index: u16) -> Result<&str> {
        let ClassInfo { name_index } = matches_cp_info!(self, index, Class)?;
        self.utf8(*name_index)
    }

    /// Binary name of a class, e.g. `java.util.Map$Entry`.
    pub fn class_name(&self, index: u16) -> Result<String> {
        let internal = self.class_internal_name(index)?;
        Ok(match internal.rsplit_once('/') {
            Some((package, simple)) => format!("{}.{}", package.replace('/', "."), simple),
            None => internal.to_owned(),
        })
    }

    pub fn module_name(&self, index: u16) -> Result<&str> {
        let ModuleInfo { name_index } = matches_cp_info!(self, index, Module)?;
        self.utf8(*name_index)
    }

    /// Name of a package in internal form, e.g. `java/lang`.
    pub fn package_internal_name(&self, index: u16) -> Result<&str> {
        let PackageInfo { name_index } = matches_cp_info!(self, index, Package)?;
        self.utf8(*name_index)
    }

    /// Dotted name of a package, e.g. `java.lang`.
    pub fn package_name(&self, index: u16) -> Result<String> {
        Ok(self.package_internal_name(index)?.replace('/', "."))
    }

    pub fn intern_utf8(&mut self, s: &str) -> Result<u16> {
        if let Some(&index) = self.interned.get(&InternKey::Utf8(s.to_owned())) {
            return Ok(index);
        }
        self.push(CpInfo::Utf8(s.to_owned()))
    }

    /// Interns a class given by its binary (dotted) name.
    pub fn intern_class(&mut self, name: &str) -> Result<u16> {
        let name_index = self.intern_utf8(&name.replace('.', "/"))?;
        self.intern(CpInfo::Class(ClassInfo { name_index }))
    }

    pub fn intern_module(&mut self, name: &str) -> Result<u16> {
        let name_index = self.intern_utf8(name)?;
        self.intern(CpInfo::Module(ModuleInfo { name_index }))
    }

    /// Interns a package given by its dotted name.
    pub fn intern_package(&mut self, name: &str) -> Result<u16> {
        let name_index = self.intern_utf8(&name.replace('.', "/"))?;
        self.intern(CpInfo::Package(PackageInfo { name_index }))
    }

    fn intern(&mut self, cp_info: CpInfo) -> Result<u16> {
        match InternKey::of(&cp_info).and_then(|key| self.interned.get(&key)) {
            Some(&index) => Ok(index),
            None => self.push(cp_info),
        }
    }

    fn push(&mut self, cp_info: CpInfo) -> Result<u16> {
        // constant_pool_count is a u2 and counts the reserved slot 0.
        if self.cp_infos.len() >= u16::MAX as usize - 1 {
            return Err(ClassFileError::ConstantPoolOverflow);
        }

        self.cp_infos.push(cp_info);
        let index = self.cp_infos.len() as u16;
        if let Some(key) = InternKey::of(&self.cp_infos[index as usize - 1]) {
            self.interned.insert(key, index);
        }
        Ok(index)
    }
}
impl<'a> IntoIterator for &'a ConstantPool {
    type Item = &'a CpInfo;
    type IntoIter = std::slice::Iter<'a, CpInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.cp_infos.iter()
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum CpInfo {
    MethodRef(RefInfo),
    FieldRef(RefInfo),
    Float(f32),
    Double(f64),
    InterfaceMethodRef(RefInfo),
    Class(ClassInfo),
    NameAndType(NameAndTypeInfo),
    Utf8(String),
    String { string_index: u16 },
    Dynamic(DynamicInfo),
    InvokeDynamic(DynamicInfo),
    Integer(i32),
    MethodHandle(MethodHandleInfo),
    MethodType(MethodTypeInfo),
    Module(ModuleInfo),
    Package(PackageInfo),
    Long(i64),
    Unusable,
}
impl CpInfo {
    pub fn tag(&self) -> Option<u8> {
        Some(match self {
            CpInfo::Utf8(_) => 1,
            CpInfo::Integer(_) => 3,
            CpInfo::Float(_) => 4,
            CpInfo::Long(_) => 5,
            CpInfo::Double(_) => 6,
            CpInfo::Class(_) => 7,
            CpInfo::String { .. } => 8,
            CpInfo::FieldRef(_) => 9,
            CpInfo::MethodRef(_) => 10,
            CpInfo::InterfaceMethodRef(_) => 11,
            CpInfo::NameAndType(_) => 12,
            CpInfo::MethodHandle(_) => 15,
            CpInfo::MethodType(_) => 16,
            CpInfo::Dynamic(_) => 17,
            CpInfo::InvokeDynamic(_) => 18,
            CpInfo::Module(_) => 19,
            CpInfo::Package(_) => 20,
            CpInfo::Unusable => return None,
        })
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct RefInfo {
    pub class_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ClassInfo {
    // The constant_pool entry at name_index must be a CONSTANT_Utf8_info structure
    // representing a valid binary class or interface name encoded in internal form.
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct NameAndTypeInfo {
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct DynamicInfo {
    pub bootstrap_method_attr_index: u16,
    pub name_and_type_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodHandleInfo {
    pub reference_kind: u8,
    pub reference_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct MethodTypeInfo {
    pub descriptor_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct ModuleInfo {
    // Points to a CONSTANT_Utf8_info holding a module name, not in internal form.
    pub name_index: u16,
}

#[derive(Debug, PartialEq, Clone)]
pub struct PackageInfo {
    // Points to a CONSTANT_Utf8_info holding a package name in internal form.
    pub name_index: u16,
}

#[cfg(test)]
mod constant_pool_tests {
    use super::*;

    fn pool() -> ConstantPool {
        ConstantPool::new(vec![
            CpInfo::Utf8("java/util/Map$Entry".into()),
            CpInfo::Class(ClassInfo { name_index: 1 }),
            CpInfo::Utf8("java/util".into()),
            CpInfo::Package(PackageInfo { name_index: 3 }),
            CpInfo::Utf8("java.base".into()),
            CpInfo::Module(ModuleInfo { name_index: 5 }),
            CpInfo::Long(7),
            CpInfo::Unusable,
            CpInfo::Utf8("Main".into()),
            CpInfo::Class(ClassInfo { name_index: 9 }),
        ])
    }

    #[test]
    fn it_should_resolve_dotted_class_names() {
        assert_eq!(pool().class_name(2).unwrap(), "java.util.Map$Entry");
    }

    #[test]
    fn it_should_resolve_a_class_in_the_unnamed_package() {
        assert_eq!(pool().class_name(10).unwrap(), "Main");
    }

    #[test]
    fn it_should_resolve_dotted_package_names() {
        assert_eq!(pool().package_name(4).unwrap(), "java.util");
    }

    #[test]
    fn it_should_resolve_module_names() {
        assert_eq!(pool().module_name(6).unwrap(), "java.base");
    }

    #[test]
    fn it_should_reject_index_zero() {
        assert!(matches!(
            pool().utf8(0),
            Err(ClassFileError::InvalidConstantPoolIndex { index: 0, .. })
        ));
    }

    #[test]
    fn it_should_reject_an_out_of_range_index() {
        assert!(matches!(
            pool().utf8(11),
            Err(ClassFileError::InvalidConstantPoolIndex { index: 11, .. })
        ));
    }

    #[test]
    fn it_should_reject_the_wrong_kind_of_entry() {
        assert!(matches!(
            pool().module_name(4),
            Err(ClassFileError::InvalidConstantPoolIndex {
                index: 4,
                expected: "Module"
            })
        ));
        assert!(pool().utf8(8).is_err());
    }

    #[test]
    fn it_should_reuse_existing_entries_when_interning() {
        let mut pool = pool();
        assert_eq!(pool.intern_utf8("java.base").unwrap(), 5);
        assert_eq!(pool.intern_module("java.base").unwrap(), 6);
        assert_eq!(pool.intern_package("java.util").unwrap(), 4);
        assert_eq!(pool.intern_class("java.util.Map$Entry").unwrap(), 2);
        assert_eq!(pool.len(), 10);
    }

    #[test]
    fn it_should_append_new_entries_when_interning() {
        let mut pool = ConstantPool::default();
        assert_eq!(pool.intern_module("a.b").unwrap(), 2);
        assert_eq!(pool.intern_package("a.b").unwrap(), 4);
        assert_eq!(pool.utf8(1).unwrap(), "a.b");
        assert_eq!(pool.utf8(3).unwrap(), "a/b");
        assert_eq!(pool.intern_module("a.b").unwrap(), 2);
        assert_eq!(pool.len(), 4);
    }
}
