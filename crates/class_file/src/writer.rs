use byteorder::{BigEndian, WriteBytesExt};

use crate::{
    attributes::{
        Attributes, ModuleAttribute, ModuleHashesAttribute, ModuleMainClassAttribute,
        ModulePackagesAttribute, ModuleTargetAttribute,
    },
    class_file::{FieldInfo, MethodInfo},
    constant_pool::CpInfo,
    mutf8, ClassFile, ClassFileError, ConstantPool, Result, MAGIC,
};

type Endian = BigEndian;

/// Lays out class-file structures as big-endian bytes.
///
/// Every variable-length structure is written only after its contents are known,
/// so length and count prefixes are always exact.
#[derive(Default)]
pub struct Writer {
    w: Vec<u8>,
}
impl Writer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_class_file(mut self, class_file: &ClassFile) -> Result<Vec<u8>> {
        self.write_u32(MAGIC)?;
        let (major, minor) = class_file.version;
        self.write_u16(minor)?;
        self.write_u16(major)?;

        self.write_constant_pool(&class_file.constant_pool)?;
        self.write_u16(class_file.access_flags.bits())?;
        self.write_u16(class_file.this_class)?;
        self.write_u16(class_file.super_class)?;
        self.write_index_table(&class_file.interfaces)?;

        self.write_count(class_file.fields.len())?;
        for field in &class_file.fields {
            self.write_field_info(field)?;
        }

        self.write_count(class_file.methods.len())?;
        for method in &class_file.methods {
            self.write_method_info(method)?;
        }

        self.write_attributes(&class_file.attributes)?;

        Ok(self.w)
    }

    fn write_field_info(&mut self, field: &FieldInfo) -> Result<()> {
        self.write_u16(field.access_flags.bits())?;
        self.write_u16(field.name_index)?;
        self.write_u16(field.descriptor_index)?;
        self.write_attributes(&field.attributes)
    }

    fn write_method_info(&mut self, method: &MethodInfo) -> Result<()> {
        self.write_u16(method.access_flags.bits())?;
        self.write_u16(method.name_index)?;
        self.write_u16(method.descriptor_index)?;
        self.write_attributes(&method.attributes)
    }

    fn write_constant_pool(&mut self, constant_pool: &ConstantPool) -> Result<()> {
        let count = u16::try_from(constant_pool.len() + 1)
            .map_err(|_| ClassFileError::TableTooLarge(constant_pool.len()))?;
        self.write_u16(count)?;
        for cp_info in constant_pool {
            self.write_cp_info(cp_info)?;
        }
        Ok(())
    }

    fn write_cp_info(&mut self, cp_info: &CpInfo) -> Result<()> {
        let Some(tag) = cp_info.tag() else {
            return Ok(());
        };
        self.write_u8(tag)?;

        match cp_info {
            CpInfo::Utf8(s) => {
                let bytes = mutf8::encode(s);
                if bytes.len() > u16::MAX as usize {
                    return Err(ClassFileError::Utf8TooLong(bytes.len()));
                }
                self.write_u16(bytes.len() as u16)?;
                self.w.extend_from_slice(&bytes);
            }
            CpInfo::Integer(i) => self.w.write_i32::<Endian>(*i)?,
            CpInfo::Float(f) => self.write_u32(f.to_bits())?,
            CpInfo::Long(l) => self.w.write_i64::<Endian>(*l)?,
            CpInfo::Double(d) => self.w.write_u64::<Endian>(d.to_bits())?,
            CpInfo::Class(c) => self.write_u16(c.name_index)?,
            CpInfo::String { string_index } => self.write_u16(*string_index)?,
            CpInfo::FieldRef(r) | CpInfo::MethodRef(r) | CpInfo::InterfaceMethodRef(r) => {
                self.write_u16(r.class_index)?;
                self.write_u16(r.name_and_type_index)?;
            }
            CpInfo::NameAndType(nt) => {
                self.write_u16(nt.name_index)?;
                self.write_u16(nt.descriptor_index)?;
            }
            CpInfo::MethodHandle(mh) => {
                self.write_u8(mh.reference_kind)?;
                self.write_u16(mh.reference_index)?;
            }
            CpInfo::MethodType(mt) => self.write_u16(mt.descriptor_index)?,
            CpInfo::Dynamic(d) | CpInfo::InvokeDynamic(d) => {
                self.write_u16(d.bootstrap_method_attr_index)?;
                self.write_u16(d.name_and_type_index)?;
            }
            CpInfo::Module(m) => self.write_u16(m.name_index)?,
            CpInfo::Package(p) => self.write_u16(p.name_index)?,
            CpInfo::Unusable => {}
        }

        Ok(())
    }

    fn write_attributes(&mut self, attributes: &Attributes) -> Result<()> {
        self.write_count(attributes.len())?;
        for attribute in attributes.iter() {
            if attribute.info.len() > u32::MAX as usize {
                return Err(ClassFileError::AttributeTooLarge(attribute.info.len()));
            }
            self.write_u16(attribute.attribute_name_index)?;
            self.write_u32(attribute.info.len() as u32)?;
            self.w.extend_from_slice(&attribute.info);
        }
        Ok(())
    }

    pub fn write_module_attribute(mut self, module: &ModuleAttribute) -> Result<Vec<u8>> {
        self.write_u16(module.module_name_index)?;
        self.write_u16(module.module_flags.bits())?;
        self.write_u16(module.module_version_index)?;

        self.write_count(module.requires.len())?;
        for requires in &module.requires {
            self.write_u16(requires.requires_index)?;
            self.write_u16(requires.requires_flags.bits())?;
            self.write_u16(requires.requires_version_index)?;
        }

        self.write_count(module.exports.len())?;
        for exports in &module.exports {
            self.write_u16(exports.exports_index)?;
            self.write_u16(exports.exports_flags.bits())?;
            self.write_index_table(&exports.exports_to_index)?;
        }

        self.write_count(module.opens.len())?;
        for opens in &module.opens {
            self.write_u16(opens.opens_index)?;
            self.write_u16(opens.opens_flags.bits())?;
            self.write_index_table(&opens.opens_to_index)?;
        }

        self.write_index_table(&module.uses_index)?;

        self.write_count(module.provides.len())?;
        for provides in &module.provides {
            self.write_u16(provides.provides_index)?;
            self.write_index_table(&provides.provides_with_index)?;
        }

        Ok(self.w)
    }

    pub fn write_module_packages_attribute(
        mut self,
        packages: &ModulePackagesAttribute,
    ) -> Result<Vec<u8>> {
        self.write_index_table(&packages.package_index)?;
        Ok(self.w)
    }

    pub fn write_module_hashes_attribute(
        mut self,
        hashes: &ModuleHashesAttribute,
    ) -> Result<Vec<u8>> {
        self.write_u16(hashes.algorithm_index)?;
        self.write_count(hashes.hashes.len())?;
        for entry in &hashes.hashes {
            self.write_u16(entry.module_name_index)?;
            self.write_count(entry.hash.len())?;
            self.w.extend_from_slice(&entry.hash);
        }
        Ok(self.w)
    }

    pub fn write_module_main_class_attribute(
        mut self,
        main_class: &ModuleMainClassAttribute,
    ) -> Result<Vec<u8>> {
        self.write_u16(main_class.main_class_index)?;
        Ok(self.w)
    }

    pub fn write_module_target_attribute(
        mut self,
        target: &ModuleTargetAttribute,
    ) -> Result<Vec<u8>> {
        self.write_u16(target.target_platform_index)?;
        Ok(self.w)
    }

    fn write_index_table(&mut self, indices: &[u16]) -> Result<()> {
        self.write_count(indices.len())?;
        for &index in indices {
            self.write_u16(index)?;
        }
        Ok(())
    }

    fn write_count(&mut self, count: usize) -> Result<()> {
        let count = u16::try_from(count).map_err(|_| ClassFileError::TableTooLarge(count))?;
        self.write_u16(count)
    }

    fn write_u32(&mut self, n: u32) -> Result<()> {
        Ok(self.w.write_u32::<Endian>(n)?)
    }

    fn write_u16(&mut self, n: u16) -> Result<()> {
        Ok(self.w.write_u16::<Endian>(n)?)
    }

    fn write_u8(&mut self, n: u8) -> Result<()> {
        Ok(self.w.write_u8(n)?)
    }
}
