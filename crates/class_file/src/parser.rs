use std::io::{self, Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};

use crate::{
    attributes::{
        Attributes, ExportsEntry, ModuleAttribute, ModuleHashEntry, ModuleHashesAttribute,
        ModuleMainClassAttribute, ModulePackagesAttribute, ModuleTargetAttribute, OpensEntry,
        ProvidesEntry, RequiresEntry,
    },
    class_file::{FieldInfo, MethodInfo},
    mutf8,
};

use super::{constant_pool::CpInfo, *};

type Endian = BigEndian;

pub struct Parser<'a> {
    r: Cursor<&'a [u8]>,
}
impl<'a> Parser<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            r: Cursor::new(buf),
        }
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        self.parse_magic_identifier()?;
        let version = self.parse_version()?;

        let constant_pool = self.parse_constant_pool()?;
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let this_class = self.read_u16()?;
        let super_class = self.read_u16()?;
        let interfaces_count = self.read_u16()?;

        let mut interfaces = vec![0u16; interfaces_count as usize];
        self.r.read_u16_into::<Endian>(&mut interfaces)?;

        let fields_count = self.read_u16()?;
        let fields = (0..fields_count)
            .map(|_| self.parse_field_info())
            .collect::<Result<Vec<_>>>()?;

        let methods_count = self.read_u16()?;
        let methods = (0..methods_count)
            .map(|_| self.parse_method_info())
            .collect::<Result<Vec<_>>>()?;

        let attributes = self.parse_attributes()?;

        Ok(ClassFile {
            version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }

    fn parse_field_info(&mut self) -> Result<FieldInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes()?;

        Ok(FieldInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_method_info(&mut self) -> Result<MethodInfo> {
        let access_flags = AccessFlags::from_bits_truncate(self.read_u16()?);
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;
        let attributes = self.parse_attributes()?;

        Ok(MethodInfo {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        })
    }

    fn parse_magic_identifier(&mut self) -> Result<()> {
        match self.read_u32()? {
            MAGIC => Ok(()),
            magic_identifier => Err(ClassFileError::InvalidMagicIdentifier(magic_identifier)),
        }
    }

    fn parse_version(&mut self) -> Result<(u16, u16)> {
        let minor = self.read_u16()?;
        let major = self.read_u16()?;
        Ok((major, minor))
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let constant_pool_count = self.read_u16()?;

        let mut count = (constant_pool_count as usize).saturating_sub(1);
        let mut res = Vec::with_capacity(count);
        while count > 0 {
            let index = res.len() as u16 + 1;
            let (cp_info, slot_size) = self.parse_cp_info(index)?;
            if slot_size > count {
                // A two-slot entry cannot start in the last slot.
                return Err(ClassFileError::InvalidConstantPoolIndex {
                    index,
                    expected: "single-slot entry",
                });
            }
            res.push(cp_info);
            (0..slot_size - 1).for_each(|_| res.push(CpInfo::Unusable));

            count -= slot_size;
        }
        Ok(ConstantPool::new(res))
    }

    fn parse_cp_info(&mut self, index: u16) -> Result<(CpInfo, usize)> {
        let tag = self.read_u8()?;
        let (cp_info, slot_size) = match tag {
            1 => (self.parse_utf8(index)?, 1),
            3 => (CpInfo::Integer(self.read_i32()?), 1),
            4 => (CpInfo::Float(f32::from_bits(self.read_u32()?)), 1),
            5 => (CpInfo::Long(self.read_i64()?), 2),
            6 => (CpInfo::Double(f64::from_bits(self.read_u64()?)), 2),
            7 => (CpInfo::Class(self.parse_class_info()?), 1),
            8 => (
                CpInfo::String {
                    string_index: self.read_u16()?,
                },
                1,
            ),
            9 => (CpInfo::FieldRef(self.parse_ref_info()?), 1),
            10 => (CpInfo::MethodRef(self.parse_ref_info()?), 1),
            11 => (CpInfo::InterfaceMethodRef(self.parse_ref_info()?), 1),
            12 => (self.parse_name_and_type_info()?, 1),
            15 => (self.parse_method_handle()?, 1),
            16 => (
                CpInfo::MethodType(constant_pool::MethodTypeInfo {
                    descriptor_index: self.read_u16()?,
                }),
                1,
            ),
            17 => (CpInfo::Dynamic(self.parse_dynamic_info()?), 1),
            18 => (CpInfo::InvokeDynamic(self.parse_dynamic_info()?), 1),
            19 => (
                CpInfo::Module(constant_pool::ModuleInfo {
                    name_index: self.read_u16()?,
                }),
                1,
            ),
            20 => (
                CpInfo::Package(constant_pool::PackageInfo {
                    name_index: self.read_u16()?,
                }),
                1,
            ),
            _ => return Err(ClassFileError::InvalidCpInfoTag(tag)),
        };

        Ok((cp_info, slot_size))
    }

    fn parse_utf8(&mut self, index: u16) -> Result<CpInfo> {
        let length = self.read_u16()?;
        let mut bytes = vec![0u8; length as usize];
        self.r.read_exact(&mut bytes)?;

        mutf8::decode(&bytes)
            .map(CpInfo::Utf8)
            .ok_or(ClassFileError::MalformedUtf8(index))
    }

    fn parse_class_info(&mut self) -> Result<constant_pool::ClassInfo> {
        let name_index = self.read_u16()?;

        Ok(constant_pool::ClassInfo { name_index })
    }

    fn parse_name_and_type_info(&mut self) -> Result<CpInfo> {
        let name_index = self.read_u16()?;
        let descriptor_index = self.read_u16()?;

        Ok(CpInfo::NameAndType(constant_pool::NameAndTypeInfo {
            name_index,
            descriptor_index,
        }))
    }

    fn parse_method_handle(&mut self) -> Result<CpInfo> {
        let reference_kind = self.read_u8()?;
        let reference_index = self.read_u16()?;

        Ok(CpInfo::MethodHandle(constant_pool::MethodHandleInfo {
            reference_kind,
            reference_index,
        }))
    }

    fn parse_dynamic_info(&mut self) -> Result<constant_pool::DynamicInfo> {
        let bootstrap_method_attr_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(constant_pool::DynamicInfo {
            bootstrap_method_attr_index,
            name_and_type_index,
        })
    }

    fn parse_ref_info(&mut self) -> Result<constant_pool::RefInfo> {
        let class_index = self.read_u16()?;
        let name_and_type_index = self.read_u16()?;

        Ok(constant_pool::RefInfo {
            class_index,
            name_and_type_index,
        })
    }

    fn parse_attributes(&mut self) -> Result<Attributes> {
        self.within_body(|p| {
            let attributes_count = p.read_u16()?;
            (0..attributes_count)
                .map(|_| p.parse_attribute())
                .collect::<Result<Vec<_>>>()
                .map(Attributes)
        })
    }

    fn parse_attribute(&mut self) -> Result<Attribute> {
        let attribute_name_index = self.read_u16()?;
        let attribute_length = self.read_u32()?;

        let offset = self.r.position();
        if attribute_length as u64 > self.remaining() {
            return Err(ClassFileError::TruncatedAttributeBody { offset });
        }

        let mut info = vec![0u8; attribute_length as usize];
        self.r.read_exact(&mut info)?;

        Ok(Attribute {
            attribute_name_index,
            info,
        })
    }

    pub fn parse_module_attribute(&mut self) -> Result<ModuleAttribute> {
        self.within_body(|p| {
            let module_name_index = p.read_u16()?;
            let module_flags = ModuleFlags::from_bits_truncate(p.read_u16()?);
            let module_version_index = p.read_u16()?;

            let requires = p.parse_table(|p| {
                Ok(RequiresEntry {
                    requires_index: p.read_u16()?,
                    requires_flags: RequiresFlags::from_bits_truncate(p.read_u16()?),
                    requires_version_index: p.read_u16()?,
                })
            })?;
            let exports = p.parse_table(|p| {
                Ok(ExportsEntry {
                    exports_index: p.read_u16()?,
                    exports_flags: ExportsFlags::from_bits_truncate(p.read_u16()?),
                    exports_to_index: p.parse_index_table()?,
                })
            })?;
            let opens = p.parse_table(|p| {
                Ok(OpensEntry {
                    opens_index: p.read_u16()?,
                    opens_flags: ExportsFlags::from_bits_truncate(p.read_u16()?),
                    opens_to_index: p.parse_index_table()?,
                })
            })?;
            let uses_index = p.parse_index_table()?;
            let provides = p.parse_table(|p| {
                Ok(ProvidesEntry {
                    provides_index: p.read_u16()?,
                    provides_with_index: p.parse_index_table()?,
                })
            })?;

            Ok(ModuleAttribute {
                module_name_index,
                module_flags,
                module_version_index,
                requires,
                exports,
                opens,
                uses_index,
                provides,
            })
        })
    }

    pub fn parse_module_packages_attribute(&mut self) -> Result<ModulePackagesAttribute> {
        self.within_body(|p| {
            Ok(ModulePackagesAttribute {
                package_index: p.parse_index_table()?,
            })
        })
    }

    pub fn parse_module_hashes_attribute(&mut self) -> Result<ModuleHashesAttribute> {
        self.within_body(|p| {
            let algorithm_index = p.read_u16()?;
            let hashes = p.parse_table(|p| {
                let module_name_index = p.read_u16()?;
                let hash_length = p.read_u16()?;
                let mut hash = vec![0u8; hash_length as usize];
                p.r.read_exact(&mut hash)?;

                Ok(ModuleHashEntry {
                    module_name_index,
                    hash,
                })
            })?;

            Ok(ModuleHashesAttribute {
                algorithm_index,
                hashes,
            })
        })
    }

    pub fn parse_module_main_class_attribute(&mut self) -> Result<ModuleMainClassAttribute> {
        self.within_body(|p| {
            Ok(ModuleMainClassAttribute {
                main_class_index: p.read_u16()?,
            })
        })
    }

    pub fn parse_module_target_attribute(&mut self) -> Result<ModuleTargetAttribute> {
        self.within_body(|p| {
            Ok(ModuleTargetAttribute {
                target_platform_index: p.read_u16()?,
            })
        })
    }

    fn parse_table<T>(&mut self, mut entry: impl FnMut(&mut Self) -> Result<T>) -> Result<Vec<T>> {
        let count = self.read_u16()?;
        (0..count).map(|_| entry(self)).collect()
    }

    fn parse_index_table(&mut self) -> Result<Vec<u16>> {
        let count = self.read_u16()?;
        let mut indices = vec![0u16; count as usize];
        self.r.read_u16_into::<Endian>(&mut indices)?;
        Ok(indices)
    }

    /// Runs `f`, reporting a read past the end of the buffer as a truncated
    /// attribute body rather than an I/O error.
    fn within_body<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        f(self).map_err(|e| match e {
            ClassFileError::IOError(ref io) if io.kind() == io::ErrorKind::UnexpectedEof => {
                ClassFileError::TruncatedAttributeBody {
                    offset: self.r.position(),
                }
            }
            e => e,
        })
    }

    fn remaining(&self) -> u64 {
        (self.r.get_ref().len() as u64).saturating_sub(self.r.position())
    }

    fn read_u64(&mut self) -> Result<u64> {
        Ok(self.r.read_u64::<Endian>()?)
    }

    fn read_i64(&mut self) -> Result<i64> {
        Ok(self.r.read_i64::<Endian>()?)
    }

    fn read_u32(&mut self) -> Result<u32> {
        Ok(self.r.read_u32::<Endian>()?)
    }

    fn read_u16(&mut self) -> Result<u16> {
        Ok(self.r.read_u16::<Endian>()?)
    }

    fn read_u8(&mut self) -> Result<u8> {
        Ok(self.r.read_u8()?)
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(self.r.read_i32::<Endian>()?)
    }
}


#[cfg(test)]
mod parse_constant_pool_tests {
    use super::*;

    #[test]
    fn it_should_reserve_a_second_slot_for_longs() {
        let pool = Parser::new(&[
            0x00, 0x05, // constant_pool_count
            0x05, 0, 0, 0, 0, 0, 0, 0, 0x2a, // Long 42
            0x01, 0x00, 0x01, b'x', // Utf8 "x"
            0x13, 0x00, 0x03, // Module #3
        ])
        .parse_constant_pool()
        .unwrap();

        assert_eq!(pool.get(1), Some(&CpInfo::Long(42)));
        assert_eq!(pool.get(2), Some(&CpInfo::Unusable));
        assert_eq!(pool.module_name(4).unwrap(), "x");
    }

    #[test]
    fn it_should_fail_on_a_long_in_the_last_slot() {
        assert!(matches!(
            Parser::new(&[
                0x00, 0x02, // constant_pool_count
                0x05, 0, 0, 0, 0, 0, 0, 0, 0x2a, // Long 42
            ])
            .parse_constant_pool(),
            Err(ClassFileError::InvalidConstantPoolIndex { index: 1, .. })
        ));
    }

    #[test]
    fn it_should_fail_on_an_unknown_tag() {
        assert!(matches!(
            Parser::new(&[0x00, 0x02, 0x02]).parse_constant_pool(),
            Err(ClassFileError::InvalidCpInfoTag(2))
        ));
    }

    #[test]
    fn it_should_fail_on_malformed_utf8() {
        assert!(matches!(
            Parser::new(&[0x00, 0x02, 0x01, 0x00, 0x01, 0x80]).parse_constant_pool(),
            Err(ClassFileError::MalformedUtf8(1))
        ));
    }
}
