use log::{debug, trace};
use modinfo_class_file::{
    attributes::{AttributeKind, Attributes},
    Attribute, ClassFile, ConstantPool, Parser, Writer,
};

use crate::{codec, ModuleDescriptor, ModuleInfoError, Result};

/// Decodes the raw bytes of a `module-info.class`.
pub fn decode(bytes: &[u8]) -> Result<ModuleDescriptor> {
    from_class_file(&ClassFile::parse(bytes)?)
}

/// Reads the module attributes of a parsed class file. Attributes other than
/// the five module attributes are skipped without being interpreted.
pub fn from_class_file(class_file: &ClassFile) -> Result<ModuleDescriptor> {
    if !class_file.is_module_info() {
        return Err(ModuleInfoError::NotAModuleRecord);
    }

    let constant_pool = &class_file.constant_pool;
    let mut module = None;
    let mut packages = Vec::new();
    let mut hashes = Vec::new();
    let mut main_class = None;
    let mut target_platform = None;

    for attribute in class_file.attributes.iter() {
        let name = constant_pool.utf8(attribute.attribute_name_index)?;
        let Some(kind) = AttributeKind::from_name(name) else {
            debug!(
                "Skipping unrecognized attribute {} ({} bytes)",
                name,
                attribute.info.len()
            );
            continue;
        };
        trace!("Decoding {} attribute ({} bytes)", name, attribute.info.len());

        let mut parser = Parser::new(&attribute.info);
        match kind {
            AttributeKind::Module => {
                module = Some(codec::decode_module(
                    &parser.parse_module_attribute()?,
                    constant_pool,
                )?);
            }
            AttributeKind::ModulePackages => {
                packages.extend(codec::decode_packages(
                    &parser.parse_module_packages_attribute()?,
                    constant_pool,
                )?);
            }
            AttributeKind::ModuleHashes => {
                hashes.push(codec::decode_hashes(
                    &parser.parse_module_hashes_attribute()?,
                    constant_pool,
                )?);
            }
            AttributeKind::ModuleMainClass => {
                main_class = Some(codec::decode_main_class(
                    &parser.parse_module_main_class_attribute()?,
                    constant_pool,
                )?);
            }
            AttributeKind::ModuleTarget => {
                target_platform = Some(codec::decode_target(
                    &parser.parse_module_target_attribute()?,
                    constant_pool,
                )?);
            }
        }
    }

    let mut builder = module.ok_or(ModuleInfoError::MissingModuleAttribute)?;
    builder.packages = packages;
    builder.hashes = hashes;
    builder.main_class = main_class;
    builder.target_platform = target_platform;
    builder.build()
}

/// Encodes a descriptor as the bytes of a standalone `module-info.class`.
pub fn encode(descriptor: &ModuleDescriptor) -> Result<Vec<u8>> {
    Ok(to_class_file(descriptor)?.to_bytes()?)
}

/// Lays out a descriptor as a module record with a fresh constant pool.
///
/// Attributes are emitted as `Module`, then `ModulePackages`, `ModuleHashes`,
/// `ModuleMainClass` and `ModuleTarget`, each only when it has content.
pub fn to_class_file(descriptor: &ModuleDescriptor) -> Result<ClassFile> {
    let mut constant_pool = ConstantPool::default();
    let this_class = constant_pool.intern_class("module-info")?;
    let mut attributes = Vec::new();

    let module = codec::encode_module(descriptor, &mut constant_pool)?;
    let info = Writer::new().write_module_attribute(&module)?;
    push_attribute(&mut attributes, &mut constant_pool, AttributeKind::Module, info)?;

    if !descriptor.packages().is_empty() {
        let packages = codec::encode_packages(descriptor.packages(), &mut constant_pool)?;
        let info = Writer::new().write_module_packages_attribute(&packages)?;
        push_attribute(
            &mut attributes,
            &mut constant_pool,
            AttributeKind::ModulePackages,
            info,
        )?;
    }

    for record in descriptor.hashes() {
        let hashes = codec::encode_hashes(record, &mut constant_pool)?;
        let info = Writer::new().write_module_hashes_attribute(&hashes)?;
        push_attribute(
            &mut attributes,
            &mut constant_pool,
            AttributeKind::ModuleHashes,
            info,
        )?;
    }

    if let Some(main_class) = descriptor.main_class() {
        let main_class = codec::encode_main_class(main_class, &mut constant_pool)?;
        let info = Writer::new().write_module_main_class_attribute(&main_class)?;
        push_attribute(
            &mut attributes,
            &mut constant_pool,
            AttributeKind::ModuleMainClass,
            info,
        )?;
    }

    if let Some(target_platform) = descriptor.target_platform() {
        let target = codec::encode_target(target_platform, &mut constant_pool)?;
        let info = Writer::new().write_module_target_attribute(&target)?;
        push_attribute(
            &mut attributes,
            &mut constant_pool,
            AttributeKind::ModuleTarget,
            info,
        )?;
    }

    Ok(ClassFile::new_module(
        constant_pool,
        this_class,
        Attributes(attributes),
    ))
}

fn push_attribute(
    attributes: &mut Vec<Attribute>,
    constant_pool: &mut ConstantPool,
    kind: AttributeKind,
    info: Vec<u8>,
) -> Result<()> {
    attributes.push(Attribute {
        attribute_name_index: constant_pool.intern_utf8(kind.name())?,
        info,
    });
    Ok(())
}
