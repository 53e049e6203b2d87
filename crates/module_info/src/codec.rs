//! Conversion between the index-level module attributes of a class file and
//! the resolved values of a [`ModuleDescriptor`].

use modinfo_class_file::{
    attributes::{
        ExportsEntry, ModuleAttribute, ModuleHashEntry, ModuleHashesAttribute,
        ModuleMainClassAttribute, ModulePackagesAttribute, ModuleTargetAttribute, ProvidesEntry,
        RequiresEntry,
    },
    ConstantPool, ExportsFlags, ModuleFlags, RequiresFlags,
};

use crate::{
    Export, HashRecord, ModuleDescriptor, ModuleDescriptorBuilder, ModuleHash, ModuleInfoError,
    ModuleName, PackageName, Provision, Requirement, Result, ServiceUse,
};

/// Resolves a `Module` attribute into a builder. `opens` entries are read by
/// the parser but have no place in the descriptor and are dropped here.
pub fn decode_module(
    module: &ModuleAttribute,
    constant_pool: &ConstantPool,
) -> Result<ModuleDescriptorBuilder> {
    let name = module_name(constant_pool, module.module_name_index, "module")?;
    let version = optional_utf8(constant_pool, module.module_version_index)?;

    let requires = module
        .requires
        .iter()
        .map(|r| {
            Ok(Requirement {
                module: module_name(constant_pool, r.requires_index, "required module")?,
                version: optional_utf8(constant_pool, r.requires_version_index)?,
                is_static: r.requires_flags.contains(RequiresFlags::STATIC_PHASE),
                transitive: r.requires_flags.contains(RequiresFlags::TRANSITIVE),
                mandated: r.requires_flags.contains(RequiresFlags::MANDATED),
                synthetic: r.requires_flags.contains(RequiresFlags::SYNTHETIC),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let exports = module
        .exports
        .iter()
        .map(|e| {
            Ok(Export {
                package: package_name(constant_pool, e.exports_index, "exported package")?,
                to: e
                    .exports_to_index
                    .iter()
                    .map(|&i| module_name(constant_pool, i, "export target module"))
                    .collect::<Result<Vec<_>>>()?,
                synthetic: e.exports_flags.contains(ExportsFlags::SYNTHETIC),
                mandated: e.exports_flags.contains(ExportsFlags::MANDATED),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let uses = module
        .uses_index
        .iter()
        .map(|&i| Ok(ServiceUse::new(class_name(constant_pool, i, "service")?)))
        .collect::<Result<Vec<_>>>()?;

    let provides = module
        .provides
        .iter()
        .map(|p| {
            Ok(Provision {
                service: class_name(constant_pool, p.provides_index, "service")?,
                implementations: p
                    .provides_with_index
                    .iter()
                    .map(|&i| class_name(constant_pool, i, "service implementation"))
                    .collect::<Result<Vec<_>>>()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ModuleDescriptorBuilder {
        name,
        version,
        open: module.module_flags.contains(ModuleFlags::OPEN),
        synthetic: module.module_flags.contains(ModuleFlags::SYNTHETIC),
        mandated: module.module_flags.contains(ModuleFlags::MANDATED),
        requires,
        exports,
        provides,
        uses,
        ..Default::default()
    })
}

pub fn decode_packages(
    packages: &ModulePackagesAttribute,
    constant_pool: &ConstantPool,
) -> Result<Vec<PackageName>> {
    packages
        .package_index
        .iter()
        .map(|&i| package_name(constant_pool, i, "package"))
        .collect()
}

pub fn decode_hashes(
    hashes: &ModuleHashesAttribute,
    constant_pool: &ConstantPool,
) -> Result<HashRecord> {
    Ok(HashRecord {
        algorithm: non_empty(
            "hash algorithm",
            constant_pool.utf8(hashes.algorithm_index)?.to_owned(),
        )?,
        hashes: hashes
            .hashes
            .iter()
            .map(|h| {
                Ok(ModuleHash {
                    module: module_name(constant_pool, h.module_name_index, "hashed module")?,
                    hash: hex::encode(&h.hash),
                })
            })
            .collect::<Result<Vec<_>>>()?,
    })
}

pub fn decode_main_class(
    main_class: &ModuleMainClassAttribute,
    constant_pool: &ConstantPool,
) -> Result<String> {
    class_name(constant_pool, main_class.main_class_index, "main class")
}

pub fn decode_target(
    target: &ModuleTargetAttribute,
    constant_pool: &ConstantPool,
) -> Result<String> {
    Ok(constant_pool.utf8(target.target_platform_index)?.to_owned())
}

/// Interns every symbol the `Module` attribute refers to. The opens table is
/// always empty.
pub fn encode_module(
    descriptor: &ModuleDescriptor,
    constant_pool: &mut ConstantPool,
) -> Result<ModuleAttribute> {
    let module_name_index = constant_pool.intern_module(descriptor.name().as_str())?;

    let mut module_flags = ModuleFlags::empty();
    module_flags.set(ModuleFlags::OPEN, descriptor.is_open());
    module_flags.set(ModuleFlags::SYNTHETIC, descriptor.is_synthetic());
    module_flags.set(ModuleFlags::MANDATED, descriptor.is_mandated());

    let module_version_index = optional_intern(constant_pool, descriptor.version())?;

    let requires = descriptor
        .requires()
        .iter()
        .map(|r| {
            let mut requires_flags = RequiresFlags::empty();
            requires_flags.set(RequiresFlags::STATIC_PHASE, r.is_static);
            requires_flags.set(RequiresFlags::TRANSITIVE, r.transitive);
            requires_flags.set(RequiresFlags::SYNTHETIC, r.synthetic);
            requires_flags.set(RequiresFlags::MANDATED, r.mandated);

            Ok(RequiresEntry {
                requires_index: constant_pool.intern_module(r.module.as_str())?,
                requires_flags,
                requires_version_index: optional_intern(constant_pool, r.version.as_deref())?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let exports = descriptor
        .exports()
        .iter()
        .map(|e| {
            let mut exports_flags = ExportsFlags::empty();
            exports_flags.set(ExportsFlags::SYNTHETIC, e.synthetic);
            exports_flags.set(ExportsFlags::MANDATED, e.mandated);

            Ok(ExportsEntry {
                exports_index: constant_pool.intern_package(e.package.as_str())?,
                exports_flags,
                exports_to_index: e
                    .to
                    .iter()
                    .map(|m| constant_pool.intern_module(m.as_str()))
                    .collect::<modinfo_class_file::Result<Vec<_>>>()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let uses_index = descriptor
        .uses()
        .iter()
        .map(|u| constant_pool.intern_class(&u.service))
        .collect::<modinfo_class_file::Result<Vec<_>>>()?;

    let provides = descriptor
        .provides()
        .iter()
        .map(|p| {
            if p.implementations.is_empty() {
                return Err(ModuleInfoError::InvalidDescriptor(format!(
                    "service {} is provided without an implementation",
                    p.service
                )));
            }

            Ok(ProvidesEntry {
                provides_index: constant_pool.intern_class(&p.service)?,
                provides_with_index: p
                    .implementations
                    .iter()
                    .map(|i| constant_pool.intern_class(i))
                    .collect::<modinfo_class_file::Result<Vec<_>>>()?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ModuleAttribute {
        module_name_index,
        module_flags,
        module_version_index,
        requires,
        exports,
        opens: Vec::new(),
        uses_index,
        provides,
    })
}

pub fn encode_packages(
    packages: &[PackageName],
    constant_pool: &mut ConstantPool,
) -> Result<ModulePackagesAttribute> {
    Ok(ModulePackagesAttribute {
        package_index: packages
            .iter()
            .map(|p| constant_pool.intern_package(p.as_str()))
            .collect::<modinfo_class_file::Result<Vec<_>>>()?,
    })
}

pub fn encode_hashes(
    hashes: &HashRecord,
    constant_pool: &mut ConstantPool,
) -> Result<ModuleHashesAttribute> {
    Ok(ModuleHashesAttribute {
        algorithm_index: constant_pool.intern_utf8(&hashes.algorithm)?,
        hashes: hashes
            .hashes
            .iter()
            .map(|h| {
                let hash = hex::decode(&h.hash).map_err(|_| ModuleInfoError::InvalidHexDigest {
                    module: h.module.to_string(),
                    digest: h.hash.clone(),
                })?;
                Ok(ModuleHashEntry {
                    module_name_index: constant_pool.intern_module(h.module.as_str())?,
                    hash,
                })
            })
            .collect::<Result<Vec<_>>>()?,
    })
}

pub fn encode_main_class(
    main_class: &str,
    constant_pool: &mut ConstantPool,
) -> Result<ModuleMainClassAttribute> {
    Ok(ModuleMainClassAttribute {
        main_class_index: constant_pool.intern_class(main_class)?,
    })
}

pub fn encode_target(
    target_platform: &str,
    constant_pool: &mut ConstantPool,
) -> Result<ModuleTargetAttribute> {
    Ok(ModuleTargetAttribute {
        target_platform_index: constant_pool.intern_utf8(target_platform)?,
    })
}

fn module_name(constant_pool: &ConstantPool, index: u16, what: &'static str) -> Result<ModuleName> {
    non_empty(what, constant_pool.module_name(index)?.to_owned()).map(ModuleName::from)
}

fn package_name(
    constant_pool: &ConstantPool,
    index: u16,
    what: &'static str,
) -> Result<PackageName> {
    non_empty(what, constant_pool.package_name(index)?).map(PackageName::from)
}

fn class_name(constant_pool: &ConstantPool, index: u16, what: &'static str) -> Result<String> {
    non_empty(what, constant_pool.class_name(index)?)
}

fn optional_utf8(constant_pool: &ConstantPool, index: u16) -> Result<Option<String>> {
    match index {
        0 => Ok(None),
        i => Ok(Some(constant_pool.utf8(i)?.to_owned())),
    }
}

fn optional_intern(constant_pool: &mut ConstantPool, s: Option<&str>) -> Result<u16> {
    match s {
        Some(s) => Ok(constant_pool.intern_utf8(s)?),
        None => Ok(0),
    }
}

fn non_empty(what: &'static str, identifier: String) -> Result<String> {
    if identifier.is_empty() {
        return Err(ModuleInfoError::EmptyIdentifier(what));
    }
    Ok(identifier)
}
