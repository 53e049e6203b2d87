use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{normalize, ModuleInfoError, Result};

#[cfg(feature = "serde")]
fn is_false(b: &bool) -> bool {
    !*b
}

macro_rules! name_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Default, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
        pub struct $name(String);
        impl $name {
            pub fn new(name: impl Into<String>) -> Self {
                Self(name.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }
        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
        impl From<&str> for $name {
            fn from(name: &str) -> Self {
                Self(name.to_owned())
            }
        }
        impl From<String> for $name {
            fn from(name: String) -> Self {
                Self(name)
            }
        }
        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }
        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

name_type!(
    /// A module name such as `java.base`.
    ModuleName
);
name_type!(
    /// A dotted package name such as `java.util.concurrent`.
    PackageName
);

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Requirement {
    pub module: ModuleName,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub version: Option<String>,
    /// `requires static`: needed at compile time only.
    #[cfg_attr(
        feature = "serde",
        serde(rename = "static", default, skip_serializing_if = "is_false")
    )]
    pub is_static: bool,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "is_false"))]
    pub transitive: bool,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "is_false"))]
    pub mandated: bool,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "is_false"))]
    pub synthetic: bool,
}
impl Requirement {
    pub fn new(module: impl Into<ModuleName>) -> Self {
        Self {
            module: module.into(),
            version: None,
            is_static: false,
            transitive: false,
            mandated: false,
            synthetic: false,
        }
    }

    pub fn with(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Export {
    pub package: PackageName,
    /// Empty when the package is exported to every module.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub to: Vec<ModuleName>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "is_false"))]
    pub synthetic: bool,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "is_false"))]
    pub mandated: bool,
}
impl Export {
    pub fn new(package: impl Into<PackageName>) -> Self {
        Self::to(package, Vec::<ModuleName>::new())
    }

    /// A qualified export.
    pub fn to<M: Into<ModuleName>>(
        package: impl Into<PackageName>,
        modules: impl IntoIterator<Item = M>,
    ) -> Self {
        Self {
            package: package.into(),
            to: modules.into_iter().map(Into::into).collect(),
            synthetic: false,
            mandated: false,
        }
    }

    pub fn is_qualified(&self) -> bool {
        !self.to.is_empty()
    }

    pub fn with(mut self, f: impl FnOnce(&mut Self)) -> Self {
        f(&mut self);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Provision {
    /// Binary name of the service interface, e.g. `java.sql.Driver`.
    pub service: String,
    #[cfg_attr(
        feature = "serde",
        serde(rename = "with", default, skip_serializing_if = "Vec::is_empty")
    )]
    pub implementations: Vec<String>,
}
impl Provision {
    pub fn new<S: Into<String>>(
        service: impl Into<String>,
        implementations: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            service: service.into(),
            implementations: implementations.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct ServiceUse {
    pub service: String,
}
impl ServiceUse {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HashRecord {
    pub algorithm: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Vec::is_empty"))]
    pub hashes: Vec<ModuleHash>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ModuleHash {
    pub module: ModuleName,
    /// Lowercase hexadecimal digest.
    pub hash: String,
}
impl ModuleHash {
    pub fn new(module: impl Into<ModuleName>, hash: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            hash: hash.into(),
        }
    }
}

/// Everything recorded in a `module-info.class`.
///
/// Values are only produced through [`ModuleDescriptorBuilder::build`], so every
/// descriptor has non-empty identifiers and, unless it is `java.base` itself,
/// exactly one mandated requirement on `java.base`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(rename_all = "camelCase", try_from = "ModuleDescriptorBuilder")
)]
pub struct ModuleDescriptor {
    name: ModuleName,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    exports: Vec<Export>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    requires: Vec<Requirement>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    provides: Vec<Provision>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    uses: Vec<ServiceUse>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    version: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "is_false"))]
    open: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "is_false"))]
    synthetic: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "is_false"))]
    mandated: bool,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    packages: Vec<PackageName>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Vec::is_empty"))]
    hashes: Vec<HashRecord>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    main_class: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    target_platform: Option<String>,
}

impl ModuleDescriptor {
    /// A descriptor that declares nothing beyond its name.
    pub fn new(name: impl Into<ModuleName>) -> Result<Self> {
        Self::builder(name).build()
    }

    pub fn builder(name: impl Into<ModuleName>) -> ModuleDescriptorBuilder {
        ModuleDescriptorBuilder {
            name: name.into(),
            ..Default::default()
        }
    }

    /// A builder pre-populated with this descriptor's contents.
    pub fn to_builder(&self) -> ModuleDescriptorBuilder {
        ModuleDescriptorBuilder {
            name: self.name.clone(),
            version: self.version.clone(),
            open: self.open,
            synthetic: self.synthetic,
            mandated: self.mandated,
            requires: self.requires.clone(),
            exports: self.exports.clone(),
            provides: self.provides.clone(),
            uses: self.uses.clone(),
            packages: self.packages.clone(),
            hashes: self.hashes.clone(),
            main_class: self.main_class.clone(),
            target_platform: self.target_platform.clone(),
        }
    }

    /// Returns an adjusted copy; `self` is left untouched.
    pub fn with(&self, f: impl FnOnce(&mut ModuleDescriptorBuilder)) -> Result<Self> {
        let mut builder = self.to_builder();
        f(&mut builder);
        builder.build()
    }

    pub fn name(&self) -> &ModuleName {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn is_mandated(&self) -> bool {
        self.mandated
    }

    pub fn requires(&self) -> &[Requirement] {
        &self.requires
    }

    pub fn exports(&self) -> &[Export] {
        &self.exports
    }

    pub fn provides(&self) -> &[Provision] {
        &self.provides
    }

    pub fn uses(&self) -> &[ServiceUse] {
        &self.uses
    }

    pub fn packages(&self) -> &[PackageName] {
        &self.packages
    }

    pub fn hashes(&self) -> &[HashRecord] {
        &self.hashes
    }

    pub fn main_class(&self) -> Option<&str> {
        self.main_class.as_deref()
    }

    pub fn target_platform(&self) -> Option<&str> {
        self.target_platform.as_deref()
    }
}

/// Mutable staging area for a [`ModuleDescriptor`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(Deserialize),
    serde(rename_all = "camelCase", default)
)]
pub struct ModuleDescriptorBuilder {
    pub name: ModuleName,
    pub version: Option<String>,
    pub open: bool,
    pub synthetic: bool,
    pub mandated: bool,
    pub requires: Vec<Requirement>,
    pub exports: Vec<Export>,
    pub provides: Vec<Provision>,
    pub uses: Vec<ServiceUse>,
    pub packages: Vec<PackageName>,
    pub hashes: Vec<HashRecord>,
    pub main_class: Option<String>,
    pub target_platform: Option<String>,
}

impl ModuleDescriptorBuilder {
    /// Validates the staged contents and adds the implicit `java.base` requirement.
    pub fn build(self) -> Result<ModuleDescriptor> {
        module_name("module", self.name.as_str())?;
        for require in &self.requires {
            module_name("required module", require.module.as_str())?;
        }
        for export in &self.exports {
            binary_name("exported package", export.package.as_str())?;
            for target in &export.to {
                module_name("export target module", target.as_str())?;
            }
        }
        for provide in &self.provides {
            binary_name("service", &provide.service)?;
            for implementation in &provide.implementations {
                binary_name("service implementation", implementation)?;
            }
        }
        for use_ in &self.uses {
            binary_name("service", &use_.service)?;
        }
        for package in &self.packages {
            binary_name("package", package.as_str())?;
        }
        if let Some(main_class) = &self.main_class {
            binary_name("main class", main_class)?;
        }

        let hashes = self
            .hashes
            .into_iter()
            .map(|record| {
                non_empty("hash algorithm", &record.algorithm)?;
                let hashes = record
                    .hashes
                    .into_iter()
                    .map(|h| {
                        module_name("hashed module", h.module.as_str())?;
                        if hex::decode(&h.hash).is_err() {
                            return Err(ModuleInfoError::InvalidHexDigest {
                                module: h.module.into_string(),
                                digest: h.hash,
                            });
                        }
                        Ok(ModuleHash {
                            hash: h.hash.to_ascii_lowercase(),
                            ..h
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(HashRecord {
                    algorithm: record.algorithm,
                    hashes,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let requires = normalize::require_java_base(&self.name, self.requires);

        Ok(ModuleDescriptor {
            name: self.name,
            version: self.version,
            open: self.open,
            synthetic: self.synthetic,
            mandated: self.mandated,
            requires,
            exports: self.exports,
            provides: self.provides,
            uses: self.uses,
            packages: self.packages,
            hashes,
            main_class: self.main_class,
            target_platform: self.target_platform,
        })
    }
}

#[cfg(feature = "serde")]
impl TryFrom<ModuleDescriptorBuilder> for ModuleDescriptor {
    type Error = ModuleInfoError;

    fn try_from(builder: ModuleDescriptorBuilder) -> Result<Self> {
        builder.build()
    }
}

fn non_empty(what: &'static str, identifier: &str) -> Result<()> {
    if identifier.is_empty() {
        return Err(ModuleInfoError::EmptyIdentifier(what));
    }
    Ok(())
}

/// A module name may hold any character but controls; `\`, `:` and `@` only
/// when escaped with a backslash.
fn module_name(what: &'static str, name: &str) -> Result<()> {
    non_empty(what, name)?;

    let mut chars = name.chars();
    while let Some(c) = chars.next() {
        let valid = match c {
            '\\' => matches!(chars.next(), Some('\\' | ':' | '@')),
            ':' | '@' => false,
            c => !c.is_control(),
        };
        if !valid {
            return Err(invalid_name(what, name));
        }
    }
    Ok(())
}

/// A dotted binary name of a package or class: non-empty segments, none of
/// which may contain `/`, `;` or `[`.
fn binary_name(what: &'static str, name: &str) -> Result<()> {
    non_empty(what, name)?;

    if name
        .split('.')
        .any(|segment| segment.is_empty() || segment.contains(['/', ';', '[']))
    {
        return Err(invalid_name(what, name));
    }
    Ok(())
}

fn invalid_name(what: &'static str, name: &str) -> ModuleInfoError {
    ModuleInfoError::InvalidDescriptor(format!("invalid {} name {:?}", what, name))
}
