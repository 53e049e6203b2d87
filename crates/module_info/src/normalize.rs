use log::warn;

use crate::{ModuleDescriptor, ModuleName, Requirement, JAVA_BASE};

/// Gives `requires` exactly one mandated requirement on `java.base`.
///
/// An existing requirement is upgraded in place, keeping its position, version
/// and other flags; a missing one is prepended. `java.base` itself never gains
/// one. Later duplicates of the requirement are dropped.
pub fn require_java_base(module: &ModuleName, requires: Vec<Requirement>) -> Vec<Requirement> {
    let mut found = false;
    let mut normalized = Vec::with_capacity(requires.len() + 1);
    for mut require in requires {
        if require.module == JAVA_BASE {
            if found {
                warn!("{}: dropping duplicate requirement on {}", module, JAVA_BASE);
                continue;
            }
            found = true;
            require.mandated = true;
        }
        normalized.push(require);
    }

    if !found && *module != JAVA_BASE {
        normalized.insert(0, Requirement::new(JAVA_BASE).with(|r| r.mandated = true));
    }

    normalized
}

/// Re-applies the `java.base` rule to a descriptor. Descriptors already satisfy
/// it on construction, so this returns an equal value.
pub fn normalize(descriptor: ModuleDescriptor) -> ModuleDescriptor {
    let requires = require_java_base(descriptor.name(), descriptor.requires().to_vec());
    if requires == descriptor.requires() {
        return descriptor;
    }

    let mut builder = descriptor.to_builder();
    builder.requires = requires;
    builder.build().unwrap_or(descriptor)
}
