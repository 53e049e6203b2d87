use std::{env, fs, fs::File, path::PathBuf};

use modinfo_module_info::{decode, read_module_info_from_zip, ModuleDescriptor};

fn main() {
    pretty_env_logger::init();

    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .expect("usage: module_info <module-info.class | .jar | .jmod>");

    let descriptor = if path.extension().map_or(false, |e| e == "class") {
        decode(&fs::read(&path).unwrap()).unwrap()
    } else {
        let Some(descriptor) = read_module_info_from_zip(File::open(&path).unwrap()).unwrap()
        else {
            log::warn!("No module descriptor in {}", path.display());
            return;
        };
        descriptor
    };

    print_descriptor(&descriptor);
}

fn print_descriptor(descriptor: &ModuleDescriptor) {
    let open = if descriptor.is_open() { "open " } else { "" };
    match descriptor.version() {
        Some(version) => println!("{}module {}@{}", open, descriptor.name(), version),
        None => println!("{}module {}", open, descriptor.name()),
    }

    for require in descriptor.requires() {
        let mut modifiers = String::new();
        if require.mandated {
            modifiers.push_str("mandated ");
        }
        if require.is_static {
            modifiers.push_str("static ");
        }
        if require.transitive {
            modifiers.push_str("transitive ");
        }
        match &require.version {
            Some(version) => println!("    requires {}{}@{}", modifiers, require.module, version),
            None => println!("    requires {}{}", modifiers, require.module),
        }
    }

    for export in descriptor.exports() {
        if export.is_qualified() {
            let to = export
                .to
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            println!("    exports {} to {}", export.package, to);
        } else {
            println!("    exports {}", export.package);
        }
    }

    for use_ in descriptor.uses() {
        println!("    uses {}", use_.service);
    }

    for provide in descriptor.provides() {
        println!(
            "    provides {} with {}",
            provide.service,
            provide.implementations.join(", ")
        );
    }

    if !descriptor.packages().is_empty() {
        println!();
        println!("Packages:");
        for package in descriptor.packages() {
            println!("    {}", package);
        }
    }

    for record in descriptor.hashes() {
        println!();
        println!("Hashes ({}):", record.algorithm);
        for hash in &record.hashes {
            println!("    {} {}", hash.module, hash.hash);
        }
    }

    if let Some(main_class) = descriptor.main_class() {
        println!();
        println!("Main class: {}", main_class);
    }
    if let Some(target_platform) = descriptor.target_platform() {
        println!("Target platform: {}", target_platform);
    }
}
