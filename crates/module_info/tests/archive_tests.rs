use std::io::{Cursor, Read, Write};

use modinfo_module_info::{
    encode, locator::BoxError, read_module_info_from_entries, ModuleDescriptor,
};
use pretty_assertions::assert_eq;
use zip::{
    write::{FileOptions, ZipWriter},
    ZipArchive,
};

fn descriptor(name: &str) -> ModuleDescriptor {
    ModuleDescriptor::new(name).unwrap()
}

/// Writes a jar holding `entries` in the given order.
fn jar(entries: &[(&str, Vec<u8>)]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, bytes) in entries {
        zip.start_file::<_, ()>(*name, FileOptions::default())
            .unwrap();
        zip.write_all(bytes).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

fn entries_of(jar: Vec<u8>) -> Vec<(String, Vec<u8>)> {
    let mut archive = ZipArchive::new(Cursor::new(jar)).unwrap();
    (0..archive.len())
        .map(|i| {
            let mut file = archive.by_index(i).unwrap();
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes).unwrap();
            (file.name().to_owned(), bytes)
        })
        .collect()
}

fn locate(jar: Vec<u8>) -> Option<ModuleDescriptor> {
    read_module_info_from_entries(
        entries_of(jar)
            .into_iter()
            .map(|(name, bytes)| (name, move || Ok::<_, BoxError>(bytes))),
    )
    .unwrap()
}

#[test]
fn test_root_entry_wins_over_an_earlier_versioned_entry() {
    let jar = jar(&[
        ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".to_vec()),
        (
            "META-INF/versions/11/module-info.class",
            encode(&descriptor("org.example.eleven")).unwrap(),
        ),
        ("module-info.class", encode(&descriptor("org.example")).unwrap()),
    ]);

    assert_eq!(locate(jar), Some(descriptor("org.example")));
}

#[test]
fn test_root_entry_wins_over_a_later_versioned_entry() {
    let jar = jar(&[
        ("module-info.class", encode(&descriptor("org.example")).unwrap()),
        (
            "META-INF/versions/11/module-info.class",
            encode(&descriptor("org.example.eleven")).unwrap(),
        ),
    ]);

    assert_eq!(locate(jar), Some(descriptor("org.example")));
}

#[test]
fn test_jmod_layout() {
    let jar = jar(&[
        ("classes/org/example/Main.class", vec![0xca, 0xfe]),
        (
            "classes/module-info.class",
            encode(&descriptor("org.example")).unwrap(),
        ),
        ("lib/libexample.so", vec![0x7f, b'E', b'L', b'F']),
    ]);

    assert_eq!(locate(jar), Some(descriptor("org.example")));
}

#[test]
fn test_versioned_entry_alone() {
    let jar = jar(&[(
        "META-INF/versions/9/module-info.class",
        encode(&descriptor("org.example")).unwrap(),
    )]);

    assert_eq!(locate(jar), Some(descriptor("org.example")));
}

#[test]
fn test_archive_without_descriptor() {
    let jar = jar(&[
        ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".to_vec()),
        ("org/example/module-info.class", vec![0xca, 0xfe]),
    ]);

    assert_eq!(locate(jar), None);
}

#[cfg(feature = "zip")]
mod zip_archive {
    use modinfo_module_info::{read_module_info, read_module_info_from_zip, ModuleInfoError};
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_read_module_info_from_zip() {
        let jar = jar(&[
            (
                "META-INF/versions/17/module-info.class",
                encode(&descriptor("org.example.seventeen")).unwrap(),
            ),
            (
                "META-INF/versions/9/module-info.class",
                encode(&descriptor("org.example.nine")).unwrap(),
            ),
        ]);

        assert_eq!(
            read_module_info_from_zip(Cursor::new(jar)).unwrap(),
            Some(descriptor("org.example.nine"))
        );
    }

    #[test]
    fn test_archive_trait_on_zip_archive() {
        let jar = jar(&[("module-info.class", encode(&descriptor("org.example")).unwrap())]);
        let mut archive = ZipArchive::new(Cursor::new(jar)).unwrap();

        assert_eq!(
            read_module_info(&mut archive).unwrap(),
            Some(descriptor("org.example"))
        );
    }

    #[test]
    fn test_undecodable_descriptor_entry() {
        let jar = jar(&[("module-info.class", vec![0xca, 0xfe, 0xba, 0xbe])]);

        assert!(matches!(
            read_module_info_from_zip(Cursor::new(jar)),
            Err(ModuleInfoError::ClassFile(_))
        ));
    }

    #[test]
    fn test_not_a_zip() {
        assert!(matches!(
            read_module_info_from_zip(Cursor::new(b"not a zip".to_vec())),
            Err(ModuleInfoError::Zip(_))
        ));
    }
}
