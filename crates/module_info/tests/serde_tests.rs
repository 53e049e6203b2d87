#![cfg(feature = "serde")]

use modinfo_module_info::{
    Export, HashRecord, ModuleDescriptor, ModuleHash, Provision, Requirement, ServiceUse,
};
use pretty_assertions::assert_eq;
use serde_json::json;

#[test]
fn test_defaults_are_omitted() {
    let descriptor = ModuleDescriptor::new("org.example").unwrap();

    assert_eq!(
        serde_json::to_value(&descriptor).unwrap(),
        json!({
            "name": "org.example",
            "requires": [{ "module": "java.base", "mandated": true }],
        })
    );
}

#[test]
fn test_field_names() {
    let descriptor = ModuleDescriptor::new("org.example")
        .unwrap()
        .with(|m| {
            m.version = Some("2.0".into());
            m.open = true;
            m.requires
                .push(Requirement::new("org.slf4j").with(|r| r.is_static = true));
            m.exports.push(Export::to("org.example.spi", ["org.example.plugin"]));
            m.provides.push(Provision::new(
                "org.example.spi.Plugin",
                ["org.example.DefaultPlugin"],
            ));
            m.uses.push(ServiceUse::new("org.example.spi.Plugin"));
            m.packages.push("org.example".into());
            m.hashes.push(HashRecord {
                algorithm: "SHA-256".into(),
                hashes: vec![ModuleHash::new("org.example.plugin", "ABCD")],
            });
            m.main_class = Some("org.example.Main".into());
            m.target_platform = Some("linux-amd64".into());
        })
        .unwrap();

    assert_eq!(
        serde_json::to_value(&descriptor).unwrap(),
        json!({
            "name": "org.example",
            "version": "2.0",
            "open": true,
            "requires": [
                { "module": "java.base", "mandated": true },
                { "module": "org.slf4j", "static": true },
            ],
            "exports": [{ "package": "org.example.spi", "to": ["org.example.plugin"] }],
            "provides": [{
                "service": "org.example.spi.Plugin",
                "with": ["org.example.DefaultPlugin"],
            }],
            "uses": ["org.example.spi.Plugin"],
            "packages": ["org.example"],
            "hashes": [{
                "algorithm": "SHA-256",
                "hashes": [{ "module": "org.example.plugin", "hash": "abcd" }],
            }],
            "mainClass": "org.example.Main",
            "targetPlatform": "linux-amd64",
        })
    );
}

#[test]
fn test_empty_nested_lists_are_omitted() {
    let descriptor = ModuleDescriptor::new("org.example")
        .unwrap()
        .with(|m| {
            m.provides
                .push(Provision::new("org.example.Service", Vec::<String>::new()));
            m.hashes.push(HashRecord {
                algorithm: "SHA-256".into(),
                hashes: vec![],
            });
        })
        .unwrap();
    let value = serde_json::to_value(&descriptor).unwrap();

    assert_eq!(value["provides"], json!([{ "service": "org.example.Service" }]));
    assert_eq!(value["hashes"], json!([{ "algorithm": "SHA-256" }]));
    assert_eq!(
        serde_json::from_value::<ModuleDescriptor>(value).unwrap(),
        descriptor
    );
}

#[test]
fn test_deserializing_normalizes() {
    let descriptor: ModuleDescriptor = serde_json::from_value(json!({
        "name": "org.example",
        "requires": [{ "module": "java.logging", "transitive": true }],
    }))
    .unwrap();

    assert_eq!(
        descriptor.requires(),
        [
            Requirement::new("java.base").with(|r| r.mandated = true),
            Requirement::new("java.logging").with(|r| r.transitive = true),
        ]
    );
}

#[test]
fn test_serialized_form_deserializes_to_the_same_descriptor() {
    let descriptor = ModuleDescriptor::new("org.example")
        .unwrap()
        .with(|m| m.exports.push(Export::new("org.example.api")))
        .unwrap();
    let json = serde_json::to_string(&descriptor).unwrap();

    assert_eq!(
        serde_json::from_str::<ModuleDescriptor>(&json).unwrap(),
        descriptor
    );
}

#[test]
fn test_deserializing_rejects_an_empty_name() {
    assert!(serde_json::from_value::<ModuleDescriptor>(json!({ "name": "" })).is_err());
}
