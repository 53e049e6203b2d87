use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::{scanner, ModuleDescriptor, ModuleInfoError, Result};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// The two places a container may hold a `module-info.class`. Either may sit
/// under a `classes/` directory, as in a jmod.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// `module-info.class`
    Root,
    /// `META-INF/versions/<n>/module-info.class`
    Versioned(u32),
}

pub fn classify(name: &str) -> Option<EntryKind> {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^(?:classes/)?(?:META-INF/versions/([0-9]+)/)?module-info\.class$")
            .expect("module-info entry pattern is valid")
    });

    let captures = pattern.captures(name)?;
    Some(match captures.get(1) {
        Some(version) => EntryKind::Versioned(version.as_str().parse().unwrap_or(u32::MAX)),
        None => EntryKind::Root,
    })
}

/// Tracks which entry of a container, seen in the container's own order,
/// holds the applicable module descriptor.
///
/// A root entry always takes the selection. A versioned entry takes it only
/// while no root entry has been seen, so among several versioned entries the
/// last one before any root wins, regardless of version number.
#[derive(Debug, Default)]
pub struct EntryLocator {
    found_root: bool,
}
impl EntryLocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `name` becomes the selected entry.
    pub fn offer(&mut self, name: &str) -> bool {
        match classify(name) {
            Some(EntryKind::Root) => {
                self.found_root = true;
                true
            }
            Some(EntryKind::Versioned(_)) => !self.found_root,
            None => false,
        }
    }
}

/// Picks the descriptor entry out of a sequence of entry names.
pub fn select_entry<'a>(names: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut locator = EntryLocator::new();
    names.into_iter().fold(None, |selected, name| {
        if locator.offer(name) {
            Some(name)
        } else {
            selected
        }
    })
}

/// A container whose entries can be listed and then read by name.
pub trait Archive {
    /// Entry names in the container's native order.
    fn entry_names(&self) -> Vec<String>;

    fn read_entry(&mut self, name: &str) -> std::result::Result<Vec<u8>, BoxError>;
}

/// Decodes the module descriptor of an archive, or `None` if it has none.
pub fn read_module_info<A: Archive + ?Sized>(archive: &mut A) -> Result<Option<ModuleDescriptor>> {
    let names = archive.entry_names();
    let Some(name) = select_entry(names.iter().map(String::as_str)) else {
        return Ok(None);
    };
    debug!("Reading module descriptor from {}", name);

    let bytes = archive
        .read_entry(name)
        .map_err(|source| ModuleInfoError::ArchiveEntryUnreadable {
            name: name.to_owned(),
            source,
        })?;
    scanner::decode(&bytes).map(Some)
}

/// Decodes the module descriptor out of `(name, bytes provider)` pairs, calling
/// only the selected entry's provider.
pub fn read_module_info_from_entries<I, N, F>(entries: I) -> Result<Option<ModuleDescriptor>>
where
    I: IntoIterator<Item = (N, F)>,
    N: AsRef<str>,
    F: FnOnce() -> std::result::Result<Vec<u8>, BoxError>,
{
    let mut locator = EntryLocator::new();
    let mut selected = None;
    for (name, read) in entries {
        if locator.offer(name.as_ref()) {
            debug!("Module descriptor candidate {}", name.as_ref());
            selected = Some((name, read));
        }
    }

    let Some((name, read)) = selected else {
        return Ok(None);
    };
    let bytes = read().map_err(|source| ModuleInfoError::ArchiveEntryUnreadable {
        name: name.as_ref().to_owned(),
        source,
    })?;
    scanner::decode(&bytes).map(Some)
}

#[cfg(test)]
mod locator_tests {
    use super::*;

    #[test]
    fn it_should_classify_entry_names() {
        assert_eq!(classify("module-info.class"), Some(EntryKind::Root));
        assert_eq!(classify("classes/module-info.class"), Some(EntryKind::Root));
        assert_eq!(
            classify("META-INF/versions/11/module-info.class"),
            Some(EntryKind::Versioned(11))
        );
        assert_eq!(
            classify("classes/META-INF/versions/9/module-info.class"),
            Some(EntryKind::Versioned(9))
        );
    }

    #[test]
    fn it_should_not_classify_lookalikes() {
        assert_eq!(classify("Module-Info.class"), None);
        assert_eq!(classify("module-infoXclass"), None);
        assert_eq!(classify("lib/module-info.class"), None);
        assert_eq!(classify("META-INF/versions/nine/module-info.class"), None);
        assert_eq!(classify("META-INF/versions//module-info.class"), None);
        assert_eq!(classify("classes/classes/module-info.class"), None);
    }

    #[test]
    fn it_should_prefer_a_root_entry_seen_after_a_versioned_one() {
        assert_eq!(
            select_entry(["META-INF/versions/9/module-info.class", "module-info.class"]),
            Some("module-info.class")
        );
    }

    #[test]
    fn it_should_keep_a_root_entry_over_later_versioned_ones() {
        assert_eq!(
            select_entry(["module-info.class", "META-INF/versions/9/module-info.class"]),
            Some("module-info.class")
        );
    }

    #[test]
    fn it_should_fall_back_to_a_versioned_entry() {
        assert_eq!(
            select_entry(["META-INF/versions/9/module-info.class"]),
            Some("META-INF/versions/9/module-info.class")
        );
    }

    #[test]
    fn it_should_take_the_last_versioned_entry_regardless_of_version() {
        assert_eq!(
            select_entry([
                "META-INF/versions/17/module-info.class",
                "META-INF/versions/9/module-info.class",
            ]),
            Some("META-INF/versions/9/module-info.class")
        );
    }

    #[test]
    fn it_should_select_nothing_without_candidates() {
        assert_eq!(select_entry(["META-INF/MANIFEST.MF", "a/B.class"]), None);
    }

    #[test]
    fn it_should_only_read_the_selected_entry() {
        let unreadable =
            || -> std::result::Result<Vec<u8>, BoxError> { Err("must not be read".into()) };
        let bytes = crate::encode(&ModuleDescriptor::new("org.example").unwrap()).unwrap();

        let entries: Vec<(&str, Box<dyn FnOnce() -> std::result::Result<Vec<u8>, BoxError>>)> = vec![
            ("META-INF/versions/9/module-info.class", Box::new(unreadable)),
            ("module-info.class", Box::new(move || Ok(bytes))),
            ("org/example/Main.class", Box::new(unreadable)),
        ];

        let descriptor = read_module_info_from_entries(entries).unwrap().unwrap();
        assert_eq!(descriptor.name().as_str(), "org.example");
    }

    #[test]
    fn it_should_report_an_unreadable_entry() {
        let entries = [("module-info.class", || -> std::result::Result<Vec<u8>, BoxError> {
            Err("disk on fire".into())
        })];

        assert!(matches!(
            read_module_info_from_entries(entries),
            Err(ModuleInfoError::ArchiveEntryUnreadable { name, .. }) if name == "module-info.class"
        ));
    }
}
