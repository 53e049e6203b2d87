use std::io::{Read, Seek};

use zip::ZipArchive;

use crate::{
    locator::{read_module_info, Archive, BoxError},
    ModuleDescriptor, Result,
};

impl<R: Read + Seek> Archive for ZipArchive<R> {
    fn entry_names(&self) -> Vec<String> {
        // Central directory order.
        self.file_names().map(str::to_owned).collect()
    }

    fn read_entry(&mut self, name: &str) -> std::result::Result<Vec<u8>, BoxError> {
        let mut file = self.by_name(name)?;
        // The declared size is untrusted; let the buffer grow with the data.
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        Ok(bytes)
    }
}

/// Decodes the module descriptor of a `.jar` or `.jmod`, or `None` if it has none.
pub fn read_module_info_from_zip<R: Read + Seek>(reader: R) -> Result<Option<ModuleDescriptor>> {
    let mut archive = ZipArchive::new(reader)?;
    read_module_info(&mut archive)
}
