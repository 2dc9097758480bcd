//! ZIP packaging of export artifacts

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::Result;

use super::ExportArtifact;

/// Pack every artifact member into a deflate-compressed ZIP, in artifact order
pub fn pack(artifact: &ExportArtifact) -> Result<Vec<u8>> {
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

    for (name, document) in artifact.iter() {
        writer.start_file(name.as_str(), options)?;
        writer.write_all(document.as_bytes())?;
    }

    Ok(writer.finish()?.into_inner())
}
