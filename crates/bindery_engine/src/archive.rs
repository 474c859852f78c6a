use std::io::{Cursor, Write};

use bindery_core::{Bundle, EPUB_MIME_TYPE};
use bindery_logging::bindery_debug;
use bytes::Bytes;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::filename::bundle_filename;
use crate::{BundleError, FileEntry};

/// Root entry that must lead an EPUB container, stored uncompressed.
const MIMETYPE_ENTRY: &str = "mimetype";

/// Package every walked file of one dropped root into a single EPUB bundle.
///
/// Paths are inserted verbatim. A root-level `mimetype` file goes first and
/// is stored; everything else is deflated.
pub fn build_bundle(root_name: &str, mut files: Vec<FileEntry>) -> Result<Bundle, BundleError> {
    if files.is_empty() {
        return Err(BundleError::Empty);
    }

    if let Some(pos) = files
        .iter()
        .position(|file| file.relative_path == MIMETYPE_ENTRY)
    {
        let mimetype = files.remove(pos);
        files.insert(0, mimetype);
    }

    let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
    let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for file in &files {
        let options = if file.relative_path == MIMETYPE_ENTRY {
            stored
        } else {
            deflated
        };
        writer
            .start_file(file.relative_path.as_str(), options)
            .map_err(|err| BundleError::Build(err.to_string()))?;
        writer
            .write_all(&file.content)
            .map_err(|err| BundleError::Build(err.to_string()))?;
    }
    let payload = writer
        .finish()
        .map_err(|err| BundleError::Build(err.to_string()))?
        .into_inner();

    let filename = bundle_filename(root_name);
    bindery_debug!(
        "bundled {} file(s) from '{root_name}' into {filename} ({} bytes)",
        files.len(),
        payload.len()
    );
    Ok(Bundle {
        filename,
        mime_type: EPUB_MIME_TYPE.to_string(),
        payload: Bytes::from(payload),
    })
}
