use std::fmt;

use bytes::Bytes;

/// File extension the conversion service accepts, without the dot.
pub const EPUB_EXTENSION: &str = "epub";
/// Content type declared for packaged directory bundles.
pub const EPUB_MIME_TYPE: &str = "application/epub+zip";

/// A file picked or dropped by the user, uploaded as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainFile {
    pub name: String,
    pub content: Bytes,
}

/// Single in-memory archive built from a dropped directory.
///
/// Once handed to the transport it is never mutated again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bundle {
    pub filename: String,
    pub mime_type: String,
    pub payload: Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadInput {
    PlainFile(PlainFile),
    Bundle(Bundle),
}

impl UploadInput {
    pub fn filename(&self) -> &str {
        match self {
            UploadInput::PlainFile(file) => &file.name,
            UploadInput::Bundle(bundle) => &bundle.filename,
        }
    }

    pub fn payload(&self) -> &Bytes {
        match self {
            UploadInput::PlainFile(file) => &file.content,
            UploadInput::Bundle(bundle) => &bundle.payload,
        }
    }

    pub fn mime_type(&self) -> &str {
        match self {
            UploadInput::PlainFile(_) => EPUB_MIME_TYPE,
            UploadInput::Bundle(bundle) => &bundle.mime_type,
        }
    }
}

/// Local upload policy: only `.epub` names, compared case-insensitively.
pub fn has_accepted_extension(name: &str) -> bool {
    name.rsplit_once('.')
        .is_some_and(|(_, ext)| ext.eq_ignore_ascii_case(EPUB_EXTENSION))
}

/// An input refused before any network call was made.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub name: String,
    pub reason: RejectionReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    WrongExtension,
    EmptyDirectory,
    /// Packaging the directory failed; the user has to pick the file manually.
    BuildFailed(String),
    Unreadable(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            RejectionReason::WrongExtension => {
                write!(f, "{}: only .{EPUB_EXTENSION} files are supported", self.name)
            }
            RejectionReason::EmptyDirectory => {
                write!(f, "{}: folder contains no files", self.name)
            }
            RejectionReason::BuildFailed(message) => write!(
                f,
                "{}: could not package folder ({message}); please choose the .{EPUB_EXTENSION} file manually",
                self.name
            ),
            RejectionReason::Unreadable(message) => {
                write!(f, "{}: could not read file ({message})", self.name)
            }
        }
    }
}
