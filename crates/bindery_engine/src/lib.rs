//! Bindery engine: directory walking, bundling, the HTTP client and effect execution.
mod archive;
mod client;
mod engine;
mod filename;
mod ingest;
mod persist;
mod types;
mod walker;

pub use archive::build_bundle;
pub use client::{ClientSettings, JobApi, ReqwestJobApi, DEFAULT_SERVER_URL};
pub use engine::{EngineHandle, EngineOptions};
pub use filename::bundle_filename;
pub use ingest::{bundle_directory, prepare_inputs};
pub use persist::{ensure_state_dir, AtomicFileWriter, PersistError};
pub use types::{ApiError, BundleError, EngineEvent, FailureKind};
pub use walker::{
    DirectoryHandle, DirectoryWalker, EntryHandle, FileEntry, FileHandle, FsDirectory, FsFile,
    DEFAULT_BATCH_SIZE,
};
