use std::path::{Path, PathBuf};

use bindery_core::{Bundle, PlainFile, Rejection, RejectionReason, UploadInput};
use bindery_logging::{bindery_debug, bindery_info};
use bytes::Bytes;

use crate::archive::build_bundle;
use crate::walker::{DirectoryHandle, DirectoryWalker, FsDirectory};
use crate::BundleError;

/// Turn dropped paths into upload inputs: files pass through, folders are
/// walked and packaged into one bundle each. Order follows `paths`.
pub async fn prepare_inputs(
    paths: Vec<PathBuf>,
    batch_size: usize,
) -> (Vec<UploadInput>, Vec<Rejection>) {
    let mut inputs = Vec::with_capacity(paths.len());
    let mut rejected = Vec::new();

    for path in paths {
        let name = display_name(&path);
        match prepare_one(&path, &name, batch_size).await {
            Ok(input) => inputs.push(input),
            Err(reason) => {
                bindery_debug!("cannot upload {}: {reason:?}", path.display());
                rejected.push(Rejection { name, reason });
            }
        }
    }

    (inputs, rejected)
}

async fn prepare_one(
    path: &Path,
    name: &str,
    batch_size: usize,
) -> Result<UploadInput, RejectionReason> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|err| RejectionReason::Unreadable(err.to_string()))?;

    if !metadata.is_dir() {
        let content = tokio::fs::read(path)
            .await
            .map_err(|err| RejectionReason::Unreadable(err.to_string()))?;
        return Ok(UploadInput::PlainFile(PlainFile {
            name: name.to_string(),
            content: Bytes::from(content),
        }));
    }

    let root = FsDirectory::new(path.to_path_buf(), batch_size);
    bundle_directory(Box::new(root)).await.map(UploadInput::Bundle)
}

/// Walk a dropped folder and package it into one bundle.
///
/// A folder whose entries all failed to read is a build failure, not an empty folder.
pub async fn bundle_directory(
    root: Box<dyn DirectoryHandle>,
) -> Result<Bundle, RejectionReason> {
    let mut walker = DirectoryWalker::new(root);
    let root_name = walker.root_name().to_string();
    let mut files = Vec::new();
    while let Some(file) = walker.next().await {
        files.push(file);
    }
    let skipped = walker.skipped();
    bindery_info!("walked '{root_name}': {} file(s), {skipped} skipped", files.len());
    if files.is_empty() && skipped > 0 {
        return Err(RejectionReason::BuildFailed(format!(
            "no readable files ({skipped} skipped)"
        )));
    }

    let built = tokio::task::spawn_blocking(move || build_bundle(&root_name, files))
        .await
        .map_err(|err| RejectionReason::BuildFailed(err.to_string()))?;
    match built {
        Ok(bundle) => Ok(bundle),
        Err(BundleError::Empty) => Err(RejectionReason::EmptyDirectory),
        Err(BundleError::Build(message)) => Err(RejectionReason::BuildFailed(message)),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
