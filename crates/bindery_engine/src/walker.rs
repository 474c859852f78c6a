use std::collections::VecDeque;
use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use bindery_logging::{bindery_debug, bindery_warn};
use bytes::Bytes;

/// Number of directory entries an [`FsDirectory`] hands out per read.
pub const DEFAULT_BATCH_SIZE: usize = 64;

/// Leaf file of a dropped tree, addressed by its slash-joined path from the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub relative_path: String,
    pub content: Bytes,
}

/// Child of a directory as delivered by the host.
pub enum EntryHandle {
    File(Box<dyn FileHandle>),
    Directory(Box<dyn DirectoryHandle>),
}

/// Host directory that enumerates its children in batches.
///
/// An empty batch means the directory is drained. Handles are single-use.
#[async_trait]
pub trait DirectoryHandle: Send {
    fn name(&self) -> &str;
    async fn read_batch(&mut self) -> io::Result<Vec<EntryHandle>>;
}

#[async_trait]
pub trait FileHandle: Send {
    fn name(&self) -> &str;
    async fn read(self: Box<Self>) -> io::Result<Bytes>;
}

struct Frame {
    handle: Box<dyn DirectoryHandle>,
    prefix: String,
    pending: VecDeque<EntryHandle>,
    drained: bool,
}

impl Frame {
    fn new(handle: Box<dyn DirectoryHandle>, prefix: String) -> Self {
        Self {
            handle,
            prefix,
            pending: VecDeque::new(),
            drained: false,
        }
    }
}

/// Lazy depth-first walk over a dropped directory.
///
/// Each directory is drained with sequential batch reads. Subdirectories are
/// descended into before later siblings. Entries that fail to read are
/// skipped. The walker consumes the root handle and cannot be restarted.
pub struct DirectoryWalker {
    root_name: String,
    stack: Vec<Frame>,
    skipped: usize,
}

impl DirectoryWalker {
    pub fn new(root: Box<dyn DirectoryHandle>) -> Self {
        let root_name = root.name().to_string();
        Self {
            root_name,
            stack: vec![Frame::new(root, String::new())],
            skipped: 0,
        }
    }

    pub fn root_name(&self) -> &str {
        &self.root_name
    }

    /// Entries skipped so far because they could not be read.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Next file in depth-first order, or `None` once the tree is exhausted.
    pub async fn next(&mut self) -> Option<FileEntry> {
        loop {
            let frame = self.stack.last_mut()?;

            if frame.pending.is_empty() && !frame.drained {
                match frame.handle.read_batch().await {
                    Ok(batch) if batch.is_empty() => frame.drained = true,
                    Ok(batch) => frame.pending.extend(batch),
                    Err(err) => {
                        bindery_warn!(
                            "stopped reading directory '{}': {err}",
                            display_path(&frame.prefix)
                        );
                        self.skipped += 1;
                        frame.drained = true;
                    }
                }
                continue;
            }

            let Some(entry) = frame.pending.pop_front() else {
                self.stack.pop();
                continue;
            };
            let prefix = frame.prefix.clone();

            match entry {
                EntryHandle::Directory(dir) => {
                    let prefix = format!("{prefix}{}/", dir.name());
                    bindery_debug!("descending into '{prefix}'");
                    self.stack.push(Frame::new(dir, prefix));
                }
                EntryHandle::File(file) => {
                    let relative_path = format!("{prefix}{}", file.name());
                    match file.read().await {
                        Ok(content) => {
                            return Some(FileEntry {
                                relative_path,
                                content,
                            })
                        }
                        Err(err) => {
                            bindery_warn!("skipping unreadable file '{relative_path}': {err}");
                            self.skipped += 1;
                        }
                    }
                }
            }
        }
    }

    /// Drain the walk into a flat list.
    pub async fn collect(mut self) -> Vec<FileEntry> {
        let mut files = Vec::new();
        while let Some(file) = self.next().await {
            files.push(file);
        }
        files
    }
}

fn display_path(prefix: &str) -> &str {
    if prefix.is_empty() {
        "."
    } else {
        prefix.trim_end_matches('/')
    }
}

/// Local directory exposed through the batched host interface.
pub struct FsDirectory {
    name: String,
    path: PathBuf,
    reader: Option<tokio::fs::ReadDir>,
    batch_size: usize,
}

impl FsDirectory {
    pub fn new(path: PathBuf, batch_size: usize) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            name,
            path,
            reader: None,
            batch_size: batch_size.max(1),
        }
    }
}

#[async_trait]
impl DirectoryHandle for FsDirectory {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read_batch(&mut self) -> io::Result<Vec<EntryHandle>> {
        if self.reader.is_none() {
            self.reader = Some(tokio::fs::read_dir(&self.path).await?);
        }
        let Some(reader) = self.reader.as_mut() else {
            return Ok(Vec::new());
        };

        let mut batch = Vec::new();
        while batch.len() < self.batch_size {
            let Some(entry) = reader.next_entry().await? else {
                break;
            };
            let path = entry.path();
            let file_type = match entry.file_type().await {
                Ok(file_type) => file_type,
                Err(err) => {
                    bindery_warn!("skipping {}: {err}", path.display());
                    continue;
                }
            };
            if file_type.is_symlink() {
                // Linked files are read through; linked directories could loop back.
                match tokio::fs::metadata(&path).await {
                    Ok(target) if target.is_file() => {
                        batch.push(EntryHandle::File(Box::new(FsFile::new(path))));
                    }
                    Ok(_) => bindery_debug!("not following linked directory {}", path.display()),
                    Err(err) => bindery_warn!("skipping {}: {err}", path.display()),
                }
                continue;
            }
            if file_type.is_dir() {
                batch.push(EntryHandle::Directory(Box::new(FsDirectory::new(
                    path,
                    self.batch_size,
                ))));
            } else if file_type.is_file() {
                batch.push(EntryHandle::File(Box::new(FsFile::new(path))));
            }
        }
        Ok(batch)
    }
}

pub struct FsFile {
    name: String,
    path: PathBuf,
}

impl FsFile {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { name, path }
    }
}

#[async_trait]
impl FileHandle for FsFile {
    fn name(&self) -> &str {
        &self.name
    }

    async fn read(self: Box<Self>) -> io::Result<Bytes> {
        tokio::fs::read(&self.path).await.map(Bytes::from)
    }
}
