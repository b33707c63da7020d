//! A minimal byte-addressed file layer over mounted virtual drives.
//!
//! Each file keeps a ledger of logical addresses, one per content byte. Rewriting a
//! file reuses the ledger's addresses in place and allocates first-fit past its end.
//! Shrinking a file leaves its trailing addresses allocated.

pub mod mount;

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use sha2::{Digest, Sha256};
use tracing::debug;

pub use mount::MountTable;
use mount::mount_key;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub size: u64,
    pub checksum: [u8; 32],
}

#[derive(Debug, Clone)]
struct FileRecord {
    mount_point: String,
    ledger: Vec<usize>,
    size: usize,
    checksum: [u8; 32],
}

impl FileRecord {
    fn metadata(&self) -> FileMetadata {
        FileMetadata {
            size: self.size as u64,
            checksum: self.checksum,
        }
    }
}

#[derive(Default)]
pub struct ByteFs {
    mounts: MountTable,
    files: HashMap<String, FileRecord>,
}

impl ByteFs {
    #[must_use]
    pub fn new(mounts: MountTable) -> Self {
        Self {
            mounts,
            files: HashMap::new(),
        }
    }

    #[must_use]
    pub const fn mounts(&self) -> &MountTable {
        &self.mounts
    }

    pub const fn mounts_mut(&mut self) -> &mut MountTable {
        &mut self.mounts
    }

    /// Replace the file's content with `data`.
    ///
    /// # Errors
    /// Fails if no drive serves the path or the drive rejects a write. Bytes written
    /// before the failure stay in the ledger.
    pub fn write_file(&mut self, path: &Path, data: &[u8]) -> Result<FileMetadata> {
        let key = file_key(path)?;
        self.write_from(&key, 0, data)?;

        let record = self.record_mut(&key)?;
        record.size = data.len();
        record.checksum = compute_checksum(data);
        Ok(record.metadata())
    }

    /// Append `data` after the file's current content, creating the file if needed.
    ///
    /// # Errors
    /// See [`ByteFs::write_file`].
    pub fn append(&mut self, path: &Path, data: &[u8]) -> Result<FileMetadata> {
        let key = file_key(path)?;
        let start = self.files.get(&key).map_or(0, |r| r.size);
        self.write_from(&key, start, data)?;

        self.record_mut(&key)?.size = start + data.len();
        let content = self.read_file(path)?;
        let record = self.record_mut(&key)?;
        record.checksum = compute_checksum(&content);
        Ok(record.metadata())
    }

    /// Append `line` followed by a newline.
    ///
    /// # Errors
    /// See [`ByteFs::write_file`].
    pub fn append_line(&mut self, path: &Path, line: &str) -> Result<FileMetadata> {
        let mut data = Vec::with_capacity(line.len() + 1);
        data.extend_from_slice(line.as_bytes());
        data.push(b'\n');
        self.append(path, &data)
    }

    /// # Errors
    /// Fails if the file does not exist or a byte cannot be read back.
    pub fn read_file(&self, path: &Path) -> Result<Vec<u8>> {
        let key = file_key(path)?;
        let record = self.record(&key)?;
        let drive = self
            .mounts
            .drive(&record.mount_point)
            .ok_or_else(|| anyhow!("{} is no longer mounted", record.mount_point))?;

        let addresses = &record.ledger[..record.size];
        let cells = drive
            .read_many(addresses)
            .with_context(|| format!("reading {key}"))?;
        cells
            .into_iter()
            .zip(addresses)
            .enumerate()
            .map(|(i, (cell, addr))| {
                cell.ok_or_else(|| anyhow!("{key}: byte {i} at address {addr} is unwritten"))
            })
            .collect()
    }

    /// The file's content as text lines.
    ///
    /// # Errors
    /// Fails if the file cannot be read or is not UTF-8.
    pub fn lines(&self, path: &Path) -> Result<Vec<String>> {
        let content = String::from_utf8(self.read_file(path)?)
            .with_context(|| format!("{} is not valid UTF-8", path.display()))?;
        Ok(content.lines().map(str::to_owned).collect())
    }

    /// # Errors
    /// Fails if the file does not exist.
    pub fn metadata(&self, path: &Path) -> Result<FileMetadata> {
        Ok(self.record(&file_key(path)?)?.metadata())
    }

    /// Logical addresses holding the file, including any left over from a shrink.
    ///
    /// # Errors
    /// Fails if the file does not exist.
    pub fn ledger(&self, path: &Path) -> Result<&[usize]> {
        Ok(&self.record(&file_key(path)?)?.ledger)
    }

    /// Re-read the file and compare it with the checksum recorded at write time.
    ///
    /// # Errors
    /// Fails if the file cannot be read.
    pub fn verify(&self, path: &Path) -> Result<bool> {
        let record = self.record(&file_key(path)?)?;
        Ok(record.checksum == compute_checksum(&self.read_file(path)?))
    }

    #[must_use]
    pub fn exists(&self, path: &Path) -> bool {
        file_key(path).is_ok_and(|k| self.files.contains_key(&k))
    }

    /// Every known file path, sorted.
    #[must_use]
    pub fn list_files(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.files.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn write_from(&mut self, key: &str, start: usize, data: &[u8]) -> Result<()> {
        if !self.files.contains_key(key) {
            let mount_point = self.mounts.resolve(Path::new(key))?;
            self.files.insert(
                key.to_string(),
                FileRecord {
                    mount_point,
                    ledger: Vec::new(),
                    size: 0,
                    checksum: compute_checksum(&[]),
                },
            );
        }

        let Self { mounts, files } = self;
        let record = files
            .get_mut(key)
            .ok_or_else(|| anyhow!("{key} not found"))?;
        let drive = mounts
            .drive_mut(&record.mount_point)
            .ok_or_else(|| anyhow!("{} is no longer mounted", record.mount_point))?;

        for (i, &byte) in data.iter().enumerate() {
            let index = start + i;
            let reuse = record.ledger.get(index).copied();
            let address = drive
                .write(byte, reuse)
                .with_context(|| format!("writing byte {index} of {key}"))?;
            if reuse.is_none() {
                record.ledger.push(address);
            }
        }
        debug!(
            file = key,
            bytes = data.len(),
            ledger = record.ledger.len(),
            "file bytes written"
        );
        Ok(())
    }

    fn record(&self, key: &str) -> Result<&FileRecord> {
        self.files
            .get(key)
            .ok_or_else(|| anyhow!("{key} not found"))
    }

    fn record_mut(&mut self, key: &str) -> Result<&mut FileRecord> {
        self.files
            .get_mut(key)
            .ok_or_else(|| anyhow!("{key} not found"))
    }
}

fn file_key(path: &Path) -> Result<String> {
    let components = normalize_components(path)?;
    if components.is_empty() {
        bail!("path is empty");
    }
    Ok(mount_key(&components))
}

pub(crate) fn normalize_components(path: &Path) -> Result<Vec<String>> {
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::RootDir | Component::CurDir => {}
            Component::ParentDir => bail!("parent directory references are not supported"),
            Component::Normal(name) => components.push(name_to_string(name)?),
            Component::Prefix(prefix) => {
                let path: PathBuf = prefix.as_os_str().into();
                components.push(path.to_string_lossy().to_string());
            }
        }
    }
    Ok(components)
}

fn name_to_string(name: &std::ffi::OsStr) -> Result<String> {
    name.to_str()
        .map(ToString::to_string)
        .ok_or_else(|| anyhow!("non utf-8 path component"))
}

fn compute_checksum(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}
