// Copyright 2024 Kevin Ludwig
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    fs::{File, OpenOptions},
    os::unix::{fs::FileExt, io::AsRawFd},
    path::Path,
};

use log::warn;
use os8_ds::{DataStorage, Error, Result};

/// A host image file opened for block I/O, holding an advisory exclusive
/// non-blocking lock for the lifetime of the value.
///
/// `base_offset` lets one open `File` back two independent filesystems
/// packed into the same image (RK05 filesystem B starts at a fixed byte
/// offset from filesystem A) without either caller needing to special-case
/// the other.
pub struct FileStorage {
    file: File,
    base_offset: u64,
}

impl FileStorage {
    /// Opens `path` read/write and takes the advisory lock described in the
    /// design's concurrency model. Fails fast if another process already
    /// holds the lock.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, OpenOptions::new().read(true).write(true))
    }

    pub fn create_new(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, OpenOptions::new().read(true).write(true).create_new(true))
    }

    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, OpenOptions::new().read(true))
    }

    fn open_with(path: impl AsRef<Path>, options: &mut OpenOptions) -> Result<Self> {
        let file = options.open(path)?;
        lock_exclusive(&file)?;
        Ok(Self {
            file,
            base_offset: 0,
        })
    }

    /// Returns a view of the same underlying file whose offsets are all
    /// shifted by `base_offset` bytes, used for RK05 filesystem B.
    pub fn with_base_offset(&self, base_offset: u64) -> FileStorageView<'_> {
        FileStorageView {
            storage: self,
            base_offset: self.base_offset + base_offset,
        }
    }

    pub fn len(&self) -> Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    pub fn set_len(&self, size: u64) -> Result<()> {
        self.file.set_len(size).map_err(Error::Io)
    }
}

impl DataStorage for FileStorage {
    fn read(&self, offset: u64, buffer: &mut [u8]) -> Result<()> {
        self.file
            .read_exact_at(buffer, self.base_offset + offset)
            .map_err(Error::Io)
    }

    fn write(&self, offset: u64, buffer: &[u8]) -> Result<()> {
        self.file
            .write_all_at(buffer, self.base_offset + offset)
            .map_err(Error::Io)
    }
}

/// A borrowed, offset-shifted handle onto a [`FileStorage`]. Does not own
/// the lock; the backing `FileStorage` must outlive it.
pub struct FileStorageView<'a> {
    storage: &'a FileStorage,
    base_offset: u64,
}

impl DataStorage for FileStorageView<'_> {
    fn read(&self, offset: u64, buffer: &mut [u8]) -> Result<()> {
        self.storage.read(self.base_offset + offset, buffer)
    }

    fn write(&self, offset: u64, buffer: &[u8]) -> Result<()> {
        self.storage.write(self.base_offset + offset, buffer)
    }
}

fn lock_exclusive(file: &File) -> Result<()> {
    let result = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if result != 0 {
        let error = std::io::Error::last_os_error();
        warn!("failed to acquire advisory lock: {error}");
        return Err(Error::Io(error));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_write_round_trips() {
        let dir = tempfile_dir();
        let path = dir.join("image.dat");
        std::fs::write(&path, vec![0u8; 16]).unwrap();

        let storage = FileStorage::open(&path).unwrap();
        storage.write(4, &[1, 2, 3, 4]).unwrap();

        let mut buffer = [0u8; 4];
        storage.read(4, &mut buffer).unwrap();
        assert_eq!(buffer, [1, 2, 3, 4]);
    }

    #[test]
    fn second_open_is_rejected_while_locked() {
        let dir = tempfile_dir();
        let path = dir.join("image.dat");
        std::fs::write(&path, vec![0u8; 16]).unwrap();

        let _first = FileStorage::open(&path).unwrap();
        assert!(FileStorage::open(&path).is_err());
    }

    #[test]
    fn base_offset_view_shifts_reads_and_writes() {
        let dir = tempfile_dir();
        let path = dir.join("image.dat");
        std::fs::write(&path, vec![0u8; 16]).unwrap();

        let storage = FileStorage::open(&path).unwrap();
        let view = storage.with_base_offset(8);
        view.write(0, &[9, 9]).unwrap();

        let mut buffer = [0u8; 2];
        storage.read(8, &mut buffer).unwrap();
        assert_eq!(buffer, [9, 9]);
    }

    fn tempfile_dir() -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("os8_ds_std_test_{:x}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
