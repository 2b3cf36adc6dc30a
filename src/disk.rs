//! Block devices backed by memory and by a disk image on the host file system.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use crate::block_dev::{Block, BlockDevice};
use crate::config::BLOCK_SIZE;
use crate::error::{FsError, Result};

pub struct RamDisk {
    inner: Mutex<Vec<u8>>,
    num_blocks: usize,
}

impl RamDisk {
    /// Creates a new zero-filled RamDisk with the specified number of blocks.
    pub fn new(num_blocks: usize) -> Self {
        RamDisk {
            inner: Mutex::new(vec![0u8; num_blocks * BLOCK_SIZE]),
            num_blocks,
        }
    }
}

impl BlockDevice for RamDisk {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, block_id: usize, buf: &mut Block) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(FsError::InvalidBlockId(block_id as u32));
        }
        let start = block_id * BLOCK_SIZE;
        let data = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        buf.copy_from_slice(&data[start..start + BLOCK_SIZE]);
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &Block) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(FsError::InvalidBlockId(block_id as u32));
        }
        let start = block_id * BLOCK_SIZE;
        let mut data = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        data[start..start + BLOCK_SIZE].copy_from_slice(buf);
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        // Nothing to do, data is already in memory.
        Ok(())
    }
}

/// A disk image file, one block after another.
pub struct FileDisk {
    inner: Mutex<File>,
    num_blocks: usize,
}

impl FileDisk {
    /// Creates (or truncates) an image of `num_blocks` zeroed blocks at `path`.
    pub fn create(path: impl AsRef<Path>, num_blocks: usize) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        file.set_len((num_blocks * BLOCK_SIZE) as u64)?;
        Ok(FileDisk {
            inner: Mutex::new(file),
            num_blocks,
        })
    }

    /// Opens an existing image. Trailing bytes short of a whole block are ignored.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;
        let num_blocks = (file.metadata()?.len() / BLOCK_SIZE as u64) as usize;
        Ok(FileDisk {
            inner: Mutex::new(file),
            num_blocks,
        })
    }
}

impl BlockDevice for FileDisk {
    fn num_blocks(&self) -> usize {
        self.num_blocks
    }

    fn read_block(&self, block_id: usize, buf: &mut Block) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(FsError::InvalidBlockId(block_id as u32));
        }
        let mut file = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn write_block(&self, block_id: usize, buf: &Block) -> Result<()> {
        if block_id >= self.num_blocks {
            return Err(FsError::InvalidBlockId(block_id as u32));
        }
        let mut file = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        file.seek(SeekFrom::Start((block_id * BLOCK_SIZE) as u64))?;
        file.write_all(buf)?;
        Ok(())
    }

    fn flush(&self) -> Result<()> {
        let mut file = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        file.flush()?;
        file.sync_all()?;
        Ok(())
    }
}
