use std::path::Path;

use log::{debug, info};

use crate::block_dev::{BlockDevice, BlockNum, BlockStore};
use crate::config::*;
use crate::directory::{self, Listing};
use crate::disk::FileDisk;
use crate::error::{FsError, Result};
use crate::file::{self, Stat};
use crate::inode::{get_node, write_dir};
use crate::structs::{DirNode, Record};
use crate::volume::Volume;

/// A mounted file system together with one session on it.
///
/// Names passed to the operations are single components, resolved against
/// the session's current directory.
#[derive(Debug)]
pub struct FileSystem<S: BlockStore> {
    store: S,
    cwd: BlockNum,
}

impl<D: BlockDevice> FileSystem<Volume<D>> {
    /// Formats `device` and creates an empty root directory on it.
    pub fn format(device: D) -> Result<Self> {
        let mut volume = Volume::format(device)?;
        match volume.allocate()? {
            Some(ROOT_BLOCK) => {}
            Some(_) => return Err(FsError::Corrupt("root block already in use")),
            None => return Err(FsError::DiskFull),
        }
        write_dir(&mut volume, ROOT_BLOCK, DirNode::default())?;
        Self::with_store(volume)
    }

    pub fn mount(device: D) -> Result<Self> {
        Self::with_store(Volume::mount(device)?)
    }

    /// Ends the session and hands the device back.
    pub fn unmount(self) -> Result<D> {
        self.store.unmount()
    }
}

impl FileSystem<Volume<FileDisk>> {
    /// Mounts the disk image at `path`. A missing image is created with
    /// `DEFAULT_NUM_BLOCKS` blocks and formatted.
    pub fn mount_image(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            info!("mounting image {}", path.display());
            Self::mount(FileDisk::open(path)?)
        } else {
            info!("creating image {}", path.display());
            Self::format(FileDisk::create(path, DEFAULT_NUM_BLOCKS)?)
        }
    }
}

impl<S: BlockStore> FileSystem<S> {
    /// Starts a session on a store that already holds a root directory.
    pub fn with_store(store: S) -> Result<Self> {
        match get_node(&store, ROOT_BLOCK)? {
            Record::Directory(_) => Ok(Self { store, cwd: ROOT_BLOCK }),
            Record::File(_) => Err(FsError::Corrupt("root block is not a directory")),
        }
    }

    /// Ends the session and hands the store back.
    pub fn into_store(mut self) -> Result<S> {
        self.store.sync()?;
        Ok(self.store)
    }

    pub fn mkdir(&mut self, name: &str) -> Result<()> {
        debug!("mkdir {}", name);
        directory::mkdir(&mut self.store, self.cwd, name)?;
        Ok(())
    }

    /// Enters subdirectory `name`, or goes back to the root for `None`.
    pub fn chdir(&mut self, name: Option<&str>) -> Result<()> {
        self.cwd = match name {
            None => ROOT_BLOCK,
            Some(name) => directory::resolve_subdirectory(&self.store, self.cwd, name)?,
        };
        debug!("chdir {:?} -> block {}", name, self.cwd);
        Ok(())
    }

    pub fn ls(&self) -> Result<Listing> {
        directory::read_dir(&self.store, self.cwd)
    }

    pub fn rmdir(&mut self, name: &str) -> Result<()> {
        debug!("rmdir {}", name);
        directory::rmdir(&mut self.store, self.cwd, name)
    }

    pub fn creat(&mut self, name: &str) -> Result<()> {
        debug!("creat {}", name);
        file::creat(&mut self.store, self.cwd, name)?;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<()> {
        debug!("remove {}", name);
        file::remove(&mut self.store, self.cwd, name)
    }

    pub fn stat(&self, name: &str) -> Result<Stat> {
        file::stat(&self.store, self.cwd, name)
    }

    /// Appends `data` to file `name`.
    pub fn write(&mut self, name: &str, data: &[u8]) -> Result<()> {
        debug!("write {} bytes to {}", data.len(), name);
        file::append(&mut self.store, self.cwd, name, data)
    }

    /// Reads file `name` from the start into `buf`. Returns the bytes read,
    /// which is less than `buf.len()` when the file is shorter.
    pub fn read(&self, name: &str, buf: &mut [u8]) -> Result<usize> {
        file::read(&self.store, self.cwd, name, buf)
    }

    pub fn cwd(&self) -> BlockNum {
        self.cwd
    }

    pub fn root(&self) -> BlockNum {
        ROOT_BLOCK
    }

    pub fn free_blocks(&self) -> usize {
        self.store.free_blocks()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Renders the whole tree, starting at the root.
    pub fn dump(&self) -> Result<String> {
        let mut out = format!("/ [{}] {} blocks free\n", ROOT_BLOCK, self.free_blocks());
        directory::dump_tree(&self.store, ROOT_BLOCK, 1, &mut out)?;
        Ok(out)
    }
}
