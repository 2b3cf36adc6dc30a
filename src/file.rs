//! Files: creation, removal, stat, appending and reading.

use log::{debug, warn};

use crate::block_dev::{BlockNum, BlockStore};
use crate::config::*;
use crate::directory::{dir_add_entry, dir_rm_entry, find_entry, lookup};
use crate::error::{FsError, Result};
use crate::inode::{get_inode, get_node, release_all, tail_offset, update_dir, write_inode};
use crate::structs::*;

/// What `stat` reports about an entry. `size` and `data_blocks` are 0 for
/// directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stat {
    pub name: String,
    pub block: BlockNum,
    pub kind: NodeKind,
    pub size: usize,
    pub data_blocks: usize,
}

impl Stat {
    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// Creates an empty file `name` in the parent directory.
/// Returns the block of the new inode.
pub fn creat(store: &mut impl BlockStore, parent_id: BlockNum, name: &str) -> Result<BlockNum> {
    dir_add_entry(store, parent_id, name, &Record::File(Inode::default()))
}

/// Unlinks file `name` and releases its data blocks, then its inode.
pub fn remove(store: &mut impl BlockStore, parent_id: BlockNum, name: &str) -> Result<()> {
    let (child, inode) = update_dir(store, parent_id, |store, parent| {
        let (index, entry) = find_entry(parent, name)?;
        let child = entry.child;
        let inode = get_inode(store, child, name)?;
        dir_rm_entry(parent, index);
        Ok((child, inode))
    })?;

    for &block in &inode.data_blocks {
        store.release(block)?;
    }
    store.release(child)?;

    debug!(
        "removed file {} (block {}, {} data blocks) from block {}",
        name,
        child,
        inode.data_blocks.len(),
        parent_id
    );
    Ok(())
}

pub fn stat(store: &impl BlockStore, dir_id: BlockNum, name: &str) -> Result<Stat> {
    let block = lookup(store, dir_id, name)?;
    let stat = match get_node(store, block)? {
        Record::Directory(_) => Stat {
            name: name.to_string(),
            block,
            kind: NodeKind::Directory,
            size: 0,
            data_blocks: 0,
        },
        Record::File(inode) => Stat {
            name: name.to_string(),
            block,
            kind: NodeKind::File,
            size: inode.size as usize,
            data_blocks: blocks_for(inode.size as usize),
        },
    };
    Ok(stat)
}

/// Allocates `count` blocks. If the store runs dry (or fails) part way, the
/// blocks taken so far are released again and the allocation error returned.
pub fn alloc_blocks(store: &mut impl BlockStore, count: usize) -> Result<Vec<BlockNum>> {
    let mut fresh = Vec::with_capacity(count);
    for _ in 0..count {
        let err = match store.allocate() {
            Ok(Some(block)) => {
                fresh.push(block);
                continue;
            }
            Ok(None) => FsError::DiskFull,
            Err(e) => e,
        };

        warn!("allocation failed after {} of {} blocks, rolling back: {}", fresh.len(), count, err);
        release_all(store, &fresh);
        return Err(err);
    }
    Ok(fresh)
}

/// Appends `data` to the end of file `name`.
///
/// Either the whole append happens or, on error, the file and the pool of
/// free blocks are left as they were.
pub fn append(store: &mut impl BlockStore, dir_id: BlockNum, name: &str, data: &[u8]) -> Result<()> {
    let file_id = lookup(store, dir_id, name)?;
    let old_inode = get_inode(store, file_id, name)?;

    let old_size = old_inode.size as usize;
    let new_size = old_size + data.len();
    if new_size > MAX_FILE_SIZE {
        return Err(FsError::FileTooLarge);
    }
    if data.is_empty() {
        return Ok(());
    }

    // A partially filled last block is rewritten with the new bytes appended
    // to what it holds. Otherwise writing starts at the first fresh block.
    let blocks_before = blocks_for(old_size);
    let tail = tail_offset(old_size);
    let mut staging = Vec::with_capacity(tail + data.len());
    let first = if tail != 0 {
        let mut block = Box::new([0u8; BLOCK_SIZE]);
        store.read_block(old_inode.data_blocks[blocks_before - 1], &mut block)?;
        staging.extend_from_slice(&block[..tail]);
        blocks_before - 1
    } else {
        blocks_before
    };
    staging.extend_from_slice(data);

    let fresh = alloc_blocks(store, blocks_for(new_size) - blocks_before)?;
    let mut inode = old_inode.clone();
    inode.size = new_size as u32;
    inode.data_blocks.extend_from_slice(&fresh);
    let data_blocks = inode.data_blocks.clone();
    if let Err(e) = write_inode(store, file_id, inode) {
        warn!("updating inode of {} failed, releasing {} new blocks: {}", name, fresh.len(), e);
        release_all(store, &fresh);
        return Err(e);
    }

    if let Err(e) = write_chunks(store, &data_blocks[first..], &staging) {
        // Bytes already written past the old size are never read back once
        // the old inode is in place again.
        warn!("writing data of {} failed, restoring its inode: {}", name, e);
        match write_inode(store, file_id, old_inode) {
            Ok(()) => release_all(store, &fresh),
            Err(restore) => warn!("restoring inode of {} failed, keeping its blocks: {}", name, restore),
        }
        return Err(e);
    }

    debug!(
        "appended {} bytes to {} (block {}): {} -> {} bytes, {} new blocks",
        data.len(),
        name,
        file_id,
        old_size,
        new_size,
        fresh.len()
    );
    Ok(())
}

/// Writes `bytes` over `blocks`, one block per chunk, zero padding the last.
fn write_chunks(store: &mut impl BlockStore, blocks: &[BlockNum], bytes: &[u8]) -> Result<()> {
    let mut block = Box::new([0u8; BLOCK_SIZE]);
    for (chunk, &block_id) in bytes.chunks(BLOCK_SIZE).zip(blocks) {
        block[..chunk.len()].copy_from_slice(chunk);
        block[chunk.len()..].fill(0);
        store.write_block(block_id, &block)?;
    }
    Ok(())
}

/// Reads file `name` from its start into `buf`, up to `buf.len()` bytes but
/// never past the end of the file. Returns the number of bytes read.
pub fn read(store: &impl BlockStore, dir_id: BlockNum, name: &str, buf: &mut [u8]) -> Result<usize> {
    let file_id = lookup(store, dir_id, name)?;
    let inode = get_inode(store, file_id, name)?;

    let count = buf.len().min(inode.size as usize);
    let needed = blocks_for(count);
    let mut scratch = Vec::with_capacity(needed * BLOCK_SIZE);
    let mut block = Box::new([0u8; BLOCK_SIZE]);
    for &block_id in &inode.data_blocks[..needed] {
        store.read_block(block_id, &mut block)?;
        scratch.extend_from_slice(&block[..]);
    }
    buf[..count].copy_from_slice(&scratch[..count]);

    Ok(count)
}
