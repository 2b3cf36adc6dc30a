//! Loading and storing records through a block store.
//!
//! Nothing is cached: each call reads the block it needs. Records are decoded
//! into owned values, so a mutation that fails half way is simply dropped and
//! the block on the store keeps its previous contents.

use log::warn;

use crate::block_dev::{BlockNum, BlockStore};
use crate::config::BLOCK_SIZE;
use crate::error::{FsError, Result};
use crate::structs::*;

pub fn get_node(store: &impl BlockStore, id: BlockNum) -> Result<Record> {
    let mut buf = Box::new([0u8; BLOCK_SIZE]);
    store.read_block(id, &mut buf)?;
    Record::decode(&buf)
}

pub fn write_node(store: &mut impl BlockStore, id: BlockNum, record: &Record) -> Result<()> {
    store.write_block(id, &record.encode())
}

pub fn node_kind(store: &impl BlockStore, id: BlockNum) -> Result<NodeKind> {
    Ok(get_node(store, id)?.kind())
}

/// Loads a block that must hold a directory. `name` only labels the error.
pub fn get_dir(store: &impl BlockStore, id: BlockNum, name: &str) -> Result<DirNode> {
    match get_node(store, id)? {
        Record::Directory(dir) => Ok(dir),
        Record::File(_) => Err(FsError::NotDirectory(name.to_string())),
    }
}

/// Loads a block that must hold an inode. `name` only labels the error.
pub fn get_inode(store: &impl BlockStore, id: BlockNum, name: &str) -> Result<Inode> {
    match get_node(store, id)? {
        Record::File(inode) => Ok(inode),
        Record::Directory(_) => Err(FsError::IsDirectory(name.to_string())),
    }
}

pub fn write_dir(store: &mut impl BlockStore, id: BlockNum, dir: DirNode) -> Result<()> {
    write_node(store, id, &Record::Directory(dir))
}

pub fn write_inode(store: &mut impl BlockStore, id: BlockNum, inode: Inode) -> Result<()> {
    write_node(store, id, &Record::File(inode))
}

/// Runs `f` on the directory stored at `id` and persists the result only if
/// `f` succeeds.
pub fn update_dir<S, T, F>(store: &mut S, id: BlockNum, f: F) -> Result<T>
where
    S: BlockStore,
    F: FnOnce(&mut S, &mut DirNode) -> Result<T>,
{
    let Record::Directory(mut dir) = get_node(store, id)? else {
        return Err(FsError::Corrupt("expected a directory"));
    };
    let out = f(store, &mut dir)?;
    write_dir(store, id, dir)?;
    Ok(out)
}

/// Gives `blocks` back to the store, last one first. A failed release is
/// logged and skipped, the remaining blocks are still released.
pub fn release_all(store: &mut impl BlockStore, blocks: &[BlockNum]) {
    for &block in blocks.iter().rev() {
        if let Err(e) = store.release(block) {
            warn!("failed to release block {}: {}", block, e);
        }
    }
}

/// Offset of the first free byte in the last data block of a file of `size`
/// bytes, 0 when the file is empty or its last block is full.
pub fn tail_offset(size: usize) -> usize {
    size % BLOCK_SIZE
}
