//! Directory entries: lookup, insertion, removal and listing.
//!
//! Entries are kept densely packed. Removal moves the last entry into the
//! freed slot, so listing order is insertion order only until the first
//! removal.

use log::{debug, warn};

use crate::block_dev::{BlockNum, BlockStore};
use crate::config::*;
use crate::error::{FsError, Result};
use crate::inode::{get_dir, get_node, node_kind, release_all, update_dir, write_dir, write_node};
use crate::structs::*;

/// Names of the children of a directory, split by kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub directories: Vec<String>,
    pub files: Vec<String>,
}

pub fn check_name(name: &str) -> Result<()> {
    if name.len() > MAX_NAME_LENGTH {
        return Err(FsError::NameTooLong(name.to_string()));
    }
    if name.is_empty() || name.contains('\0') {
        return Err(FsError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Finds `name` among the entries of `dir`, returning its slot and entry.
pub fn dir_lookup<'a>(dir: &'a DirNode, name: &str) -> Option<(usize, &'a DirEntry)> {
    dir.entries.iter().enumerate().find(|(_, entry)| entry.name == name)
}

/// Like `dir_lookup`, but a missing name is an error.
pub fn find_entry<'a>(dir: &'a DirNode, name: &str) -> Result<(usize, &'a DirEntry)> {
    dir_lookup(dir, name).ok_or_else(|| FsError::NotFound(name.to_string()))
}

/// Returns the block `name` refers to in the directory stored at `dir_id`.
pub fn lookup(store: &impl BlockStore, dir_id: BlockNum, name: &str) -> Result<BlockNum> {
    let dir = get_dir(store, dir_id, name)?;
    Ok(find_entry(&dir, name)?.1.child)
}

/// Allocates a block holding `record` and links it into the parent as `name`.
///
/// Checks run in a fixed order: parent capacity, name, name collision, free
/// space. Nothing is modified unless all of them pass, and a failed write
/// gives the new block back.
pub fn dir_add_entry(
    store: &mut impl BlockStore,
    parent_id: BlockNum,
    name: &str,
    record: &Record,
) -> Result<BlockNum> {
    let mut parent = get_dir(store, parent_id, name)?;
    if parent.is_full() {
        return Err(FsError::DirFull);
    }
    check_name(name)?;
    if dir_lookup(&parent, name).is_some() {
        return Err(FsError::Exists(name.to_string()));
    }

    let child = store.allocate()?.ok_or(FsError::DiskFull)?;
    parent.entries.push(DirEntry::new(name, child));
    // Child first: the parent never links to an unwritten block.
    let linked = write_node(store, child, record).and_then(|()| write_dir(store, parent_id, parent));
    if let Err(e) = linked {
        warn!("linking {} into block {} failed, releasing block {}: {}", name, parent_id, child, e);
        release_all(store, &[child]);
        return Err(e);
    }

    debug!("linked {:?} {} as block {} in block {}", record.kind(), name, child, parent_id);
    Ok(child)
}

/// Unlinks slot `index`: the last entry takes its place.
pub fn dir_rm_entry(dir: &mut DirNode, index: usize) -> DirEntry {
    dir.entries.swap_remove(index)
}

/// Creates an empty subdirectory `name` in the parent directory.
/// Returns the block of the new directory.
pub fn mkdir(store: &mut impl BlockStore, parent_id: BlockNum, name: &str) -> Result<BlockNum> {
    dir_add_entry(store, parent_id, name, &Record::Directory(DirNode::default()))
}

/// Removes the empty subdirectory `name` and gives its block back to the store.
pub fn rmdir(store: &mut impl BlockStore, parent_id: BlockNum, name: &str) -> Result<()> {
    let child = update_dir(store, parent_id, |store, parent| {
        let (index, entry) = find_entry(parent, name)?;
        let child = entry.child;
        if !get_dir(store, child, name)?.is_empty() {
            return Err(FsError::NotEmpty(name.to_string()));
        }
        dir_rm_entry(parent, index);
        Ok(child)
    })?;

    store.release(child)?;
    debug!("removed directory {} (block {}) from block {}", name, child, parent_id);
    Ok(())
}

/// Resolves `name` in `dir_id` to a subdirectory block.
pub fn resolve_subdirectory(store: &impl BlockStore, dir_id: BlockNum, name: &str) -> Result<BlockNum> {
    let child = lookup(store, dir_id, name)?;
    match node_kind(store, child)? {
        NodeKind::Directory => Ok(child),
        NodeKind::File => Err(FsError::NotDirectory(name.to_string())),
    }
}

/// Lists the directory at `dir_id`, keeping the stored order within each kind.
pub fn read_dir(store: &impl BlockStore, dir_id: BlockNum) -> Result<Listing> {
    let dir = get_dir(store, dir_id, "")?;
    let mut listing = Listing::default();
    for entry in dir.entries {
        match node_kind(store, entry.child)? {
            NodeKind::Directory => listing.directories.push(entry.name),
            NodeKind::File => listing.files.push(entry.name),
        }
    }
    Ok(listing)
}

/// Renders the tree below `dir_id`, one entry per line, indented by depth.
pub fn dump_tree(store: &impl BlockStore, dir_id: BlockNum, depth: usize, out: &mut String) -> Result<()> {
    let dir = get_dir(store, dir_id, "")?;
    for entry in &dir.entries {
        let indent = "  ".repeat(depth);
        match get_node(store, entry.child)? {
            Record::Directory(_) => {
                out.push_str(&format!("{}{}/ [{}]\n", indent, entry.name, entry.child));
                dump_tree(store, entry.child, depth + 1, out)?;
            }
            Record::File(inode) => {
                out.push_str(&format!(
                    "{}{} [{}] {} bytes in {:?}\n",
                    indent, entry.name, entry.child, inode.size, inode.data_blocks
                ));
            }
        }
    }
    Ok(())
}
