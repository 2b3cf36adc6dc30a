//! Jumbo is a small hierarchical file system living on fixed-size blocks.
//! For simplicity, no support for permissions, timestamps, or links.
//!
//! Every block the file system owns holds one record: either a directory
//! node (a bounded list of named children) or an inode (a file size and the
//! list of data blocks holding the content). Block 1 is the root directory.
//!
//! Jumbo's layers (from bottom to top):
//! 1. Block Device: Raw fixed-size block I/O.                 | RamDisk, FileDisk, or user implemented
//! 2. Block Store: Block I/O plus a pool of free blocks.      | Volume (superblock + bitmap in block 0), or user implemented
//! 3. Records: Directory node / inode codec and access.       | Fs implemented
//! 4. Directory: Entries, lookup, mkdir/rmdir, listing.       | Fs implemented
//! 5. File: creat/remove/stat, append and read.               | Fs implemented
//! 6. FileSystem: A mounted store plus a current directory.   | Fs implemented

mod config;
mod block_dev;
mod disk;
mod superblock;
mod bitmap;
mod volume;
mod structs;
mod inode;
mod directory;
mod file;
mod fs;
mod error;

pub use block_dev::{Block, BlockDevice, BlockNum, BlockStore};
pub use config::*;
pub use disk::{FileDisk, RamDisk};
pub use superblock::SuperBlock;
pub use volume::Volume;
pub use structs::*;
pub use directory::Listing;
pub use file::Stat;
pub use fs::*;
pub use error::FsError as Error;
pub use error::Result;
