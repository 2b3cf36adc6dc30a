//! On-disk records and their wire format.
//!
//! Every block the file system owns holds exactly one record, told apart by
//! the tag in byte 0:
//!
//! ```text
//! directory: [0] tag=0  [2..4) entry count (u16)  [4..) entries, 24 bytes each:
//!            name (22 bytes, NUL padded) + child block (u16)
//! inode:     [0] tag=1  [4..8) file size (u32)    [8..) data blocks (u16 each)
//! ```
//!
//! All integers are little endian. Bytes past the meaningful part are zero.

use crate::block_dev::{Block, BlockNum};
use crate::config::*;
use crate::error::{FsError, Result};

const TAG_DIRECTORY: u8 = 0;
const TAG_FILE: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
}

impl NodeKind {
    fn tag(self) -> u8 {
        match self {
            NodeKind::Directory => TAG_DIRECTORY,
            NodeKind::File => TAG_FILE,
        }
    }

    fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            TAG_DIRECTORY => Ok(NodeKind::Directory),
            TAG_FILE => Ok(NodeKind::File),
            _ => Err(FsError::Corrupt("unknown record tag")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub child: BlockNum,
}

impl DirEntry {
    pub fn new(name: &str, child: BlockNum) -> Self {
        Self {
            name: name.to_string(),
            child,
        }
    }
}

/// A directory: a bounded list of named children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirNode {
    pub entries: Vec<DirEntry>,
}

impl DirNode {
    pub fn is_full(&self) -> bool {
        self.entries.len() >= MAX_DIR_ENTRIES
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A file: its length and the blocks holding its content, in file order.
/// Holds exactly `blocks_for(size)` data blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inode {
    pub size: u32,
    pub data_blocks: Vec<BlockNum>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Directory(DirNode),
    File(Inode),
}

impl Record {
    pub fn kind(&self) -> NodeKind {
        match self {
            Record::Directory(_) => NodeKind::Directory,
            Record::File(_) => NodeKind::File,
        }
    }

    pub fn decode(buf: &Block) -> Result<Self> {
        match NodeKind::from_tag(buf[0])? {
            NodeKind::Directory => {
                let count = read_u16(buf, 2) as usize;
                if count > MAX_DIR_ENTRIES {
                    return Err(FsError::Corrupt("directory entry count out of range"));
                }
                let mut entries = Vec::with_capacity(count);
                for i in 0..count {
                    let offset = DIR_HEADER_SIZE + i * DIR_ENTRY_SIZE;
                    let field = &buf[offset..offset + NAME_FIELD_LEN];
                    let len = field.iter().position(|&c| c == 0).unwrap_or(NAME_FIELD_LEN);
                    let name = core::str::from_utf8(&field[..len])
                        .map_err(|_| FsError::Corrupt("directory entry name is not UTF-8"))?;
                    entries.push(DirEntry::new(name, read_u16(buf, offset + NAME_FIELD_LEN)));
                }
                Ok(Record::Directory(DirNode { entries }))
            }
            NodeKind::File => {
                let size = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);
                if size as usize > MAX_FILE_SIZE {
                    return Err(FsError::Corrupt("file size out of range"));
                }
                let data_blocks = (0..blocks_for(size as usize))
                    .map(|i| read_u16(buf, INODE_HEADER_SIZE + i * 2))
                    .collect();
                Ok(Record::File(Inode { size, data_blocks }))
            }
        }
    }

    /// Encodes into a full block. Callers keep the record within the limits
    /// `decode` enforces, anything past them is cut off.
    pub fn encode(&self) -> Box<Block> {
        let mut buf = Box::new([0u8; BLOCK_SIZE]);
        buf[0] = self.kind().tag();
        match self {
            Record::Directory(dir) => {
                let count = dir.entries.len().min(MAX_DIR_ENTRIES);
                buf[2..4].copy_from_slice(&(count as u16).to_le_bytes());
                for (i, entry) in dir.entries.iter().take(count).enumerate() {
                    let offset = DIR_HEADER_SIZE + i * DIR_ENTRY_SIZE;
                    let name = entry.name.as_bytes();
                    // Keep at least one NUL terminator.
                    let len = name.len().min(NAME_FIELD_LEN - 1);
                    buf[offset..offset + len].copy_from_slice(&name[..len]);
                    write_u16(&mut buf, offset + NAME_FIELD_LEN, entry.child);
                }
            }
            Record::File(inode) => {
                buf[4..8].copy_from_slice(&inode.size.to_le_bytes());
                for (i, &block) in inode.data_blocks.iter().take(MAX_DATA_BLOCKS).enumerate() {
                    write_u16(&mut buf, INODE_HEADER_SIZE + i * 2, block);
                }
            }
        }
        buf
    }
}

/// Blocks needed to hold `n` bytes.
pub fn blocks_for(n: usize) -> usize {
    n / BLOCK_SIZE + usize::from(n % BLOCK_SIZE != 0)
}

fn read_u16(buf: &Block, offset: usize) -> u16 {
    u16::from_le_bytes([buf[offset], buf[offset + 1]])
}

fn write_u16(buf: &mut Block, offset: usize, value: u16) {
    buf[offset..offset + 2].copy_from_slice(&value.to_le_bytes());
}
