//! Header of block 0 of a volume. The free bitmap follows it in the same block.

use crate::block_dev::Block;
use crate::config::*;
use crate::error::{FsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuperBlock {
    pub magic: u32,       // Magic number to identify the volume
    pub num_blocks: u32,  // Blocks managed by the volume, block 0 included
    pub free_blocks: u32, // Blocks still available to allocate
}

impl SuperBlock {
    pub fn new(num_blocks: u32) -> Self {
        Self {
            magic: MAGIC,
            num_blocks,
            // Block 0 itself is never free.
            free_blocks: num_blocks - 1,
        }
    }

    pub fn read_from(buf: &Block) -> Result<Self> {
        let field = |i: usize| u32::from_le_bytes([buf[i], buf[i + 1], buf[i + 2], buf[i + 3]]);
        let superblock = Self {
            magic: field(0),
            num_blocks: field(4),
            free_blocks: field(8),
        };

        if superblock.magic != MAGIC {
            return Err(FsError::InvalidSuperBlock);
        }
        if superblock.num_blocks < 2
            || superblock.num_blocks as usize > BITMAP_BITS
            || superblock.free_blocks >= superblock.num_blocks
        {
            return Err(FsError::InvalidSuperBlock);
        }

        Ok(superblock)
    }

    /// Writes the header into `buf`, leaving the bitmap bytes untouched.
    pub fn write_to(&self, buf: &mut Block) {
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4..8].copy_from_slice(&self.num_blocks.to_le_bytes());
        buf[8..12].copy_from_slice(&self.free_blocks.to_le_bytes());
        buf[12..SUPERBLOCK_SIZE].fill(0);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_header_roundtrip_keeps_bitmap() {
        let mut buf = [0xAAu8; BLOCK_SIZE];
        let sb = SuperBlock::new(64);
        sb.write_to(&mut buf);
        assert_eq!(SuperBlock::read_from(&buf).unwrap(), sb);
        assert_eq!(buf[SUPERBLOCK_SIZE], 0xAA);
    }

    #[test]
    fn test_rejects_blank_block() {
        let buf = [0u8; BLOCK_SIZE];
        assert!(matches!(SuperBlock::read_from(&buf), Err(FsError::InvalidSuperBlock)));
    }
}
