use crate::config::BLOCK_SIZE;
use crate::error::Result;

/// Raw contents of one block.
pub type Block = [u8; BLOCK_SIZE];

/// Handle of a block on a store. `NULL_BLOCK` (0) never names a usable block.
pub type BlockNum = u16;

pub trait BlockDevice: Send + Sync {
    /// Returns the number of blocks in the block device.
    fn num_blocks(&self) -> usize;

    /// Reads a block of data from the block device.
    fn read_block(&self, block_id: usize, buf: &mut Block) -> Result<()>;

    /// Writes a block of data to the block device.
    fn write_block(&self, block_id: usize, buf: &Block) -> Result<()>;

    /// Flushes any buffered data to the block device.
    fn flush(&self) -> Result<()>;
}

/// Block storage the file system is built on.
///
/// Besides plain block I/O a store owns the pool of free blocks: `allocate`
/// hands out a zeroed block, or `None` once the pool is exhausted, and
/// `release` puts a block back. A released block must not be read or written
/// until it is allocated again.
pub trait BlockStore {
    fn read_block(&self, id: BlockNum, buf: &mut Block) -> Result<()>;

    fn write_block(&mut self, id: BlockNum, buf: &Block) -> Result<()>;

    fn allocate(&mut self) -> Result<Option<BlockNum>>;

    fn release(&mut self, id: BlockNum) -> Result<()>;

    /// Number of blocks `allocate` can still hand out.
    fn free_blocks(&self) -> usize;

    /// Persists any state the store keeps outside of its blocks.
    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}
