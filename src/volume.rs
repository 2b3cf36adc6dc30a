//! A `BlockStore` over a raw `BlockDevice`.
//!
//! Block 0 of the device holds the superblock and the free bitmap, which is why
//! handle 0 doubles as "no block". Every allocation or release rewrites block 0
//! in a single write, so the free count and the bitmap never disagree on disk.

use log::{info, trace};

use crate::bitmap::{count_clear, set_bit_at, set_first_fit_bit};
use crate::block_dev::{Block, BlockDevice, BlockNum, BlockStore};
use crate::config::*;
use crate::error::{FsError, Result};
use crate::superblock::SuperBlock;

#[derive(Debug)]
pub struct Volume<D: BlockDevice> {
    device: D,
    superblock: SuperBlock,
}

impl<D: BlockDevice> Volume<D> {
    /// Writes an empty superblock and bitmap to the device.
    /// Only block 0 is marked in use afterwards.
    pub fn format(device: D) -> Result<Self> {
        let num_blocks = device.num_blocks().min(BITMAP_BITS);
        if num_blocks < 2 {
            return Err(FsError::InvalidSuperBlock);
        }

        let superblock = SuperBlock::new(num_blocks as u32);
        let mut buf = Box::new([0u8; BLOCK_SIZE]);
        superblock.write_to(&mut buf);
        set_bit_at(&mut buf, NULL_BLOCK as usize, num_blocks, true)?;
        device.write_block(NULL_BLOCK as usize, &buf)?;
        device.flush()?;

        info!("formatted volume with {} blocks", num_blocks);
        Ok(Self { device, superblock })
    }

    pub fn mount(device: D) -> Result<Self> {
        let mut buf = Box::new([0u8; BLOCK_SIZE]);
        device.read_block(NULL_BLOCK as usize, &mut buf)?;
        let superblock = SuperBlock::read_from(&buf)?;

        if superblock.num_blocks as usize > device.num_blocks() {
            return Err(FsError::InvalidSuperBlock);
        }
        // The header is a cached count, the bitmap is the truth.
        if count_clear(&buf, superblock.num_blocks as usize) != superblock.free_blocks as usize {
            return Err(FsError::InvalidSuperBlock);
        }

        info!(
            "mounted volume: {} blocks, {} free",
            superblock.num_blocks, superblock.free_blocks
        );
        Ok(Self { device, superblock })
    }

    /// Flushes the device and hands it back.
    pub fn unmount(self) -> Result<D> {
        self.device.flush()?;
        info!("unmounted volume, {} blocks free", self.superblock.free_blocks);
        Ok(self.device)
    }

    pub fn superblock(&self) -> &SuperBlock {
        &self.superblock
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    fn check_id(&self, id: BlockNum) -> Result<usize> {
        if id == NULL_BLOCK || id as u32 >= self.superblock.num_blocks {
            return Err(FsError::InvalidBlockId(id as u32));
        }
        Ok(id as usize)
    }
}

impl<D: BlockDevice> BlockStore for Volume<D> {
    fn read_block(&self, id: BlockNum, buf: &mut Block) -> Result<()> {
        let id = self.check_id(id)?;
        self.device.read_block(id, buf)
    }

    fn write_block(&mut self, id: BlockNum, buf: &Block) -> Result<()> {
        let id = self.check_id(id)?;
        self.device.write_block(id, buf)
    }

    fn allocate(&mut self) -> Result<Option<BlockNum>> {
        let mut buf = Box::new([0u8; BLOCK_SIZE]);
        self.device.read_block(NULL_BLOCK as usize, &mut buf)?;

        let Some(id) = set_first_fit_bit(&mut buf, self.superblock.num_blocks as usize, true) else {
            trace!("allocate: pool exhausted");
            return Ok(None);
        };

        let mut superblock = self.superblock;
        superblock.free_blocks -= 1;
        superblock.write_to(&mut buf);
        self.device.write_block(NULL_BLOCK as usize, &buf)?;
        self.superblock = superblock;

        // Hand out a zeroed block.
        let zero_block = Box::new([0u8; BLOCK_SIZE]);
        self.device.write_block(id, &zero_block)?;

        trace!("allocate: block {}, {} left", id, superblock.free_blocks);
        Ok(Some(id as BlockNum))
    }

    fn release(&mut self, id: BlockNum) -> Result<()> {
        let index = self.check_id(id)?;
        let mut buf = Box::new([0u8; BLOCK_SIZE]);
        self.device.read_block(NULL_BLOCK as usize, &mut buf)?;

        if !set_bit_at(&mut buf, index, self.superblock.num_blocks as usize, false)? {
            return Err(FsError::BlockNotAllocated(id as u32));
        }

        let mut superblock = self.superblock;
        superblock.free_blocks += 1;
        superblock.write_to(&mut buf);
        self.device.write_block(NULL_BLOCK as usize, &buf)?;
        self.superblock = superblock;

        trace!("release: block {}, {} left", id, superblock.free_blocks);
        Ok(())
    }

    fn free_blocks(&self) -> usize {
        self.superblock.free_blocks as usize
    }

    fn sync(&mut self) -> Result<()> {
        self.device.flush()
    }
}
