pub const MAGIC: u32 = 0x4F424D4A; // "JMBO" in ASCII, little endian

pub const BLOCK_SIZE: usize = 4096;
pub const NULL_BLOCK: u16 = 0; // "No block". On a volume, block 0 holds the superblock and bitmap.
pub const ROOT_BLOCK: u16 = 1; // Block of the root directory
pub const DEFAULT_NUM_BLOCKS: usize = 1024; // Size of a freshly created disk image (4 MiB)

pub const MAX_NAME_LENGTH: usize = 20;
pub const NAME_FIELD_LEN: usize = MAX_NAME_LENGTH + 2; // NUL padded
pub const DIR_ENTRY_SIZE: usize = NAME_FIELD_LEN + 2; // name + u16 block number
pub const DIR_HEADER_SIZE: usize = 4; // tag, pad, u16 entry count
pub const MAX_DIR_ENTRIES: usize = (BLOCK_SIZE - DIR_HEADER_SIZE) / DIR_ENTRY_SIZE;

pub const INODE_HEADER_SIZE: usize = 8; // tag, pad, u32 file size
pub const MAX_DATA_BLOCKS: usize = (BLOCK_SIZE - INODE_HEADER_SIZE) / 2;
pub const MAX_FILE_SIZE: usize = MAX_DATA_BLOCKS * BLOCK_SIZE;

pub const SUPERBLOCK_SIZE: usize = 16; // magic, num_blocks, free_blocks, reserved
pub const BITMAP_BITS: usize = (BLOCK_SIZE - SUPERBLOCK_SIZE) * 8; // Blocks trackable by the bitmap
