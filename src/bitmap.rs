//! Free block bitmap, stored in block 0 right after the superblock header.
//! Bit i set means block i is in use. Bits past `total_items` are never touched.

use crate::block_dev::Block;
use crate::config::*;
use crate::error::{FsError, Result};

/// Set the first fit bit in the bitmap.
/// 'Fit' means that it will set the first bit that is not equal to 'value'.
/// Returns the item ID of the bit that was flipped, or None if every bit already equals 'value'.
pub fn set_first_fit_bit(buf: &mut Block, total_items: usize, value: bool) -> Option<usize> {
    let bitmap = &mut buf[SUPERBLOCK_SIZE..];

    for (j, byte) in bitmap.iter_mut().enumerate() {
        // Skip whole bytes that cannot contain a fit.
        if (value && *byte == 0xFF) || (!value && *byte == 0x00) {
            continue;
        }
        for k in 0..8 {
            let item_id = j * 8 + k;
            if item_id >= total_items {
                return None;
            }
            let is_set = (*byte & (1 << k)) != 0;
            if is_set != value {
                if value {
                    *byte |= 1 << k;
                } else {
                    *byte &= !(1 << k);
                }
                return Some(item_id);
            }
        }
    }

    None
}

/// Sets a specific bit in the bitmap.
/// Returns previously set value of the bit.
pub fn set_bit_at(buf: &mut Block, item_id: usize, total_items: usize, set_value: bool) -> Result<bool> {
    if item_id >= total_items || item_id >= BITMAP_BITS {
        return Err(FsError::InvalidBlockId(item_id as u32));
    }

    let byte = &mut buf[SUPERBLOCK_SIZE + item_id / 8];
    let bit = 1u8 << (item_id % 8);
    let pre_value = (*byte & bit) != 0;
    if set_value {
        *byte |= bit;
    } else {
        *byte &= !bit;
    }

    Ok(pre_value)
}

pub fn bit_at(buf: &Block, item_id: usize) -> bool {
    buf[SUPERBLOCK_SIZE + item_id / 8] & (1 << (item_id % 8)) != 0
}

/// Number of clear bits among the first `total_items`.
pub fn count_clear(buf: &Block, total_items: usize) -> usize {
    (0..total_items).filter(|&i| !bit_at(buf, i)).count()
}
