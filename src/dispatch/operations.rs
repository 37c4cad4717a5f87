/*!
 * Bulk Copy Families
 * Forward and reverse in-buffer copies, one implementation per block width
 */

use crate::core::limits::{INTEGER_WORD, VECTOR_BLOCK};

/// In-buffer copy slot: `(buffer, src, dst, len)`
///
/// # Panics
/// Panics if `src..src + len` or `dst..dst + len` falls outside the buffer.
/// The dispatcher validates ranges before calling a slot.
pub type CopyFn = fn(&mut [u8], usize, usize, usize);

/// Vector family, ascending. Correct when `dst <= src`.
pub fn forward_vector(buf: &mut [u8], src: usize, dst: usize, len: usize) {
    forward_blocks::<VECTOR_BLOCK>(buf, src, dst, len);
}

/// Vector family, descending. Correct when `dst >= src`.
pub fn reverse_vector(buf: &mut [u8], src: usize, dst: usize, len: usize) {
    reverse_blocks::<VECTOR_BLOCK>(buf, src, dst, len);
}

/// Integer family, ascending. Correct when `dst <= src`.
pub fn forward_integer(buf: &mut [u8], src: usize, dst: usize, len: usize) {
    forward_blocks::<INTEGER_WORD>(buf, src, dst, len);
}

/// Integer family, descending. Correct when `dst >= src`.
pub fn reverse_integer(buf: &mut [u8], src: usize, dst: usize, len: usize) {
    reverse_blocks::<INTEGER_WORD>(buf, src, dst, len);
}

#[inline(always)]
fn forward_blocks<const BLOCK: usize>(buf: &mut [u8], src: usize, dst: usize, len: usize) {
    let mut block = [0u8; BLOCK];
    let mut offset = 0;

    while offset + BLOCK <= len {
        block.copy_from_slice(&buf[src + offset..src + offset + BLOCK]);
        buf[dst + offset..dst + offset + BLOCK].copy_from_slice(&block);
        offset += BLOCK;
    }

    while offset < len {
        buf[dst + offset] = buf[src + offset];
        offset += 1;
    }
}

#[inline(always)]
fn reverse_blocks<const BLOCK: usize>(buf: &mut [u8], src: usize, dst: usize, len: usize) {
    let mut block = [0u8; BLOCK];
    let mut remaining = len;

    while remaining >= BLOCK {
        let start = remaining - BLOCK;
        block.copy_from_slice(&buf[src + start..src + remaining]);
        buf[dst + start..dst + remaining].copy_from_slice(&block);
        remaining = start;
    }

    while remaining > 0 {
        remaining -= 1;
        buf[dst + remaining] = buf[src + remaining];
    }
}
