//! Dense bit-packing of file bytes into scalar field elements.
//!
//! Every 127-byte block (1016 bits) is spread over four 32-byte windows of
//! 254 data bits each. Byte boundaries and 254-bit boundaries interleave, so
//! each window after the first starts with the bits carried out of the
//! previous one (2, then 4, then 6 bits). The two most significant bits of
//! every element are always zero:
//!
//! ```text
//! block:   | 31 B + 6 b | 2 b + 31 B + 4 b | 4 b + 31 B + 2 b | 6 b + 31 B |
//! window:  |  254 bits  |     254 bits     |     254 bits     |  254 bits  |
//! ```
//!
//! Windows are little-endian, which makes the element's big-endian
//! representation the reversed window with a zeroed top byte prefix. Any
//! value below 2^254 is already canonical in the BLS12-381 scalar field, so
//! the mapping never reduces and is exactly reversible.
//!
//! The chain-side verifier commits over this same layout; it must not change.

use ark_ff::{BigInteger, PrimeField};

use crate::config::F;

/// Input bytes consumed per block.
pub const BLOCK_BYTES: usize = 127;

/// Field elements produced per block.
pub const ELEMENTS_PER_BLOCK: usize = 4;

/// Bytes in one padded window (one field element).
pub const WINDOW_BYTES: usize = 32;

/// Padded bytes produced per block.
pub const PADDED_BLOCK_BYTES: usize = ELEMENTS_PER_BLOCK * WINDOW_BYTES;

/// Mask keeping the 6 low bits of a window's last byte.
const TOP_BITS_CLEAR: u8 = 0x3f;

/// Pack one 127-byte block into four 32-byte windows.
pub fn pad_block(input: &[u8; BLOCK_BYTES]) -> [u8; PADDED_BLOCK_BYTES] {
    let mut out = [0u8; PADDED_BLOCK_BYTES];

    // Window 0: 31 full bytes plus the low 6 bits of byte 31.
    out[..31].copy_from_slice(&input[..31]);
    out[31] = input[31] & TOP_BITS_CLEAR;
    let mut carry = input[31] >> 6;

    // Window 1: 2-bit carry in, 4-bit carry out.
    let mut v = 0u8;
    for i in 32..64 {
        v = input[i];
        out[i] = (v << 2) | carry;
        carry = v >> 6;
    }
    out[63] &= TOP_BITS_CLEAR;
    carry = v >> 4;

    // Window 2: 4-bit carry in, 6-bit carry out.
    for i in 64..96 {
        v = input[i];
        out[i] = (v << 4) | carry;
        carry = v >> 4;
    }
    out[95] &= TOP_BITS_CLEAR;
    carry = v >> 2;

    // Window 3: 6-bit carry in, remaining 31 bytes.
    for i in 96..127 {
        v = input[i];
        out[i] = (v << 6) | carry;
        carry = v >> 2;
    }
    out[127] = carry & TOP_BITS_CLEAR;

    out
}

/// Inverse of [`pad_block`].
pub fn unpad_block(padded: &[u8; PADDED_BLOCK_BYTES]) -> [u8; BLOCK_BYTES] {
    let mut out = [0u8; BLOCK_BYTES];

    out[..31].copy_from_slice(&padded[..31]);
    out[31] = (padded[31] & TOP_BITS_CLEAR) | ((padded[32] & 0x03) << 6);

    for i in 32..63 {
        out[i] = (padded[i] >> 2) | ((padded[i + 1] & 0x03) << 6);
    }
    out[63] = ((padded[63] >> 2) & 0x0f) | ((padded[64] & 0x0f) << 4);

    for i in 64..95 {
        out[i] = (padded[i] >> 4) | ((padded[i + 1] & 0x0f) << 4);
    }
    out[95] = ((padded[95] >> 4) & 0x03) | ((padded[96] & TOP_BITS_CLEAR) << 2);

    for i in 96..127 {
        out[i] = (padded[i] >> 6) | ((padded[i + 1] & TOP_BITS_CLEAR) << 2);
    }

    out
}

/// Big-endian element representations of one block.
///
/// Byte 0 of every returned array is the element's most significant byte and
/// always has its two top bits clear.
pub fn block_to_be_elements(input: &[u8; BLOCK_BYTES]) -> [[u8; WINDOW_BYTES]; ELEMENTS_PER_BLOCK] {
    let padded = pad_block(input);
    let mut elements = [[0u8; WINDOW_BYTES]; ELEMENTS_PER_BLOCK];
    for (element, window) in elements.iter_mut().zip(padded.chunks_exact(WINDOW_BYTES)) {
        element.copy_from_slice(window);
        element.reverse();
    }
    elements
}

/// Encode one block into four field elements.
pub fn encode_block(input: &[u8; BLOCK_BYTES]) -> [F; ELEMENTS_PER_BLOCK] {
    let padded = pad_block(input);
    let mut elements = [F::from(0u64); ELEMENTS_PER_BLOCK];
    for (element, window) in elements.iter_mut().zip(padded.chunks_exact(WINDOW_BYTES)) {
        *element = F::from_le_bytes_mod_order(window);
    }
    elements
}

/// Encode an arbitrary byte buffer into field elements.
///
/// The buffer is split into 127-byte blocks; a short final block is
/// zero-padded. Produces exactly `4 * ceil(len / 127)` elements.
pub fn encode_bytes(data: &[u8]) -> Vec<F> {
    let mut elements = Vec::with_capacity(encoded_len(data.len()));
    let mut block = [0u8; BLOCK_BYTES];
    for chunk in data.chunks(BLOCK_BYTES) {
        block.fill(0);
        block[..chunk.len()].copy_from_slice(chunk);
        elements.extend_from_slice(&encode_block(&block));
    }
    elements
}

/// Number of field elements produced for `data_len` input bytes.
pub fn encoded_len(data_len: usize) -> usize {
    data_len.div_ceil(BLOCK_BYTES) * ELEMENTS_PER_BLOCK
}

/// Largest input (in bytes) whose encoding fits into `max_elements` elements.
pub fn max_bytes_for_elements(max_elements: usize) -> usize {
    (max_elements / ELEMENTS_PER_BLOCK) * BLOCK_BYTES
}

/// Decode field elements back into bytes (including block zero-padding).
///
/// Trailing elements that do not form a full group of four are ignored.
pub fn decode_elements(elements: &[F]) -> Vec<u8> {
    let mut out = Vec::with_capacity(elements.len() / ELEMENTS_PER_BLOCK * BLOCK_BYTES);
    let mut padded = [0u8; PADDED_BLOCK_BYTES];
    for group in elements.chunks_exact(ELEMENTS_PER_BLOCK) {
        for (window, element) in padded.chunks_exact_mut(WINDOW_BYTES).zip(group) {
            let le = element.into_bigint().to_bytes_le();
            window.copy_from_slice(&le[..WINDOW_BYTES]);
        }
        out.extend_from_slice(&unpad_block(&padded));
    }
    out
}
