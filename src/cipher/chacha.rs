//! ChaCha20 block function and keystream (RFC 8439 §2.3, §2.4).
//!
//! The block function is a pure map from `(key, counter, nonce)` to 64 bytes
//! of keystream. Encryption and decryption are the same operation: XOR the
//! data with consecutive blocks.

use crate::config::{BLOCK_SIZE, KEY_SIZE, NONCE_SIZE};
use crate::error::{Error, Result};

/// "expand 32-byte k" as four little-endian words.
const CONSTANTS: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

/// Number of double rounds (20 rounds total).
const DOUBLE_ROUNDS: usize = 10;

#[inline(always)]
fn quarter_round(state: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    state[a] = state[a].wrapping_add(state[b]);
    state[d] = (state[d] ^ state[a]).rotate_left(16);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] = (state[b] ^ state[c]).rotate_left(12);

    state[a] = state[a].wrapping_add(state[b]);
    state[d] = (state[d] ^ state[a]).rotate_left(8);

    state[c] = state[c].wrapping_add(state[d]);
    state[b] = (state[b] ^ state[c]).rotate_left(7);
}

#[inline(always)]
fn le_word(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn initial_state(key: &[u8; KEY_SIZE], counter: u32, nonce: &[u8; NONCE_SIZE]) -> [u32; 16] {
    let mut state = [0u32; 16];
    state[..4].copy_from_slice(&CONSTANTS);
    for (word, chunk) in state[4..12].iter_mut().zip(key.chunks_exact(4)) {
        *word = le_word(chunk);
    }
    state[12] = counter;
    for (word, chunk) in state[13..].iter_mut().zip(nonce.chunks_exact(4)) {
        *word = le_word(chunk);
    }
    state
}

/// Produces one 64-byte keystream block.
pub fn block(key: &[u8; KEY_SIZE], counter: u32, nonce: &[u8; NONCE_SIZE]) -> [u8; BLOCK_SIZE] {
    let initial = initial_state(key, counter, nonce);
    let mut working = initial;

    for _ in 0..DOUBLE_ROUNDS {
        // Columns.
        quarter_round(&mut working, 0, 4, 8, 12);
        quarter_round(&mut working, 1, 5, 9, 13);
        quarter_round(&mut working, 2, 6, 10, 14);
        quarter_round(&mut working, 3, 7, 11, 15);

        // Diagonals.
        quarter_round(&mut working, 0, 5, 10, 15);
        quarter_round(&mut working, 1, 6, 11, 12);
        quarter_round(&mut working, 2, 7, 8, 13);
        quarter_round(&mut working, 3, 4, 9, 14);
    }

    let mut out = [0u8; BLOCK_SIZE];
    for ((chunk, w), i) in out.chunks_exact_mut(4).zip(working).zip(initial) {
        chunk.copy_from_slice(&w.wrapping_add(i).to_le_bytes());
    }
    out
}

/// XORs `data` in place with the keystream starting at `initial_counter`.
///
/// Rejects inputs that would need the 32-bit block counter to wrap. Nothing is
/// modified when an error is returned.
pub fn apply_keystream(key: &[u8; KEY_SIZE], nonce: &[u8; NONCE_SIZE], initial_counter: u32, data: &mut [u8]) -> Result<()> {
    let blocks = data.len().div_ceil(BLOCK_SIZE) as u64;
    let available = u64::from(u32::MAX) - u64::from(initial_counter) + 1;
    if blocks > available {
        return Err(Error::MessageTooLong(data.len()));
    }

    let mut counter = initial_counter;
    for chunk in data.chunks_mut(BLOCK_SIZE) {
        let keystream = block(key, counter, nonce);
        chunk.iter_mut().zip(keystream.iter()).for_each(|(byte, k)| *byte ^= k);
        counter = counter.wrapping_add(1);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequential_key() -> [u8; KEY_SIZE] {
        std::array::from_fn(|i| i as u8)
    }

    #[test]
    fn test_quarter_round_vector() {
        // RFC 8439 §2.1.1
        let mut state = [0u32; 16];
        state[0] = 0x1111_1111;
        state[1] = 0x0102_0304;
        state[2] = 0x9b8d_6f43;
        state[3] = 0x0123_4567;

        quarter_round(&mut state, 0, 1, 2, 3);

        assert_eq!(state[0], 0xea2a_92f4);
        assert_eq!(state[1], 0xcb1c_f8ce);
        assert_eq!(state[2], 0x4581_472e);
        assert_eq!(state[3], 0x5881_c4bb);
    }

    #[test]
    fn test_block_vector() {
        // RFC 8439 §2.3.2
        let nonce = [0x00, 0x00, 0x00, 0x09, 0x00, 0x00, 0x00, 0x4a, 0x00, 0x00, 0x00, 0x00];
        let expected: [u8; BLOCK_SIZE] = [
            0x10, 0xf1, 0xe7, 0xe4, 0xd1, 0x3b, 0x59, 0x15, 0x50, 0x0f, 0xdd, 0x1f, 0xa3, 0x20, 0x71, 0xc4, //
            0xc7, 0xd1, 0xf4, 0xc7, 0x33, 0xc0, 0x68, 0x03, 0x04, 0x22, 0xaa, 0x9a, 0xc3, 0xd4, 0x6c, 0x4e, //
            0xd2, 0x82, 0x64, 0x46, 0x07, 0x9f, 0xaa, 0x09, 0x14, 0xc2, 0xd7, 0x05, 0xd9, 0x8b, 0x02, 0xa2, //
            0xb5, 0x12, 0x9c, 0xd1, 0xde, 0x16, 0x4e, 0xb9, 0xcb, 0xd0, 0x83, 0xe8, 0xa2, 0x50, 0x3c, 0x4e,
        ];

        assert_eq!(block(&sequential_key(), 1, &nonce), expected);
    }

    #[test]
    fn test_encryption_vector() {
        // RFC 8439 §2.4.2
        let nonce = [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x4a, 0x00, 0x00, 0x00, 0x00];
        let plaintext = b"Ladies and Gentlemen of the class of '99: If I could offer you only one tip for the future, sunscreen would be it.";
        let expected: [u8; 114] = [
            0x6e, 0x2e, 0x35, 0x9a, 0x25, 0x68, 0xf9, 0x80, 0x41, 0xba, 0x07, 0x28, 0xdd, 0x0d, 0x69, 0x81, //
            0xe9, 0x7e, 0x7a, 0xec, 0x1d, 0x43, 0x60, 0xc2, 0x0a, 0x27, 0xaf, 0xcc, 0xfd, 0x9f, 0xae, 0x0b, //
            0xf9, 0x1b, 0x65, 0xc5, 0x52, 0x47, 0x33, 0xab, 0x8f, 0x59, 0x3d, 0xab, 0xcd, 0x62, 0xb3, 0x57, //
            0x16, 0x39, 0xd6, 0x24, 0xe6, 0x51, 0x52, 0xab, 0x8f, 0x53, 0x0c, 0x35, 0x9f, 0x08, 0x61, 0xd8, //
            0x07, 0xca, 0x0d, 0xbf, 0x50, 0x0d, 0x6a, 0x61, 0x56, 0xa3, 0x8e, 0x08, 0x8a, 0x22, 0xb6, 0x5e, //
            0x52, 0xbc, 0x51, 0x4d, 0x16, 0xcc, 0xf8, 0x06, 0x81, 0x8c, 0xe9, 0x1a, 0xb7, 0x79, 0x37, 0x36, //
            0x5a, 0xf9, 0x0b, 0xbf, 0x74, 0xa3, 0x5b, 0xe6, 0xb4, 0x0b, 0x8e, 0xed, 0xf2, 0x78, 0x5e, 0x42, //
            0x87, 0x4d,
        ];

        let mut buffer = plaintext.to_vec();
        apply_keystream(&sequential_key(), &nonce, 1, &mut buffer).unwrap();
        assert_eq!(buffer, expected);

        apply_keystream(&sequential_key(), &nonce, 1, &mut buffer).unwrap();
        assert_eq!(buffer, plaintext);
    }

    #[test]
    fn test_keystream_matches_blocks_across_boundaries() {
        let key = [0x42; KEY_SIZE];
        let nonce = [0x24; NONCE_SIZE];

        for len in [0usize, 1, 63, 64, 65, 100, 128, 129] {
            let mut data = vec![0u8; len];
            apply_keystream(&key, &nonce, 1, &mut data).unwrap();

            let expected: Vec<u8> = (1u32..).take(len.div_ceil(BLOCK_SIZE)).flat_map(|counter| block(&key, counter, &nonce)).take(len).collect();
            assert_eq!(data, expected, "length {len}");
        }
    }

    #[test]
    fn test_counter_overflow_is_rejected() {
        let key = [0u8; KEY_SIZE];
        let nonce = [0u8; NONCE_SIZE];

        // The last counter value still fits one block.
        let mut one_block = [0u8; BLOCK_SIZE];
        assert!(apply_keystream(&key, &nonce, u32::MAX, &mut one_block).is_ok());

        let mut two_blocks = [1u8; BLOCK_SIZE + 1];
        let err = apply_keystream(&key, &nonce, u32::MAX, &mut two_blocks).unwrap_err();
        assert!(matches!(err, Error::MessageTooLong(65)));
        assert_eq!(two_blocks, [1u8; BLOCK_SIZE + 1]);
    }
}
