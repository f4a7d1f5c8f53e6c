//! Poly1305 one-time authenticator (RFC 8439 §2.5).
//!
//! Arithmetic modulo 2^130 - 5 on five 26-bit limbs, with 64-bit products so
//! no intermediate value can overflow. The final reduction selects between
//! `h` and `h - p` with a mask instead of a branch.

use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use crate::config::{KEY_SIZE, POLY1305_CHUNK_SIZE, TAG_SIZE};

/// 16-byte authentication tag.
pub type Tag = [u8; TAG_SIZE];

const LIMB_MASK: u32 = 0x03ff_ffff;

/// Bit 128 of a full chunk, expressed in the top limb.
const HIBIT: u32 = 1 << 24;

#[inline(always)]
fn le_word(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

/// Splits 16 little-endian bytes into five 26-bit limbs.
#[inline(always)]
fn to_limbs(bytes: &[u8; POLY1305_CHUNK_SIZE]) -> [u32; 5] {
    [
        le_word(bytes, 0) & LIMB_MASK,
        (le_word(bytes, 3) >> 2) & LIMB_MASK,
        (le_word(bytes, 6) >> 4) & LIMB_MASK,
        (le_word(bytes, 9) >> 6) & LIMB_MASK,
        le_word(bytes, 12) >> 8,
    ]
}

/// Streaming Poly1305 state. A key must authenticate exactly one message.
pub struct Poly1305 {
    r: [u32; 5],
    h: [u32; 5],
    s: [u32; 4],
    buffer: [u8; POLY1305_CHUNK_SIZE],
    buffered: usize,
}

impl Poly1305 {
    /// Creates a new authenticator from a 32-byte one-time key `r || s`.
    pub fn new(otk: &[u8; KEY_SIZE]) -> Self {
        let mut r_bytes = [0u8; POLY1305_CHUNK_SIZE];
        r_bytes.copy_from_slice(&otk[..16]);

        // Clamp: top four bits of bytes 3, 7, 11, 15 and bottom two bits of 4, 8, 12.
        for i in [3, 7, 11, 15] {
            r_bytes[i] &= 0x0f;
        }
        for i in [4, 8, 12] {
            r_bytes[i] &= 0xfc;
        }

        let r = to_limbs(&r_bytes);
        r_bytes.zeroize();

        let s = [le_word(otk, 16), le_word(otk, 20), le_word(otk, 24), le_word(otk, 28)];

        Self { r, h: [0; 5], s, buffer: [0; POLY1305_CHUNK_SIZE], buffered: 0 }
    }

    /// Absorbs message bytes. May be called any number of times.
    pub fn update(&mut self, mut data: &[u8]) {
        if self.buffered > 0 {
            let take = (POLY1305_CHUNK_SIZE - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];

            if self.buffered < POLY1305_CHUNK_SIZE {
                return;
            }

            let block = self.buffer;
            self.process_block(&block, HIBIT);
            self.buffered = 0;
        }

        let mut chunks = data.chunks_exact(POLY1305_CHUNK_SIZE);
        for chunk in &mut chunks {
            let mut block = [0u8; POLY1305_CHUNK_SIZE];
            block.copy_from_slice(chunk);
            self.process_block(&block, HIBIT);
        }

        let rest = chunks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    /// Absorbs zero bytes up to the next 16-byte boundary of the stream.
    ///
    /// The AEAD construction pads AAD and ciphertext independently; with a
    /// streaming state that is the same as completing the pending chunk.
    pub fn pad_to_chunk(&mut self) {
        if self.buffered > 0 {
            self.buffer[self.buffered..].fill(0);
            let block = self.buffer;
            self.process_block(&block, HIBIT);
            self.buffered = 0;
        }
    }

    /// Consumes the state and produces the tag.
    pub fn finalize(mut self) -> Tag {
        if self.buffered > 0 {
            let mut block = [0u8; POLY1305_CHUNK_SIZE];
            block[..self.buffered].copy_from_slice(&self.buffer[..self.buffered]);
            block[self.buffered] = 0x01;
            self.process_block(&block, 0);
            self.buffered = 0;
        }

        let [mut h0, mut h1, mut h2, mut h3, mut h4] = self.h;

        // Fully carry h.
        let mut c = h1 >> 26;
        h1 &= LIMB_MASK;
        h2 += c;
        c = h2 >> 26;
        h2 &= LIMB_MASK;
        h3 += c;
        c = h3 >> 26;
        h3 &= LIMB_MASK;
        h4 += c;
        c = h4 >> 26;
        h4 &= LIMB_MASK;
        h0 += c * 5;
        c = h0 >> 26;
        h0 &= LIMB_MASK;
        h1 += c;

        // g = h + 5 - 2^130
        let mut g0 = h0.wrapping_add(5);
        c = g0 >> 26;
        g0 &= LIMB_MASK;
        let mut g1 = h1.wrapping_add(c);
        c = g1 >> 26;
        g1 &= LIMB_MASK;
        let mut g2 = h2.wrapping_add(c);
        c = g2 >> 26;
        g2 &= LIMB_MASK;
        let mut g3 = h3.wrapping_add(c);
        c = g3 >> 26;
        g3 &= LIMB_MASK;
        let mut g4 = h4.wrapping_add(c).wrapping_sub(1 << 26);

        // All ones when g did not borrow (h >= p), zero otherwise.
        let mask = (g4 >> 31).wrapping_sub(1);
        g0 &= mask;
        g1 &= mask;
        g2 &= mask;
        g3 &= mask;
        g4 &= mask;
        let keep = !mask;
        h0 = (h0 & keep) | g0;
        h1 = (h1 & keep) | g1;
        h2 = (h2 & keep) | g2;
        h3 = (h3 & keep) | g3;
        h4 = (h4 & keep) | g4;

        // h mod 2^128 as four 32-bit words.
        let words = [h0 | (h1 << 26), (h1 >> 6) | (h2 << 20), (h2 >> 12) | (h3 << 14), (h3 >> 18) | (h4 << 8)];

        let mut tag = [0u8; TAG_SIZE];
        let mut carry = 0u64;
        for ((out, word), s) in tag.chunks_exact_mut(4).zip(words).zip(self.s) {
            let sum = u64::from(word) + u64::from(s) + carry;
            out.copy_from_slice(&(sum as u32).to_le_bytes());
            carry = sum >> 32;
        }
        tag
    }

    /// h = (h + block) * r mod 2^130 - 5
    fn process_block(&mut self, block: &[u8; POLY1305_CHUNK_SIZE], hibit: u32) {
        let m = to_limbs(block);
        let [r0, r1, r2, r3, r4] = self.r.map(u64::from);
        let (s1, s2, s3, s4) = (r1 * 5, r2 * 5, r3 * 5, r4 * 5);

        let h0 = u64::from(self.h[0] + m[0]);
        let h1 = u64::from(self.h[1] + m[1]);
        let h2 = u64::from(self.h[2] + m[2]);
        let h3 = u64::from(self.h[3] + m[3]);
        let h4 = u64::from(self.h[4] + (m[4] | hibit));

        let d0 = h0 * r0 + h1 * s4 + h2 * s3 + h3 * s2 + h4 * s1;
        let mut d1 = h0 * r1 + h1 * r0 + h2 * s4 + h3 * s3 + h4 * s2;
        let mut d2 = h0 * r2 + h1 * r1 + h2 * r0 + h3 * s4 + h4 * s3;
        let mut d3 = h0 * r3 + h1 * r2 + h2 * r1 + h3 * r0 + h4 * s4;
        let mut d4 = h0 * r4 + h1 * r3 + h2 * r2 + h3 * r1 + h4 * r0;

        let mut c = d0 >> 26;
        let n0 = d0 & u64::from(LIMB_MASK);
        d1 += c;
        c = d1 >> 26;
        let n1 = (d1 as u32) & LIMB_MASK;
        d2 += c;
        c = d2 >> 26;
        let n2 = (d2 as u32) & LIMB_MASK;
        d3 += c;
        c = d3 >> 26;
        let n3 = (d3 as u32) & LIMB_MASK;
        d4 += c;
        c = d4 >> 26;
        let n4 = (d4 as u32) & LIMB_MASK;
        let n0 = n0 + c * 5;
        let carry = (n0 >> 26) as u32;

        self.h = [(n0 as u32) & LIMB_MASK, n1 + carry, n2, n3, n4];
    }
}

impl Drop for Poly1305 {
    fn drop(&mut self) {
        self.r.zeroize();
        self.h.zeroize();
        self.s.zeroize();
        self.buffer.zeroize();
    }
}

/// One-shot tag computation.
pub fn mac(message: &[u8], otk: &[u8; KEY_SIZE]) -> Tag {
    let mut poly = Poly1305::new(otk);
    poly.update(message);
    poly.finalize()
}

/// Verifies `expected` against the tag of `message` in constant time.
pub fn verify(message: &[u8], otk: &[u8; KEY_SIZE], expected: &Tag) -> bool {
    mac(message, otk).ct_eq(expected).into()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn key(r: [u8; 16], s: [u8; 16]) -> [u8; KEY_SIZE] {
        let mut otk = [0u8; KEY_SIZE];
        otk[..16].copy_from_slice(&r);
        otk[16..].copy_from_slice(&s);
        otk
    }

    #[test]
    fn test_rfc_vector() {
        // RFC 8439 §2.5.2
        let otk: [u8; KEY_SIZE] = [
            0x85, 0xd6, 0xbe, 0x78, 0x57, 0x55, 0x6d, 0x33, 0x7f, 0x44, 0x52, 0xfe, 0x42, 0xd5, 0x06, 0xa8, //
            0x01, 0x03, 0x80, 0x8a, 0xfb, 0x0d, 0xb2, 0xfd, 0x4a, 0xbf, 0xf6, 0xaf, 0x41, 0x49, 0xf5, 0x1b,
        ];
        let expected: Tag = [0xa8, 0x06, 0x1d, 0xc1, 0x30, 0x51, 0x36, 0xc6, 0xc2, 0x2b, 0x8b, 0xaf, 0x0c, 0x01, 0x27, 0xa9];

        let tag = mac(b"Cryptographic Forum Research Group", &otk);
        assert_eq!(tag, expected);
        assert!(verify(b"Cryptographic Forum Research Group", &otk, &expected));
        assert!(!verify(b"Cryptographic Forum Research Groups", &otk, &expected));
    }

    #[test]
    fn test_reduction_when_accumulator_exceeds_prime() {
        // r = 2, s = 0, m = 2^128 - 1: h = 2^130 - 2 = p + 3.
        let mut r = [0u8; 16];
        r[0] = 2;
        let tag = mac(&[0xff; 16], &key(r, [0; 16]));

        let mut expected = [0u8; TAG_SIZE];
        expected[0] = 3;
        assert_eq!(tag, expected);
    }

    #[test]
    fn test_final_addition_wraps_mod_2_128() {
        // r = 2, s = 2^128 - 1, m = 2: h = 2^129 + 4, plus s wraps to 3.
        let mut r = [0u8; 16];
        r[0] = 2;
        let mut message = [0u8; 16];
        message[0] = 2;
        let tag = mac(&message, &key(r, [0xff; 16]));

        let mut expected = [0u8; TAG_SIZE];
        expected[0] = 3;
        assert_eq!(tag, expected);
    }

    #[test]
    fn test_empty_message_is_s() {
        let s: [u8; 16] = std::array::from_fn(|i| i as u8 + 1);
        assert_eq!(mac(&[], &key([0x55; 16], s)), s);
    }

    #[test]
    fn test_pad_to_chunk_matches_explicit_zeros() {
        let otk = [0x3c; KEY_SIZE];

        let mut padded = Poly1305::new(&otk);
        padded.update(b"abc");
        padded.pad_to_chunk();
        padded.update(b"defghijklmnopqrstu");
        padded.pad_to_chunk();

        let mut explicit = b"abc".to_vec();
        explicit.resize(16, 0);
        explicit.extend_from_slice(b"defghijklmnopqrstu");
        explicit.resize(48, 0);

        assert_eq!(padded.finalize(), mac(&explicit, &otk));
    }

    proptest! {
        #[test]
        fn prop_streaming_matches_one_shot(message in proptest::collection::vec(any::<u8>(), 0..300), split in 0usize..300, otk in any::<[u8; KEY_SIZE]>()) {
            let split = split.min(message.len());
            let mut poly = Poly1305::new(&otk);
            poly.update(&message[..split]);
            poly.update(&message[split..]);
            prop_assert_eq!(poly.finalize(), mac(&message, &otk));
        }
    }
}
