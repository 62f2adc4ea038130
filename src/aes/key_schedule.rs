// AES-128 key expansion

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::keys::SymmetricKey;
use super::sbox::SBOX;
use super::{Block, ROUNDS};

/// Round constants for AES-128 key expansion (index 0 unused)
const RCON: [u32; 11] = [
    0x00000000, 0x01000000, 0x02000000, 0x04000000, 0x08000000, 0x10000000, 0x20000000,
    0x40000000, 0x80000000, 0x1b000000, 0x36000000,
];

/// Number of 32-bit words in the expanded key
const WORDS: usize = 4 * (ROUNDS + 1);

/// Substitutes each byte of a word through the S-box
#[inline(always)]
fn sub_word(word: u32) -> u32 {
    let b = word.to_be_bytes();
    u32::from_be_bytes([
        SBOX[b[0] as usize],
        SBOX[b[1] as usize],
        SBOX[b[2] as usize],
        SBOX[b[3] as usize],
    ])
}

/// The 11 round keys derived from one 128-bit key
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RoundKeySchedule {
    round_keys: [Block; ROUNDS + 1],
}

impl RoundKeySchedule {
    /// Expand a 16-byte key into 11 round keys
    pub fn expand(key: &SymmetricKey) -> Self {
        let key = key.as_bytes();
        let mut words = [0u32; WORDS];

        for (i, chunk) in key.chunks_exact(4).enumerate() {
            words[i] = u32::from_be_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        for i in 4..WORDS {
            let mut temp = words[i - 1];
            if i % 4 == 0 {
                temp = sub_word(temp.rotate_left(8)) ^ RCON[i / 4];
            }
            words[i] = words[i - 4] ^ temp;
        }

        let mut round_keys = [[0u8; 16]; ROUNDS + 1];
        for (round, round_key) in round_keys.iter_mut().enumerate() {
            for col in 0..4 {
                let word = words[round * 4 + col].to_be_bytes();
                round_key[col * 4..col * 4 + 4].copy_from_slice(&word);
            }
        }

        words.zeroize();
        Self { round_keys }
    }

    /// Round key for `round` in 0..=10
    pub fn round_key(&self, round: usize) -> &Block {
        &self.round_keys[round]
    }

    /// All round keys in order
    pub fn round_keys(&self) -> &[Block; ROUNDS + 1] {
        &self.round_keys
    }
}
