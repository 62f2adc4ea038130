// AES Module - Main module file
// AES-128 (FIPS-197) with CBC chaining and PKCS7 padding

pub mod block;
pub mod cbc;
pub mod key_schedule;
pub mod keys;
pub mod padding;
pub mod sbox;

/// AES block size in bytes
pub const BLOCK_SIZE: usize = 16;

/// AES-128 key size in bytes
pub const KEY_SIZE: usize = 16;

/// Number of rounds for a 128-bit key
pub const ROUNDS: usize = 10;

/// One 16-byte unit of AES transformation
pub type Block = [u8; BLOCK_SIZE];

pub use key_schedule::RoundKeySchedule;
pub use keys::{InitializationVector, SymmetricKey};
pub use padding::{pkcs7_pad, pkcs7_unpad};
