// RSA Module - Main module file
// Exports all RSA-related functionality

pub mod bigint;
pub mod decrypt;
pub mod encrypt;
pub mod keygen;
pub mod padding;
pub mod prime;

pub use bigint::RsaBigInt;
pub use decrypt::{decrypt_block, decrypt_chunked};
pub use encrypt::{encrypt_block, encrypt_chunked};
pub use keygen::{
    generate_keypair, generate_keypair_with, KeyGenConfig, RsaKeyPair, RsaPrivateKey, RsaPublicKey,
};
pub use padding::RsaPadding;
pub use prime::{is_probable_prime, random_prime};
