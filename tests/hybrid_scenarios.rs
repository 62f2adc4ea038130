//! End-to-end scenarios across the AES, RSA and hybrid layers

use hybrid_crypt::aes::cbc;
use hybrid_crypt::rsa::{decrypt_chunked, encrypt_block, encrypt_chunked, generate_keypair_with};
use hybrid_crypt::util::file_ops::{
    load_encrypted_key, load_envelope, load_private_key, load_public_key, save_encrypted_key,
    save_envelope, save_keypair, FileLayout,
};
use hybrid_crypt::{
    aes_decrypt, aes_encrypt, generate_symmetric_key, hybrid_decrypt, hybrid_encrypt,
    rsa_decrypt, rsa_encrypt, rsa_generate_keypair, CryptoError, Engine, InitializationVector,
    KeyGenConfig, RsaBigInt, RsaPadding, RsaPublicKey, Stage, SymmetricKey,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn sequential_key() -> SymmetricKey {
    SymmetricKey::new(core::array::from_fn(|i| i as u8))
}

fn sequential_iv() -> InitializationVector {
    InitializationVector::new(core::array::from_fn(|i| 0x10 + i as u8))
}

#[test]
fn hello_world_fixed_key_and_iv() {
    let ciphertext = cbc::encrypt(b"HELLO WORLD", &sequential_key(), &sequential_iv());
    assert_eq!(hex::encode(&ciphertext), "dc3c4af31e3d7c40b10c7c3879ecdaa3");

    let plaintext = aes_decrypt(&ciphertext, &sequential_key(), &sequential_iv()).unwrap();
    assert_eq!(plaintext, b"HELLO WORLD");
}

#[test]
fn aes_boundary_calls_roundtrip() {
    let mut rng = ChaCha20Rng::seed_from_u64(21);
    let key = generate_symmetric_key(&mut rng);
    let (iv, ciphertext) = aes_encrypt(b"sixteen byte msg", &key, &mut rng);

    // A full block of input gains a full block of padding
    assert_eq!(ciphertext.len(), 32);
    assert_eq!(aes_decrypt(&ciphertext, &key, &iv).unwrap(), b"sixteen byte msg");
}

#[test]
fn inconsistent_padding_is_rejected() {
    let key = sequential_key();
    let iv = sequential_iv();

    // Last byte claims three bytes of padding but only one matches
    let mut block = [0x41u8; 16];
    block[13] = 0x07;
    block[14] = 0x01;
    block[15] = 0x03;
    let ciphertext = cbc::encrypt_unpadded(&block, &key, &iv).unwrap();

    let err = aes_decrypt(&ciphertext, &key, &iv).unwrap_err();
    assert!(matches!(err, CryptoError::Padding { engine: Engine::Aes, .. }));
    assert_eq!(err.stage(), Stage::PaddingValidation);
}

#[test]
fn symmetric_key_through_64_bit_rsa() {
    let mut rng = ChaCha20Rng::seed_from_u64(22);
    let keypair = rsa_generate_keypair(64, &mut rng).unwrap();
    assert_eq!(keypair.public_key.bit_length(), 64);

    let key = generate_symmetric_key(&mut rng);
    let padding = RsaPadding::for_key_size(keypair.public_key.key_size());
    assert_eq!(padding, RsaPadding::COMPACT);

    let blocks = encrypt_chunked(key.as_bytes(), &keypair.public_key, padding, &mut rng).unwrap();
    assert_eq!(blocks.len(), 6);
    for block in &blocks {
        assert!(block < &keypair.public_key.n);
    }

    let recovered = decrypt_chunked(&blocks, &keypair.private_key, padding).unwrap();
    assert_eq!(recovered.as_slice(), key.as_bytes());
}

#[test]
fn single_block_rsa_refuses_oversized_payload() {
    let mut rng = ChaCha20Rng::seed_from_u64(23);
    let keypair = rsa_generate_keypair(64, &mut rng).unwrap();

    let c = rsa_encrypt(b"abc", &keypair.public_key, &mut rng).unwrap();
    assert_eq!(rsa_decrypt(&c, &keypair.private_key).unwrap(), b"abc");

    let err = rsa_encrypt(b"abcd", &keypair.public_key, &mut rng).unwrap_err();
    assert_eq!(
        err,
        CryptoError::InvalidInputLength {
            engine: Engine::Rsa,
            context: "payload",
            expected: 3,
            actual: 4,
        }
    );
}

#[test]
fn narrow_loaded_modulus_is_rejected_not_padded() {
    let mut rng = ChaCha20Rng::seed_from_u64(27);

    // 3233 = 61 * 53 is two bytes wide, below the padding overhead
    let tiny = RsaPublicKey { n: RsaBigInt::from(3233u32), e: RsaBigInt::from(17u32) };
    assert!(matches!(
        rsa_encrypt(b"", &tiny, &mut rng),
        Err(CryptoError::InvalidInputLength { engine: Engine::Rsa, .. })
    ));

    // Four bytes still cannot hold the two-byte minimum filler
    let narrow = RsaPublicKey {
        n: RsaBigInt::from(65537u64 * 65539),
        e: RsaBigInt::from(65537u32),
    };
    assert!(matches!(
        encrypt_block(b"", &narrow, RsaPadding::COMPACT, &mut rng),
        Err(CryptoError::InvalidInputLength { engine: Engine::Rsa, .. })
    ));
}

#[test]
fn wide_key_holds_symmetric_key_in_one_block() {
    let mut rng = ChaCha20Rng::seed_from_u64(24);
    let keypair = generate_keypair_with(&KeyGenConfig::standard(512), &mut rng).unwrap();
    let key = generate_symmetric_key(&mut rng);

    let c = rsa_encrypt(key.as_bytes(), &keypair.public_key, &mut rng).unwrap();
    assert_eq!(rsa_decrypt(&c, &keypair.private_key).unwrap().as_slice(), key.as_bytes());
}

#[test]
fn padding_filler_varies_between_encryptions() {
    let mut rng = ChaCha20Rng::seed_from_u64(25);
    let keypair = generate_keypair_with(&KeyGenConfig::standard(256), &mut rng).unwrap();

    let first = rsa_encrypt(b"same payload", &keypair.public_key, &mut rng).unwrap();
    let second = rsa_encrypt(b"same payload", &keypair.public_key, &mut rng).unwrap();
    assert_ne!(first, second);
}

#[test]
fn files_on_disk_decrypt_to_original() {
    let dir = tempfile::tempdir().unwrap();
    let layout = FileLayout::default();
    let mut rng = ChaCha20Rng::seed_from_u64(26);
    let plaintext = b"The quick brown fox jumps over the lazy dog".to_vec();

    let keypair = rsa_generate_keypair(64, &mut rng).unwrap();
    let (public_path, private_path) = save_keypair(&keypair, dir.path(), &layout).unwrap();

    // Sender side: only the public key file is available
    let public_key = load_public_key(&public_path).unwrap();
    let padding = RsaPadding::for_key_size(public_key.key_size());
    let (envelope, encrypted_key) =
        hybrid_encrypt(&plaintext, &public_key, padding, &mut rng).unwrap();
    save_envelope(&layout.envelope_path(dir.path()), &envelope).unwrap();
    let key_path = layout.encrypted_key_path(dir.path());
    save_encrypted_key(&key_path, &encrypted_key, public_key.key_size()).unwrap();

    // Receiver side
    let private_key = load_private_key(&private_path).unwrap();
    let envelope = load_envelope(&layout.envelope_path(dir.path())).unwrap();
    let encrypted_key = load_encrypted_key(&key_path, private_key.key_size()).unwrap();

    let recovered = hybrid_decrypt(&envelope, &encrypted_key, &private_key, padding).unwrap();
    assert_eq!(recovered, plaintext);
}
