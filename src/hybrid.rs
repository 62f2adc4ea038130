// Hybrid workflow
// AES-CBC protects the message, RSA protects the AES key

use std::fmt;

use subtle::ConstantTimeEq;
use tracing::info;

use crate::aes::{cbc, InitializationVector, SymmetricKey, BLOCK_SIZE};
use crate::error::{CryptoError, Engine, Result};
use crate::observe::{fingerprint, Event, Observer};
use crate::random::SecureRandomSource;
use crate::rsa::bigint::{from_bytes, to_bytes_fixed};
use crate::rsa::{
    decrypt_chunked, encrypt_chunked, generate_keypair_with, KeyGenConfig, RsaBigInt, RsaKeyPair,
    RsaPadding, RsaPrivateKey, RsaPublicKey,
};

/// IV followed by the CBC ciphertext, as stored in the symmetric ciphertext file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymmetricEnvelope {
    pub iv: InitializationVector,
    pub ciphertext: Vec<u8>,
}

impl SymmetricEnvelope {
    /// Serialize as `iv || ciphertext`
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BLOCK_SIZE + self.ciphertext.len());
        out.extend_from_slice(self.iv.as_bytes());
        out.extend_from_slice(&self.ciphertext);
        out
    }

    /// Split `iv || ciphertext`, checking the ciphertext is whole blocks
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 2 * BLOCK_SIZE || bytes.len() % BLOCK_SIZE != 0 {
            return Err(CryptoError::InvalidInputLength {
                engine: Engine::Aes,
                context: "envelope",
                expected: (bytes.len() / BLOCK_SIZE + 1).max(2) * BLOCK_SIZE,
                actual: bytes.len(),
            });
        }
        let (iv, ciphertext) = bytes.split_at(BLOCK_SIZE);
        Ok(Self {
            iv: InitializationVector::from_slice(iv)?,
            ciphertext: ciphertext.to_vec(),
        })
    }
}

/// The symmetric key after RSA encryption, one integer per padded block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedKey(pub Vec<RsaBigInt>);

impl EncryptedKey {
    /// Each block as a fixed-width big-endian integer of `key_size` bytes
    pub fn to_bytes(&self, key_size: usize) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.0.len() * key_size);
        for block in &self.0 {
            out.extend(to_bytes_fixed(block, key_size)?);
        }
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8], key_size: usize) -> Result<Self> {
        if key_size == 0 || bytes.is_empty() || bytes.len() % key_size != 0 {
            return Err(CryptoError::InvalidInputLength {
                engine: Engine::Rsa,
                context: "encrypted key",
                expected: key_size.max(1) * (bytes.len() / key_size.max(1) + 1),
                actual: bytes.len(),
            });
        }
        Ok(Self(bytes.chunks(key_size).map(from_bytes).collect()))
    }

    pub fn blocks(&self) -> usize {
        self.0.len()
    }
}

/// Encrypt `plaintext` under a fresh AES key, then wrap that key with RSA
pub fn hybrid_encrypt<R>(
    plaintext: &[u8],
    public_key: &RsaPublicKey,
    padding: RsaPadding,
    rng: &mut R,
) -> Result<(SymmetricEnvelope, EncryptedKey)>
where
    R: SecureRandomSource + ?Sized,
{
    let key = SymmetricKey::generate(rng);
    let iv = InitializationVector::generate(rng);
    let ciphertext = cbc::encrypt(plaintext, &key, &iv);
    let encrypted_key = EncryptedKey(encrypt_chunked(key.as_bytes(), public_key, padding, rng)?);
    Ok((SymmetricEnvelope { iv, ciphertext }, encrypted_key))
}

/// Unwrap the AES key with RSA, then decrypt the envelope with it
pub fn hybrid_decrypt(
    envelope: &SymmetricEnvelope,
    encrypted_key: &EncryptedKey,
    private_key: &RsaPrivateKey,
    padding: RsaPadding,
) -> Result<Vec<u8>> {
    let key_bytes = decrypt_chunked(&encrypted_key.0, private_key, padding)?;
    let key = SymmetricKey::from_slice(&key_bytes)?;
    cbc::decrypt(&envelope.ciphertext, &key, &envelope.iv)
}

/// Stages of one hybrid run, in the only order they may occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum WorkflowState {
    Idle,
    SymmetricKeyGenerated,
    MessageEncrypted,
    KeyEncrypted,
    KeyDecrypted,
    MessageDecrypted,
    Done,
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowState::Idle => "idle",
            WorkflowState::SymmetricKeyGenerated => "symmetric key generated",
            WorkflowState::MessageEncrypted => "message encrypted",
            WorkflowState::KeyEncrypted => "key encrypted",
            WorkflowState::KeyDecrypted => "key decrypted",
            WorkflowState::MessageDecrypted => "message decrypted",
            WorkflowState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Everything a completed run produced
#[derive(Debug, Clone)]
pub struct HybridOutcome {
    pub envelope: SymmetricEnvelope,
    pub encrypted_key: EncryptedKey,
    pub recovered_plaintext: Vec<u8>,
}

/// Settings for a complete run, key generation included
#[derive(Clone, Debug, Default)]
pub struct HybridConfig {
    pub keygen: KeyGenConfig,
}

impl HybridConfig {
    pub fn with_keygen(mut self, keygen: KeyGenConfig) -> Self {
        self.keygen = keygen;
        self
    }
}

/// Generate a key pair, then drive a [`HybridWorkflow`] over `plaintext` to `Done`
pub fn run_hybrid<R, O>(
    plaintext: &[u8],
    config: &HybridConfig,
    rng: &mut R,
    mut observer: O,
) -> Result<(RsaKeyPair, HybridOutcome)>
where
    R: SecureRandomSource + ?Sized,
    O: Observer,
{
    let keypair = generate_keypair_with(&config.keygen, rng)?;
    observer.record(&Event::KeyPairGenerated {
        modulus_bits: keypair.public_key.bit_length(),
        public_fingerprint: fingerprint(&keypair.public_key.e.to_bytes_be()),
        private_fingerprint: fingerprint(&keypair.private_key.d.to_bytes_be()),
    });

    let outcome = HybridWorkflow::new(
        plaintext,
        &keypair.public_key,
        &keypair.private_key,
        rng,
        observer,
    )
    .with_padding(config.keygen.padding)
    .run()?;
    Ok((keypair, outcome))
}

/// Encrypt-then-decrypt pipeline, one engine call per transition.
///
/// `Done` is only reached when the recovered plaintext equals the original.
pub struct HybridWorkflow<'a, R: ?Sized, O> {
    rng: &'a mut R,
    observer: O,
    padding: RsaPadding,
    public_key: &'a RsaPublicKey,
    private_key: &'a RsaPrivateKey,
    plaintext: &'a [u8],
    state: WorkflowState,
    symmetric_key: Option<SymmetricKey>,
    envelope: Option<SymmetricEnvelope>,
    encrypted_key: Option<EncryptedKey>,
    recovered_key: Option<SymmetricKey>,
    recovered_plaintext: Option<Vec<u8>>,
}

impl<'a, R, O> HybridWorkflow<'a, R, O>
where
    R: SecureRandomSource + ?Sized,
    O: Observer,
{
    pub fn new(
        plaintext: &'a [u8],
        public_key: &'a RsaPublicKey,
        private_key: &'a RsaPrivateKey,
        rng: &'a mut R,
        observer: O,
    ) -> Self {
        Self {
            rng,
            observer,
            padding: RsaPadding::for_key_size(public_key.key_size()),
            public_key,
            private_key,
            plaintext,
            state: WorkflowState::Idle,
            symmetric_key: None,
            envelope: None,
            encrypted_key: None,
            recovered_key: None,
            recovered_plaintext: None,
        }
    }

    /// Override the RSA padding profile chosen from the modulus width
    pub fn with_padding(mut self, padding: RsaPadding) -> Self {
        self.padding = padding;
        self
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Perform exactly one transition and return the new state
    pub fn step(&mut self) -> Result<WorkflowState> {
        let next = match self.state {
            WorkflowState::Idle => {
                let key = SymmetricKey::generate(&mut *self.rng);
                self.observer.record(&Event::SymmetricKeyGenerated {
                    fingerprint: fingerprint(key.as_bytes()),
                });
                self.symmetric_key = Some(key);
                WorkflowState::SymmetricKeyGenerated
            }
            WorkflowState::SymmetricKeyGenerated => {
                let key = self
                    .symmetric_key
                    .as_ref()
                    .ok_or(CryptoError::MissingArtifact("symmetric key"))?;
                let iv = InitializationVector::generate(&mut *self.rng);
                let ciphertext = cbc::encrypt(self.plaintext, key, &iv);
                self.observer.record(&Event::MessageEncrypted {
                    plaintext_len: self.plaintext.len(),
                    ciphertext_len: ciphertext.len(),
                });
                self.envelope = Some(SymmetricEnvelope { iv, ciphertext });
                WorkflowState::MessageEncrypted
            }
            WorkflowState::MessageEncrypted => {
                // The plaintext key is consumed here and never held again
                let key = self
                    .symmetric_key
                    .take()
                    .ok_or(CryptoError::MissingArtifact("symmetric key"))?;
                let blocks = encrypt_chunked(
                    key.as_bytes(),
                    self.public_key,
                    self.padding,
                    &mut *self.rng,
                )?;
                self.observer.record(&Event::KeyEncrypted { blocks: blocks.len() });
                self.encrypted_key = Some(EncryptedKey(blocks));
                WorkflowState::KeyEncrypted
            }
            WorkflowState::KeyEncrypted => {
                let encrypted = self
                    .encrypted_key
                    .as_ref()
                    .ok_or(CryptoError::MissingArtifact("encrypted key"))?;
                let key_bytes = decrypt_chunked(&encrypted.0, self.private_key, self.padding)?;
                let key = SymmetricKey::from_slice(&key_bytes)?;
                self.observer.record(&Event::KeyDecrypted {
                    fingerprint: fingerprint(key.as_bytes()),
                });
                self.recovered_key = Some(key);
                WorkflowState::KeyDecrypted
            }
            WorkflowState::KeyDecrypted => {
                let key = self
                    .recovered_key
                    .take()
                    .ok_or(CryptoError::MissingArtifact("recovered key"))?;
                let envelope = self
                    .envelope
                    .as_ref()
                    .ok_or(CryptoError::MissingArtifact("envelope"))?;
                let plaintext = cbc::decrypt(&envelope.ciphertext, &key, &envelope.iv)?;
                self.observer.record(&Event::MessageDecrypted {
                    plaintext_len: plaintext.len(),
                });
                self.recovered_plaintext = Some(plaintext);
                WorkflowState::MessageDecrypted
            }
            WorkflowState::MessageDecrypted => {
                let recovered = self
                    .recovered_plaintext
                    .as_deref()
                    .ok_or(CryptoError::MissingArtifact("recovered plaintext"))?;
                if !bool::from(recovered.ct_eq(self.plaintext)) {
                    return Err(CryptoError::SelfCheckFailed);
                }
                self.observer.record(&Event::SelfCheckPassed);
                WorkflowState::Done
            }
            WorkflowState::Done => WorkflowState::Done,
        };

        info!(from = %self.state, to = %next, "hybrid workflow transition");
        self.state = next;
        Ok(next)
    }

    /// Step until `Done` and hand back the artifacts
    pub fn run(mut self) -> Result<HybridOutcome> {
        while self.state != WorkflowState::Done {
            self.step()?;
        }

        match (self.envelope, self.encrypted_key, self.recovered_plaintext) {
            (Some(envelope), Some(encrypted_key), Some(recovered_plaintext)) => Ok(HybridOutcome {
                envelope,
                encrypted_key,
                recovered_plaintext,
            }),
            _ => Err(CryptoError::MissingArtifact("workflow outcome")),
        }
    }
}
