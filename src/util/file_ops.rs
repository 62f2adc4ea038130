// File Operations for hybrid encryption artifacts
// Handles reading and writing key files, envelopes and encrypted keys

use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::encoding::{decode_private_key, decode_public_key, encode_private_key, encode_public_key};
use crate::error::CryptoError;
use crate::hybrid::{EncryptedKey, SymmetricEnvelope};
use crate::rsa::{RsaKeyPair, RsaPrivateKey, RsaPublicKey};

/// Errors that can occur during file operations
#[derive(Debug, Error)]
pub enum FileError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} is not valid UTF-8 text")]
    NotText { path: PathBuf },

    #[error("Crypto error in {path}: {source}")]
    Crypto {
        path: PathBuf,
        #[source]
        source: CryptoError,
    },
}

/// Result type for file operations
pub type FileResult<T> = Result<T, FileError>;

/// File names used inside an output directory
#[derive(Clone, Debug)]
pub struct FileLayout {
    pub public_key: String,
    pub private_key: String,
    pub envelope: String,
    pub encrypted_key: String,
}

impl Default for FileLayout {
    fn default() -> Self {
        Self {
            public_key: "public.key".to_string(),
            private_key: "private.key".to_string(),
            envelope: "message.enc".to_string(),
            encrypted_key: "key.enc".to_string(),
        }
    }
}

impl FileLayout {
    pub fn with_envelope(mut self, name: impl Into<String>) -> Self {
        self.envelope = name.into();
        self
    }

    pub fn with_encrypted_key(mut self, name: impl Into<String>) -> Self {
        self.encrypted_key = name.into();
        self
    }

    pub fn public_key_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.public_key)
    }

    pub fn private_key_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.private_key)
    }

    pub fn envelope_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.envelope)
    }

    pub fn encrypted_key_path(&self, dir: &Path) -> PathBuf {
        dir.join(&self.encrypted_key)
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> FileError + '_ {
    move |source| FileError::Io { path: path.to_path_buf(), source }
}

fn crypto_error(path: &Path) -> impl FnOnce(CryptoError) -> FileError + '_ {
    move |source| FileError::Crypto { path: path.to_path_buf(), source }
}

/// Read entire file into memory
pub fn read_file(path: &Path) -> FileResult<Vec<u8>> {
    let mut file = File::open(path).map_err(io_error(path))?;
    let mut data = Vec::new();
    file.read_to_end(&mut data).map_err(io_error(path))?;
    Ok(data)
}

/// Write data to file, replacing any previous contents
pub fn write_file(path: &Path, data: &[u8]) -> FileResult<()> {
    let mut file = File::create(path).map_err(io_error(path))?;
    file.write_all(data).map_err(io_error(path))?;
    Ok(())
}

fn read_text(path: &Path) -> FileResult<String> {
    String::from_utf8(read_file(path)?).map_err(|_| FileError::NotText { path: path.to_path_buf() })
}

/// Write both halves of a key pair into `dir` and return their paths
pub fn save_keypair(
    keypair: &RsaKeyPair,
    dir: &Path,
    layout: &FileLayout,
) -> FileResult<(PathBuf, PathBuf)> {
    let public_path = layout.public_key_path(dir);
    let private_path = layout.private_key_path(dir);
    write_file(&public_path, encode_public_key(&keypair.public_key).as_bytes())?;
    write_file(&private_path, encode_private_key(&keypair.private_key).as_bytes())?;
    Ok((public_path, private_path))
}

pub fn load_public_key(path: &Path) -> FileResult<RsaPublicKey> {
    decode_public_key(&read_text(path)?).map_err(crypto_error(path))
}

pub fn load_private_key(path: &Path) -> FileResult<RsaPrivateKey> {
    decode_private_key(&read_text(path)?).map_err(crypto_error(path))
}

pub fn save_envelope(path: &Path, envelope: &SymmetricEnvelope) -> FileResult<()> {
    write_file(path, &envelope.to_bytes())
}

pub fn load_envelope(path: &Path) -> FileResult<SymmetricEnvelope> {
    SymmetricEnvelope::from_bytes(&read_file(path)?).map_err(crypto_error(path))
}

/// Store each block as a `key_size`-byte big-endian integer
pub fn save_encrypted_key(path: &Path, key: &EncryptedKey, key_size: usize) -> FileResult<()> {
    let bytes = key.to_bytes(key_size).map_err(crypto_error(path))?;
    write_file(path, &bytes)
}

pub fn load_encrypted_key(path: &Path, key_size: usize) -> FileResult<EncryptedKey> {
    EncryptedKey::from_bytes(&read_file(path)?, key_size).map_err(crypto_error(path))
}

/// Format file size for display
pub fn format_file_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
