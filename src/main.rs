use std::fs;
use std::path::PathBuf;
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use hybrid_crypt::observe::fingerprint;
use hybrid_crypt::rsa::generate_keypair;
use hybrid_crypt::util::file_ops::{
    format_file_size, load_encrypted_key, load_envelope, load_private_key, load_public_key,
    read_file, save_encrypted_key, save_envelope, save_keypair, write_file, FileLayout,
};
use hybrid_crypt::{
    hybrid_decrypt, hybrid_encrypt, run_hybrid, system_rng, Event, HybridConfig, KeyGenConfig,
    Observer, RsaPadding, TracingObserver,
};

// ── CLI Arguments ─────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "hybrid-crypt",
    version,
    about = "Educational AES-128-CBC + RSA hybrid encryption"
)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an RSA key pair and write public.key / private.key
    Keygen {
        /// Modulus bit width
        #[arg(long, default_value_t = 64)]
        bits: u32,

        /// Directory to write the key files into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Encrypt a file under a fresh AES key wrapped with an RSA public key
    Encrypt {
        #[arg(long)]
        input: PathBuf,

        #[arg(long)]
        public_key: PathBuf,

        /// Directory to write message.enc and key.enc into
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },

    /// Recover a file from its envelope and encrypted key
    Decrypt {
        #[arg(long)]
        private_key: PathBuf,

        #[arg(long)]
        envelope: PathBuf,

        #[arg(long)]
        encrypted_key: PathBuf,

        #[arg(long)]
        output: PathBuf,
    },

    /// Run the whole workflow in memory and report every stage
    Roundtrip {
        #[arg(long)]
        input: PathBuf,

        /// Modulus bit width
        #[arg(long, default_value_t = 64)]
        bits: u32,
    },
}

// ── Entry Point ───────────────────────────────────────────────────────────────

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hybrid_crypt=info".into()),
        )
        .init();

    if let Err(e) = run(Args::parse()) {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let mut rng = system_rng();
    let layout = FileLayout::default();

    match args.command {
        Command::Keygen { bits, out_dir } => {
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("creating {}", out_dir.display()))?;

            let keypair = generate_keypair(bits, &mut rng).context("key generation failed")?;
            TracingObserver.record(&Event::KeyPairGenerated {
                modulus_bits: keypair.public_key.bit_length(),
                public_fingerprint: fingerprint(&keypair.public_key.e.to_bytes_be()),
                private_fingerprint: fingerprint(&keypair.private_key.d.to_bytes_be()),
            });

            let (public_path, private_path) = save_keypair(&keypair, &out_dir, &layout)?;
            info!(
                public = %public_path.display(),
                private = %private_path.display(),
                "key files written"
            );
        }

        Command::Encrypt { input, public_key, out_dir } => {
            let public_key = load_public_key(&public_key)?;
            let plaintext = read_file(&input)?;
            fs::create_dir_all(&out_dir)
                .with_context(|| format!("creating {}", out_dir.display()))?;

            let padding = RsaPadding::for_key_size(public_key.key_size());
            let (envelope, encrypted_key) =
                hybrid_encrypt(&plaintext, &public_key, padding, &mut rng)
                    .with_context(|| format!("encrypting {}", input.display()))?;

            let envelope_path = layout.envelope_path(&out_dir);
            let key_path = layout.encrypted_key_path(&out_dir);
            save_envelope(&envelope_path, &envelope)?;
            save_encrypted_key(&key_path, &encrypted_key, public_key.key_size())?;

            info!(
                input = %format_file_size(plaintext.len() as u64),
                envelope = %envelope_path.display(),
                key_blocks = encrypted_key.blocks(),
                "file encrypted"
            );
        }

        Command::Decrypt { private_key, envelope, encrypted_key, output } => {
            let private_key = load_private_key(&private_key)?;
            let envelope = load_envelope(&envelope)?;
            let encrypted_key = load_encrypted_key(&encrypted_key, private_key.key_size())?;

            let padding = RsaPadding::for_key_size(private_key.key_size());
            let plaintext = hybrid_decrypt(&envelope, &encrypted_key, &private_key, padding)
                .map_err(|e| anyhow::anyhow!("{} (stage: {:?})", e, e.stage()))?;

            write_file(&output, &plaintext)?;
            info!(
                output = %output.display(),
                size = %format_file_size(plaintext.len() as u64),
                "file decrypted"
            );
        }

        Command::Roundtrip { input, bits } => {
            let plaintext = read_file(&input)?;
            let key_size = bits.div_ceil(8) as usize;
            let config = HybridConfig::default().with_keygen(
                KeyGenConfig::default()
                    .with_bit_width(bits)
                    .with_padding(RsaPadding::for_key_size(key_size)),
            );

            let (_, outcome) = run_hybrid(&plaintext, &config, &mut rng, TracingObserver)
                .map_err(|e| anyhow::anyhow!("{} (stage: {:?})", e, e.stage()))?;

            info!(
                ciphertext = %hex::encode(outcome.envelope.to_bytes()),
                key_blocks = outcome.encrypted_key.blocks(),
                "round trip complete"
            );
        }
    }

    Ok(())
}
