//! Signing utility for the predictor's model artifacts.
//!
//! Writes `manifest.json` (SHA-256 of `forest.json` and `scaler.json`) and an
//! Ed25519 signature over it (`model.sig`).
//!
//! # Usage
//!
//! ```bash
//! PREDICTOR_SIGNING_KEY_B64_FILE=seed.b64 cargo run --bin sign_model -- models
//! cargo run --bin sign_model -- models --new-key seed.b64
//! ```
//!
//! The base64 verifying key is printed on success; point
//! `PREDICTOR_MODEL_PUBKEY_B64_FILE` at a file containing it.

use std::env;
use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose;
use base64::Engine;
use ed25519_dalek::{Signature, Signer, SigningKey};
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use procrastination_predictor::adapters::forest::manifest::{MANIFEST_FILE, SIGNATURE_FILE};
use procrastination_predictor::adapters::forest::ArtifactManifest;

const KEY_FILE_ENV: &str = "PREDICTOR_SIGNING_KEY_B64_FILE";

#[derive(Zeroize, ZeroizeOnDrop)]
struct Seed([u8; 32]);

fn usage() -> String {
    "Usage: sign_model <model_dir> [--new-key <seed_path>] [--force]".to_string()
}

struct Args {
    model_dir: PathBuf,
    new_key: Option<PathBuf>,
    force: bool,
}

fn parse_args() -> Result<Args, String> {
    let mut args = env::args().skip(1);
    let mut model_dir: Option<PathBuf> = None;
    let mut new_key: Option<PathBuf> = None;
    let mut force = false;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--new-key" => {
                let v = args.next().ok_or_else(usage)?;
                new_key = Some(PathBuf::from(v));
            }
            "--force" => force = true,
            "-h" | "--help" => return Err(usage()),
            _ => {
                if model_dir.is_none() {
                    model_dir = Some(PathBuf::from(arg));
                } else {
                    return Err(usage());
                }
            }
        }
    }

    Ok(Args {
        model_dir: model_dir.ok_or_else(usage)?,
        new_key,
        force,
    })
}

fn decode_seed(b64: &str) -> Result<Seed, String> {
    let raw = Zeroizing::new(
        general_purpose::STANDARD
            .decode(b64.trim())
            .map_err(|e| format!("Invalid base64 in signing key: {e}"))?,
    );

    if raw.len() != 32 {
        return Err(format!(
            "Signing key seed must be 32 bytes after base64 decode (got {})",
            raw.len()
        ));
    }

    let mut seed = Seed([0u8; 32]);
    seed.0.copy_from_slice(&raw);
    Ok(seed)
}

fn read_seed() -> Result<Seed, String> {
    let path = env::var(KEY_FILE_ENV)
        .map_err(|_| format!("Missing signing key. Set {KEY_FILE_ENV} or pass --new-key."))?;
    let content = Zeroizing::new(
        fs::read_to_string(path.trim())
            .map_err(|e| format!("Failed reading signing key file: {e}"))?,
    );
    if content.trim().is_empty() {
        return Err("Empty signing key".to_string());
    }
    decode_seed(&content)
}

/// Generate a fresh seed and write it base64-encoded to `path`.
fn write_new_seed(path: &Path, force: bool) -> Result<Seed, String> {
    if path.exists() && !force {
        return Err(format!(
            "Refusing to overwrite existing file {path:?}. Use --force."
        ));
    }

    let mut seed = Seed([0u8; 32]);
    OsRng.fill_bytes(&mut seed.0);
    let seed_b64 = Zeroizing::new(general_purpose::STANDARD.encode(seed.0));

    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }

    let mut opts = fs::OpenOptions::new();
    opts.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        opts.mode(0o600);
    }

    let mut file = opts
        .open(path)
        .map_err(|e| format!("Failed to open {path:?}: {e}"))?;
    writeln!(file, "{}", seed_b64.as_str())
        .map_err(|e| format!("Failed to write {path:?}: {e}"))?;

    println!("Wrote signing seed (base64) to {path:?}");
    Ok(seed)
}

fn main() -> Result<(), String> {
    let args = parse_args()?;

    let seed = match &args.new_key {
        Some(path) => write_new_seed(path, args.force)?,
        None => read_seed()?,
    };
    let signing_key = SigningKey::from_bytes(&seed.0);
    drop(seed);

    let manifest = ArtifactManifest::for_dir(&args.model_dir).map_err(|e| e.to_string())?;
    let manifest_bytes = serde_json::to_vec_pretty(&manifest)
        .map_err(|e| format!("Failed to serialize {MANIFEST_FILE}: {e}"))?;

    let manifest_path = args.model_dir.join(MANIFEST_FILE);
    fs::write(&manifest_path, &manifest_bytes)
        .map_err(|e| format!("Failed to write {manifest_path:?}: {e}"))?;

    let sig: Signature = signing_key.sign(&manifest_bytes);
    let sig_path = args.model_dir.join(SIGNATURE_FILE);
    fs::write(&sig_path, sig.to_bytes())
        .map_err(|e| format!("Failed to write {sig_path:?}: {e}"))?;

    println!("Signed manifest: {manifest_path:?}");
    for (rel, digest) in &manifest.files {
        println!("  {rel}  sha256={digest}");
    }
    println!("Wrote signature: {sig_path:?}");
    println!(
        "PUBKEY (base64)={}",
        general_purpose::STANDARD.encode(signing_key.verifying_key().as_bytes())
    );

    Ok(())
}
