//! Artifact integrity: SHA-256 manifest and optional Ed25519 signature.
//!
//! `manifest.json` binds the exact bytes of `forest.json` and `scaler.json`.
//! `model.sig`, when present, is a signature over the manifest bytes made with
//! the key whose public half is configured at startup.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use ed25519_dalek::{Signature, Verifier, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::ModelError;

pub const FOREST_FILE: &str = "forest.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const MANIFEST_FILE: &str = "manifest.json";
pub const SIGNATURE_FILE: &str = "model.sig";

/// Allowed clock skew for `created_at`, in seconds.
const MAX_FUTURE_SKEW_SECS: i64 = 300;

/// How strictly artifacts are checked before loading.
#[derive(Debug, Clone, Default)]
pub struct ArtifactPolicy {
    /// Refuse artifacts without a valid `manifest.json` + `model.sig`.
    pub require_signature: bool,

    /// File holding the base64 Ed25519 verifying key.
    pub verifying_key_file: Option<PathBuf>,
}

/// Contents of `manifest.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactManifest {
    pub version: u32,
    pub created_at: i64,
    /// Relative file name -> lowercase SHA-256 hex
    pub files: BTreeMap<String, String>,
}

impl ArtifactManifest {
    /// Hash the bound artifacts found in `dir`.
    ///
    /// # Errors
    /// Returns `ModelError::Load` if either artifact cannot be read.
    pub fn for_dir(dir: &Path) -> Result<Self, ModelError> {
        let mut files = BTreeMap::new();
        for rel in [FOREST_FILE, SCALER_FILE] {
            let path = dir.join(rel);
            let bytes = fs::read(&path)
                .map_err(|e| ModelError::Load(format!("Failed to read {path:?}: {e}")))?;
            files.insert(rel.to_string(), sha256_hex(&bytes));
        }

        Ok(Self {
            version: 1,
            created_at: unix_now(),
            files,
        })
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

pub fn unix_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

// Constant-time compare for ASCII strings (used for SHA-256 hex digests).
fn constant_time_eq_str(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes().iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Decode a base64 Ed25519 verifying key.
///
/// # Errors
/// Returns `ModelError::Load` on bad base64, wrong length, or an invalid point.
pub fn verifying_key_from_b64(b64: &str) -> Result<VerifyingKey, ModelError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(b64.trim())
        .map_err(|_| ModelError::Load("Invalid public key base64".into()))?;
    let key: [u8; 32] = bytes
        .as_slice()
        .try_into()
        .map_err(|_| ModelError::Load("Invalid public key length (expected 32 bytes)".into()))?;
    VerifyingKey::from_bytes(&key).map_err(|_| ModelError::Load("Invalid verifying key".into()))
}

fn load_verifying_key(policy: &ArtifactPolicy) -> Result<VerifyingKey, ModelError> {
    let path = policy.verifying_key_file.as_ref().ok_or_else(|| {
        ModelError::Load(format!(
            "{SIGNATURE_FILE} present but no verifying key configured"
        ))
    })?;
    let b64 = fs::read_to_string(path)
        .map_err(|e| ModelError::Load(format!("Failed reading verifying key {path:?}: {e}")))?;
    verifying_key_from_b64(&b64)
}

fn verify_signature(
    manifest_bytes: &[u8],
    sig_path: &Path,
    policy: &ArtifactPolicy,
) -> Result<(), ModelError> {
    let sig_bytes = fs::read(sig_path)
        .map_err(|e| ModelError::Load(format!("Failed to read signature: {e}")))?;
    let sig_bytes: [u8; 64] = sig_bytes
        .as_slice()
        .try_into()
        .map_err(|_| ModelError::Load("Invalid signature length (expected 64 bytes)".into()))?;
    let signature = Signature::from_bytes(&sig_bytes);

    load_verifying_key(policy)?
        .verify(manifest_bytes, &signature)
        .map_err(|_| ModelError::Load("Invalid model signature".into()))
}

/// Check the artifacts in `dir` against their manifest and signature.
///
/// Returns `Ok(None)` when the directory carries no manifest and the policy
/// allows unsigned artifacts.
///
/// # Errors
/// Returns `ModelError::Load` on any integrity failure.
pub fn verify_artifacts(
    dir: &Path,
    policy: &ArtifactPolicy,
) -> Result<Option<ArtifactManifest>, ModelError> {
    let manifest_path = dir.join(MANIFEST_FILE);
    let sig_path = dir.join(SIGNATURE_FILE);

    if !manifest_path.exists() {
        if sig_path.exists() {
            return Err(ModelError::Load(format!(
                "{SIGNATURE_FILE} found without {MANIFEST_FILE}"
            )));
        }
        if policy.require_signature {
            return Err(ModelError::Load(format!(
                "Signed artifacts required but {MANIFEST_FILE} is missing in {dir:?}"
            )));
        }
        tracing::warn!("Loading unverified model artifacts from {:?} (no manifest)", dir);
        return Ok(None);
    }

    let manifest_bytes = fs::read(&manifest_path)
        .map_err(|e| ModelError::Load(format!("Failed to read manifest: {e}")))?;

    if sig_path.exists() {
        verify_signature(&manifest_bytes, &sig_path, policy)?;
        tracing::info!("Model manifest signature verified");
    } else if policy.require_signature {
        return Err(ModelError::Load(format!(
            "Signed artifacts required but {SIGNATURE_FILE} is missing in {dir:?}"
        )));
    } else {
        tracing::warn!("Model manifest is not signed; checking file hashes only");
    }

    let manifest: ArtifactManifest = serde_json::from_slice(&manifest_bytes)
        .map_err(|e| ModelError::Load(format!("Invalid {MANIFEST_FILE} format: {e}")))?;

    if manifest.version != 1 {
        return Err(ModelError::Load(format!(
            "Unsupported manifest version: {}",
            manifest.version
        )));
    }
    if manifest.created_at > unix_now() + MAX_FUTURE_SKEW_SECS {
        return Err(ModelError::Load("Manifest created_at is in the future".into()));
    }

    for required in [FOREST_FILE, SCALER_FILE] {
        if !manifest.files.contains_key(required) {
            return Err(ModelError::Load(format!(
                "{MANIFEST_FILE} must bind {required}"
            )));
        }
    }

    for (rel, expected_hex) in &manifest.files {
        let path = dir.join(rel);
        let bytes = fs::read(&path).map_err(|e| {
            ModelError::Load(format!(
                "Manifest references missing/unreadable file {path:?}: {e}"
            ))
        })?;
        if !constant_time_eq_str(&sha256_hex(&bytes), &expected_hex.to_ascii_lowercase()) {
            return Err(ModelError::Load(format!("File hash mismatch for {rel}")));
        }
    }

    tracing::info!("Model artifact hashes verified ({} files)", manifest.files.len());
    Ok(Some(manifest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};
    use rand::RngCore;
    use tempfile::tempdir;

    fn write_artifacts(dir: &Path) {
        fs::write(dir.join(FOREST_FILE), b"{\"forest\":true}").expect("write forest");
        fs::write(dir.join(SCALER_FILE), b"{\"scaler\":true}").expect("write scaler");
    }

    fn write_manifest(dir: &Path) -> Vec<u8> {
        let manifest = ArtifactManifest::for_dir(dir).expect("hash artifacts");
        let bytes = serde_json::to_vec_pretty(&manifest).expect("serialize");
        fs::write(dir.join(MANIFEST_FILE), &bytes).expect("write manifest");
        bytes
    }

    fn signing_key() -> SigningKey {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        SigningKey::from_bytes(&seed)
    }

    fn policy_for(dir: &Path, key: &SigningKey, require_signature: bool) -> ArtifactPolicy {
        let key_path = dir.join("pubkey.b64");
        let b64 = base64::engine::general_purpose::STANDARD.encode(key.verifying_key().to_bytes());
        fs::write(&key_path, b64).expect("write pubkey");
        ArtifactPolicy {
            require_signature,
            verifying_key_file: Some(key_path),
        }
    }

    #[test]
    fn test_unsigned_allowed_by_default() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path());

        let result = verify_artifacts(temp.path(), &ArtifactPolicy::default()).expect("ok");
        assert!(result.is_none());
    }

    #[test]
    fn test_unsigned_rejected_when_required() {
        let temp = tempdir().expect("tempdir");
        write_artifacts(temp.path());

        let policy = ArtifactPolicy {
            require_signature: true,
            verifying_key_file: None,
        };
        assert!(verify_artifacts(temp.path(), &policy).is_err());
    }

    #[test]
    fn test_manifest_hashes_checked() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        write_artifacts(dir);
        write_manifest(dir);

        let manifest = verify_artifacts(dir, &ArtifactPolicy::default())
            .expect("ok")
            .expect("manifest present");
        assert_eq!(manifest.files.len(), 2);

        // Tamper with a bound file.
        fs::write(dir.join(SCALER_FILE), b"{\"scaler\":false}").expect("tamper");
        let err = verify_artifacts(dir, &ArtifactPolicy::default()).expect_err("must fail");
        assert!(err.to_string().contains("hash mismatch"));
    }

    #[test]
    fn test_manifest_must_bind_both_artifacts() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        write_artifacts(dir);

        let mut manifest = ArtifactManifest::for_dir(dir).expect("hash");
        manifest.files.remove(SCALER_FILE);
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_vec(&manifest).expect("serialize"),
        )
        .expect("write manifest");

        let err = verify_artifacts(dir, &ArtifactPolicy::default()).expect_err("must fail");
        assert!(err.to_string().contains(SCALER_FILE));
    }

    #[test]
    fn test_signed_manifest_verifies() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        write_artifacts(dir);
        let manifest_bytes = write_manifest(dir);

        let key = signing_key();
        let signature: Signature = key.sign(&manifest_bytes);
        fs::write(dir.join(SIGNATURE_FILE), signature.to_bytes()).expect("write sig");

        let policy = policy_for(dir, &key, true);
        assert!(verify_artifacts(dir, &policy).expect("verified").is_some());
    }

    #[test]
    fn test_signature_from_other_key_rejected() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        write_artifacts(dir);
        let manifest_bytes = write_manifest(dir);

        let signature: Signature = signing_key().sign(&manifest_bytes);
        fs::write(dir.join(SIGNATURE_FILE), signature.to_bytes()).expect("write sig");

        let policy = policy_for(dir, &signing_key(), false);
        let err = verify_artifacts(dir, &policy).expect_err("must fail");
        assert!(err.to_string().contains("Invalid model signature"));
    }

    #[test]
    fn test_signature_without_key_rejected() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        write_artifacts(dir);
        let manifest_bytes = write_manifest(dir);

        let signature: Signature = signing_key().sign(&manifest_bytes);
        fs::write(dir.join(SIGNATURE_FILE), signature.to_bytes()).expect("write sig");

        assert!(verify_artifacts(dir, &ArtifactPolicy::default()).is_err());
    }

    #[test]
    fn test_future_manifest_rejected() {
        let temp = tempdir().expect("tempdir");
        let dir = temp.path();
        write_artifacts(dir);

        let mut manifest = ArtifactManifest::for_dir(dir).expect("hash");
        manifest.created_at = unix_now() + 3600;
        fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_vec(&manifest).expect("serialize"),
        )
        .expect("write manifest");

        assert!(verify_artifacts(dir, &ArtifactPolicy::default()).is_err());
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq_str("abc", "abc"));
        assert!(!constant_time_eq_str("abc", "abd"));
        assert!(!constant_time_eq_str("abc", "ab"));
    }
}
