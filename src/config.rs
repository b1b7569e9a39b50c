//! Runtime configuration from environment variables.

use std::path::PathBuf;

use crate::adapters::forest::ArtifactPolicy;
use crate::application::ScalerPolicy;
use crate::PredictorError;

pub const MODEL_PATH_ENV: &str = "PREDICTOR_MODEL_PATH";
pub const SCALER_POLICY_ENV: &str = "PREDICTOR_SCALER_POLICY";
pub const REQUIRE_SIGNED_ENV: &str = "PREDICTOR_REQUIRE_SIGNED_MODEL";
pub const PUBKEY_FILE_ENV: &str = "PREDICTOR_MODEL_PUBKEY_B64_FILE";
pub const LOG_MODE_ENV: &str = "PREDICTOR_LOG_MODE";
pub const LOG_FILE_ENV: &str = "PREDICTOR_LOG_FILE";

/// Where log output goes. The TUI owns the terminal, so `Auto` means
/// "file when interactive, stdout otherwise".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Auto,
    File,
    Stdout,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub model_dir: PathBuf,
    pub scaler_policy: ScalerPolicy,
    pub artifact_policy: ArtifactPolicy,
    pub log_mode: LogMode,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
            scaler_policy: ScalerPolicy::Auto,
            artifact_policy: ArtifactPolicy::default(),
            log_mode: LogMode::Auto,
            log_file: PathBuf::from("predictor.log"),
        }
    }
}

fn parse_bool(v: &str) -> bool {
    matches!(v, "1" | "true" | "TRUE" | "yes" | "YES")
}

impl Config {
    /// Read the process environment.
    ///
    /// # Errors
    /// Returns `PredictorError::Config` for unrecognized values.
    pub fn from_env() -> Result<Self, PredictorError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys fall back to defaults.
    ///
    /// # Errors
    /// Returns `PredictorError::Config` for unrecognized values.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PredictorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(dir) = lookup(MODEL_PATH_ENV) {
            config.model_dir = PathBuf::from(dir);
        }
        if let Some(policy) = lookup(SCALER_POLICY_ENV) {
            config.scaler_policy = policy.parse().map_err(PredictorError::Config)?;
        }
        if let Some(v) = lookup(REQUIRE_SIGNED_ENV) {
            config.artifact_policy.require_signature = parse_bool(v.trim());
        }
        if let Some(path) = lookup(PUBKEY_FILE_ENV) {
            config.artifact_policy.verifying_key_file = Some(PathBuf::from(path.trim()));
        }
        if let Some(mode) = lookup(LOG_MODE_ENV) {
            config.log_mode = match mode.trim() {
                "auto" => LogMode::Auto,
                "file" => LogMode::File,
                "stdout" => LogMode::Stdout,
                other => {
                    return Err(PredictorError::Config(format!(
                        "Unknown {LOG_MODE_ENV} '{other}' (expected auto, file or stdout)"
                    )))
                }
            };
        }
        if let Some(path) = lookup(LOG_FILE_ENV) {
            config.log_file = PathBuf::from(path);
        }

        Ok(config)
    }
}
