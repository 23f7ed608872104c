use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt};
use usdm_study::{StudyProfile, parse_document};

pub const LOG_ENV: &str = "USDM_CHECK_LOG";

/// Exit status when the input or profile cannot be used at all.
pub const EXIT_UNUSABLE: i32 = 2;

/// Log to stderr so stdout carries only the report.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

pub fn sha256_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// A parsed input document and the digest of its bytes.
pub struct LoadedInput {
    pub path: PathBuf,
    pub sha256: String,
    pub document: Value,
}

pub fn load_input_or_exit(input: &str) -> LoadedInput {
    let path = PathBuf::from(input);
    let bytes = fs::read(&path).unwrap_or_else(|error| {
        eprintln!("error: failed to read {}: {error}", path.display());
        std::process::exit(EXIT_UNUSABLE);
    });
    let document = parse_document(&bytes, &path.display().to_string()).unwrap_or_else(|error| {
        eprintln!("error: {error}");
        std::process::exit(EXIT_UNUSABLE);
    });
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "input loaded");
    LoadedInput {
        sha256: sha256_bytes(&bytes),
        path,
        document,
    }
}

pub fn load_profile_or_exit(profile: Option<&str>) -> StudyProfile {
    let Some(path) = profile else {
        return StudyProfile::default();
    };
    StudyProfile::load(path).unwrap_or_else(|error| {
        eprintln!("error: {error}");
        std::process::exit(EXIT_UNUSABLE);
    })
}

pub fn render_json_or_exit(payload: &Value, what: &str) -> String {
    serde_json::to_string_pretty(payload).unwrap_or_else(|error| {
        eprintln!("error: failed to render {what} payload: {error}");
        std::process::exit(EXIT_UNUSABLE);
    })
}
