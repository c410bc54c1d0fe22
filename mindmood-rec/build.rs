//! Stamps GIT_HASH, BUILD_TIMESTAMP and BUILD_PROFILE into the binary
//! for `/api/buildinfo` and the startup log line.

use std::process::Command;

const UNKNOWN: &str = "unknown";

fn git_short_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string()).filter(|hash| !hash.is_empty())
}

fn emit(key: &str, value: &str) {
    println!("cargo:rustc-env={}={}", key, value);
}

fn main() {
    let hash = git_short_hash().unwrap_or_else(|| UNKNOWN.to_string());
    let stamp = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| UNKNOWN.to_string());

    emit("GIT_HASH", &hash);
    emit("BUILD_TIMESTAMP", &stamp);
    emit("BUILD_PROFILE", &profile);
}
