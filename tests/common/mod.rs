#![cfg(unix)]
// Fake extractor processes for session-level tests: small shell scripts that
// answer like the native binary would, without needing any OS automation
// APIs.

use std::fs;
use std::path::{Path, PathBuf};

/// Write an executable shell script standing in for the native extractor.
pub fn fake_extractor(dir: &Path, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-extractor.sh");
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();

    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

/// Script body that prints `json` and exits with `code`, whatever the args.
/// The JSON must not contain single quotes.
pub fn respond_with(json: &str, code: i32) -> String {
    format!("printf '%s' '{}'\nexit {}", json, code)
}
