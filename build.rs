//! Build script for lamco-motion-predict
//!
//! Stamps the replay banner with the commit, target triple and profile so
//! replay output can be traced back to the predictor build that produced it.

use std::env;
use std::process::Command;

fn git_commit() -> String {
    Command::new("git")
        .args(["describe", "--always", "--dirty", "--abbrev=10"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|hash| !hash.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn main() {
    println!("cargo:rustc-env=PREDICT_GIT_COMMIT={}", git_commit());

    // Cargo always sets these for build scripts
    let target = env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=PREDICT_BUILD_TARGET={}", target);
    println!("cargo:rustc-env=PREDICT_BUILD_PROFILE={}", profile);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=build.rs");
}
