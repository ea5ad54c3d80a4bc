use std::process::Command;

fn main() {
    // Surfaced by `selsign --version`.
    println!("cargo:rustc-env=LIBSIGN_GIT_COMMIT={}", git_commit());
    println!("cargo:rustc-env=LIBSIGN_BUILD_MACHINE={}", build_machine());
    println!("cargo:rerun-if-changed=.git/HEAD");

    if !cfg!(target_os = "windows") && !has_system_openssl() {
        println!("cargo:warning=OpenSSL not found via pkg-config; openssl-sys will probe further");
    }
}

fn git_commit() -> String {
    Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| String::from_utf8_lossy(&o.stdout).trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

fn build_machine() -> String {
    let host = std::env::var("HOST").unwrap_or_else(|_| "unknown".to_string());
    Command::new("uname")
        .arg("-n")
        .output()
        .ok()
        .filter(|o| o.status.success())
        .map(|o| format!("{} ({host})", String::from_utf8_lossy(&o.stdout).trim()))
        .unwrap_or(host)
}

fn has_system_openssl() -> bool {
    Command::new("pkg-config")
        .args(["--exists", "openssl"])
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}
