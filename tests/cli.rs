//! Command-line front end tests.
//!
//! Run the built `selsign` binary with an isolated configuration directory.

mod common;

use common::{generate_keys, write_file};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn selsign(home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_selsign"))
        .args(args)
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join(".config"))
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn list_shows_builtin_signaturelet() {
    let home = TempDir::new().unwrap();
    let output = selsign(home.path(), &["list"]);

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("SELoader: SELoader PKCS#7 signature"), "{stdout}");
    assert!(stdout.contains("+.p7s"), "{stdout}");
}

#[test]
fn sign_then_inspect() {
    let keys = generate_keys();
    let home = TempDir::new().unwrap();
    let input = write_file(home.path(), "image.bin", b"0123456789");
    let signature = home.path().join("image.bin.p7a");

    let output = selsign(
        home.path(),
        &[
            "sign",
            "--key",
            keys.key.to_str().unwrap(),
            "--cert",
            keys.cert.to_str().unwrap(),
            input.to_str().unwrap(),
        ],
    );
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(signature.exists());

    let output = selsign(home.path(), &["inspect", signature.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("HashAlgorithm"), "{stdout}");
    assert!(stdout.contains("Sha256"), "{stdout}");
    assert!(stdout.contains("Content"), "{stdout}");
}

#[test]
fn digest_algorithm_selects_container_hash() {
    let keys = generate_keys();
    let home = TempDir::new().unwrap();
    let input = write_file(home.path(), "bzImage", b"kernel image bytes");
    let signature = home.path().join("bzImage.p7a");

    let output = selsign(
        home.path(),
        &[
            "sign",
            "--digest-alg",
            "sha384",
            "--key",
            keys.key.to_str().unwrap(),
            "--cert",
            keys.cert.to_str().unwrap(),
            input.to_str().unwrap(),
        ],
    );
    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );

    let output = selsign(home.path(), &["inspect", signature.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Sha384"), "{stdout}");
    assert!(stdout.contains("size 48"), "{stdout}");
}

#[test]
fn unsupported_algorithms_exit_with_failure() {
    let keys = generate_keys();
    let home = TempDir::new().unwrap();
    let input = write_file(home.path(), "bzImage", b"kernel image bytes");

    for (option, value) in [("--digest-alg", "md5"), ("--cipher-alg", "ecdsa")] {
        let output = selsign(
            home.path(),
            &[
                "sign",
                option,
                value,
                "--key",
                keys.key.to_str().unwrap(),
                "--cert",
                keys.cert.to_str().unwrap(),
                input.to_str().unwrap(),
            ],
        );
        assert!(!output.status.success(), "{option} {value}");
    }
    assert!(!home.path().join("bzImage.p7a").exists());
}

#[test]
fn conflicting_flags_exit_with_failure() {
    let home = TempDir::new().unwrap();
    let output = selsign(
        home.path(),
        &["sign", "--detached-signature", "--attached-content", "missing.bin"],
    );

    assert!(!output.status.success());
    assert!(!home.path().join("missing.bin.p7a").exists());
}

#[test]
fn config_set_and_export() {
    let home = TempDir::new().unwrap();

    let output = selsign(home.path(), &["config", "set", "signaturelet", "Custom"]);
    assert!(output.status.success());

    let output = selsign(home.path(), &["config", "export", "--format", "json"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"signaturelet\": \"Custom\""), "{stdout}");
}
