use std::fs;
use std::path::PathBuf;

use assert_cmd::Command;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

// RFC 8032, section 7.1, TEST 1
const SECRET: &str = "9d61b19deffd5a60ba844af492ec2cc44449c5697b326919703bac031cae7f60";
const PUBLIC: &str = "d75a980182b10ab7d54bfed3c964073a0ee172f3daa62325af021a68f707511a";

const SHEET: &str = "\
build_uuid: 0102030405060708090a0b0c0d0e0f10
bridge_ip4: 10.0.0.1
prefix: 24
egress_nat: true
";

fn tool() -> Command {
    let mut cmd = Command::cargo_bin("nonos-manifest").unwrap();
    cmd.env_remove("NONOS_MANIFEST_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn sheet(dir: &TempDir, text: &str) -> PathBuf {
    let path = dir.path().join("facts.txt");
    fs::write(&path, text).unwrap();
    path
}

fn expected_manifest() -> Vec<u8> {
    let mut v = vec![0x46, 0x4D, 0x4F, 0x44, 1, 0, 1, 0, 16, 0, 0, 0, 0, 0, 0, 0];
    v.extend([0x03, 0x00, 0x10, 0x00]);
    v.extend(1..=16u8);
    v.extend([0x01, 0x00, 0x05, 0x00, 10, 0, 0, 1, 24]);
    v.extend([0x02, 0x00, 0x01, 0x00, 0x01]);
    v
}

fn pack(dir: &TempDir) -> PathBuf {
    let src = sheet(dir, SHEET);
    let out = dir.path().join("manifest.tlv");
    tool().arg("pack").arg(&src).arg(&out).assert().success();
    out
}

fn json_stdout(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.output().unwrap();
    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    serde_json::from_slice(&out.stdout).unwrap()
}

#[test]
fn pack_writes_exact_bytes() {
    let dir = TempDir::new().unwrap();
    let out = pack(&dir);
    assert_eq!(fs::read(out).unwrap(), expected_manifest());
}

#[test]
fn pack_without_uuid_exits_2_and_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let src = sheet(&dir, "bridge_ip4: 10.0.0.1\nprefix: 24\n");
    let out = dir.path().join("manifest.tlv");
    let assert = tool().arg("pack").arg(&src).arg(&out).assert().code(2);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("build_uuid"), "{}", stderr);
    assert!(!out.exists());
}

#[test]
fn pack_missing_source_exits_1() {
    let dir = TempDir::new().unwrap();
    tool()
        .arg("pack")
        .arg(dir.path().join("absent.txt"))
        .arg(dir.path().join("m.tlv"))
        .assert()
        .code(1);
}

#[test]
fn usage_errors_exit_1() {
    tool().assert().code(1);
    tool().arg("frobnicate").assert().code(1);
    tool().args(["sign", SECRET]).assert().code(1);
}

#[test]
fn help_and_version_exit_0() {
    tool().arg("--help").assert().success();
    tool().arg("--version").assert().success();
}

#[test]
fn sign_then_verify() {
    let dir = TempDir::new().unwrap();
    let manifest = pack(&dir);
    tool().arg("sign").arg(SECRET).arg(&manifest).assert().success();

    let sig = dir.path().join("manifest.sig");
    assert_eq!(fs::read(&sig).unwrap().len(), 64);

    let v = json_stdout(tool().arg("--json").arg("verify").arg(PUBLIC).arg(&manifest));
    assert_eq!(v["valid"], true);
}

#[test]
fn tampered_manifest_fails_verify() {
    let dir = TempDir::new().unwrap();
    let manifest = pack(&dir);
    tool().arg("sign").arg(SECRET).arg(&manifest).assert().success();

    let mut bytes = fs::read(&manifest).unwrap();
    bytes[40] ^= 0x01;
    fs::write(&manifest, &bytes).unwrap();

    let assert = tool().arg("verify").arg(PUBLIC).arg(&manifest).assert().code(2);
    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();
    assert!(stdout.contains("FAILED"), "{}", stdout);
}

#[test]
fn bad_key_exits_2_before_writing() {
    let dir = TempDir::new().unwrap();
    let manifest = pack(&dir);
    tool().arg("sign").arg("not-hex").arg(&manifest).assert().code(2);
    tool().arg("sign").arg("abcd").arg(&manifest).assert().code(2);
    assert!(!dir.path().join("manifest.sig").exists());

    // key is checked even when the files do not exist
    tool()
        .arg("verify")
        .arg("00")
        .arg(dir.path().join("missing.tlv"))
        .assert()
        .code(2);
}

#[test]
fn explicit_signature_path() {
    let dir = TempDir::new().unwrap();
    let manifest = pack(&dir);
    let sig = dir.path().join("detached.bin");
    tool().arg("sign").arg(SECRET).arg(&manifest).arg(&sig).assert().success();
    tool().arg("verify").arg(PUBLIC).arg(&manifest).arg(&sig).assert().success();
    // the conventional pairing does not exist
    tool().arg("verify").arg(PUBLIC).arg(&manifest).assert().code(1);
}

#[test]
fn inspect_json_reports_facts() {
    let dir = TempDir::new().unwrap();
    let manifest = pack(&dir);
    let v = json_stdout(tool().arg("inspect").arg(&manifest).arg("--json"));
    assert_eq!(v["len"], 50);
    assert_eq!(v["header"]["version"], 1);
    assert_eq!(v["header"]["sig_alg"], 1);
    assert_eq!(v["header"]["header_len"], 16);
    assert_eq!(v["header"]["reserved"], 0);
    assert_eq!(v["facts"]["build_uuid"], "01020304-0506-0708-090a-0b0c0d0e0f10");
    assert_eq!(v["facts"]["bridge_ipv4"], "10.0.0.1");
    assert_eq!(v["facts"]["prefix"], 24);
    assert_eq!(v["facts"]["egress_nat"], true);
}

#[test]
fn inspect_rejects_bad_magic() {
    let dir = TempDir::new().unwrap();
    let manifest = pack(&dir);
    let mut bytes = fs::read(&manifest).unwrap();
    bytes[0] = b'X';
    fs::write(&manifest, &bytes).unwrap();
    let assert = tool().arg("inspect").arg(&manifest).assert().code(2);
    let stderr = String::from_utf8_lossy(&assert.get_output().stderr).to_string();
    assert!(stderr.contains("bad magic"), "{}", stderr);
}

#[test]
fn provision_uses_configured_names() {
    let dir = TempDir::new().unwrap();
    let src = sheet(&dir, SHEET);
    let cfg = dir.path().join("manifest.toml");
    fs::write(&cfg, "[output]\nmanifest_file = \"d0.tlv\"\nsignature_file = \"d0.sig\"\n").unwrap();
    let esp = dir.path().join("esp");

    let v = json_stdout(
        tool()
            .arg("--json")
            .arg("--config")
            .arg(&cfg)
            .arg("provision")
            .arg(&src)
            .arg(&esp)
            .arg(SECRET),
    );
    assert_eq!(v["public_key"], PUBLIC);
    assert_eq!(fs::read(esp.join("d0.tlv")).unwrap(), expected_manifest());

    tool()
        .arg("verify")
        .arg(PUBLIC)
        .arg(esp.join("d0.tlv"))
        .arg(esp.join("d0.sig"))
        .assert()
        .success();
}

#[test]
fn provision_defaults_pair_by_filename() {
    let dir = TempDir::new().unwrap();
    let src = sheet(&dir, SHEET);
    let esp = dir.path().join("esp");
    tool().arg("provision").arg(&src).arg(&esp).arg(SECRET).assert().success();
    assert!(esp.join("manifest.tlv").is_file());
    tool().arg("verify").arg(PUBLIC).arg(esp.join("manifest.tlv")).assert().success();
}

#[test]
fn env_config_is_honoured_and_validated() {
    let dir = TempDir::new().unwrap();
    let manifest = pack(&dir);
    let cfg = dir.path().join("bad.toml");
    fs::write(&cfg, "[output]\nmanifest_file = \"../escape.tlv\"\n").unwrap();
    tool()
        .env("NONOS_MANIFEST_CONFIG", &cfg)
        .arg("inspect")
        .arg(&manifest)
        .assert()
        .code(1);
}
