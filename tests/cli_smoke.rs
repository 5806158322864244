mod support;

use std::path::PathBuf;

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_simreel")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "simreel.exe"
            } else {
                "simreel"
            });
            p
        })
}

#[test]
fn cli_init_config_writes_loadable_defaults() {
    let dir = support::temp_root("cli_init");
    let out = dir.join("reel.json");

    let status = std::process::Command::new(exe())
        .args(["init-config", "--out"])
        .arg(&out)
        .status()
        .unwrap();

    assert!(status.success());
    let cfg = simreel::ReelConfig::load(&out).unwrap();
    assert_eq!(cfg, simreel::ReelConfig::default());
}

#[test]
fn cli_frames_with_block_text() {
    let root = support::temp_root("cli_frames");
    support::write_sources(&root, &[0, 1], &[0, 1], &[0, 1]);
    std::fs::write(root.join("reel.json"), r#"{ "input": { "frame_count": 2 } }"#).unwrap();

    let status = std::process::Command::new(exe())
        .args(["frames", "--block-text", "--config"])
        .arg(root.join("reel.json"))
        .status()
        .unwrap();

    assert!(status.success());
    let frames = root.join("processed_images");
    assert!(frames.join("processed_000.jpg").exists());
    assert!(frames.join("processed_001.jpg").exists());
}

#[test]
fn cli_frame_fails_without_font() {
    let root = support::temp_root("cli_no_font");
    support::write_sources(&root, &[0], &[0], &[0]);
    let out = root.join("one.png");

    let output = std::process::Command::new(exe())
        .args(["frame", "--index", "0", "--root"])
        .arg(&root)
        .arg("--out")
        .arg(&out)
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("asset load error"));
    assert!(!out.exists());
}
