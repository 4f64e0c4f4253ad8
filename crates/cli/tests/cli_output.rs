use std::fs;
use std::process::Command;

fn smart_renamer() -> Command {
    Command::new(env!("CARGO_BIN_EXE_smart-renamer"))
}

#[test]
fn dry_run_json_stdout_is_only_json() {
    let temp = tempfile::tempdir().unwrap();
    let inbox = temp.path().join("inbox");
    fs::create_dir(&inbox).unwrap();
    fs::write(inbox.join("2023-05-회의록.pdf"), b"").unwrap();
    fs::write(inbox.join("2024-03-국어.pdf"), b"").unwrap();

    let out = smart_renamer()
        .current_dir(temp.path())
        .args(["apply", "--dry-run", "--json"])
        .arg(&inbox)
        .output()
        .unwrap();
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let parsed: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));
    assert!(inbox.join("2023-05-회의록.pdf").exists());
    assert!(!temp.path().join("logs").exists());
}
