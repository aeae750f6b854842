use std::process::Command;

fn temp_path(label: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "maw-cli-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

#[test]
fn cli_list_policies_writes_output() {
    let exe = env!("CARGO_BIN_EXE_maw-tester");
    let output_path = temp_path("list");
    let status = Command::new(exe)
        .args(["--list-policies", "--output"])
        .arg(&output_path)
        .status()
        .expect("run cli");
    assert!(status.success());
    let content = std::fs::read_to_string(output_path).expect("read output");
    assert!(content.contains("Available policies"));
    assert!(content.contains("rarest"));
}

#[test]
fn cli_json_report_and_save() {
    let exe = env!("CARGO_BIN_EXE_maw-tester");
    let output_path = temp_path("run.json");
    let save_dir = temp_path("save");
    let output = Command::new(exe)
        .args([
            "--report",
            "json",
            "--seeds",
            "abc123,zzz999",
            "--tiers",
            "1,2",
            "--policies",
            "all",
            "--iterations",
            "2",
            "--output",
        ])
        .arg(&output_path)
        .arg("--save")
        .arg(&save_dir)
        .output()
        .expect("run cli");
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).expect("read report"))
            .expect("report is json");
    let rows = report.as_array().expect("array report");
    assert_eq!(rows.len(), 2 * 2 * 4);
    assert!(rows.iter().all(|row| row["passed"] == serde_json::json!(true)));

    let saved = std::fs::read_to_string(save_dir.join("maw.json")).expect("read save");
    assert!(saved.contains("schema_version"));
}

#[test]
fn cli_rejects_bad_tier() {
    let exe = env!("CARGO_BIN_EXE_maw-tester");
    let output = Command::new(exe)
        .args(["--tiers", "9", "--report", "json"])
        .output()
        .expect("run cli");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Tier out of range"));
}
