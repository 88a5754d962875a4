use serde_json::Value;
use std::fs;
use std::path::PathBuf;
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time went backwards")
        .as_nanos();
    let dir = std::env::temp_dir().join(format!(
        "conops-sim-{prefix}-{}-{nanos}",
        std::process::id()
    ));
    fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn write_file(dir: &PathBuf, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write temp file");
    path
}

const LAUNCH_AND_CRUISE: &str = r#"
{
    "schema_version": 1,
    "seed": 3,
    "conops": {
        "probe": [
            { "name": "Launch", "start": "INIT", "end": { "kind": "event", "name": "CRUISE" },
              "duration": 2.0, "p_fail": P_FAIL, "resource_change": { "propellant": 1 } },
            { "name": "Cruise", "start": "CRUISE", "end": { "kind": "complete" }, "duration": 20.0 }
        ]
    },
    "vehicles": [ { "name": "P1", "conops": "probe", "start_time": 1.0, "resources": { "propellant": 5 } } ]
}
"#;

fn mission_with(p_fail: &str) -> String {
    LAUNCH_AND_CRUISE.replace("P_FAIL", p_fail)
}

#[test]
fn mission_sim_completes_and_writes_summary_json() {
    let dir = unique_temp_dir("mission-sim-summary");
    let mission = write_file(&dir, "mission.json", &mission_with("0"));
    let summary_json = dir.join("summary.json");

    let output = Command::new(env!("CARGO_BIN_EXE_mission_sim"))
        .args([
            "--mission",
            mission.to_str().unwrap(),
            "--summary-json",
            summary_json.to_str().unwrap(),
        ])
        .output()
        .expect("run mission_sim");
    assert!(
        output.status.success(),
        "mission_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("run outcome=completed clock=3 events=2 completions=1 failures=0"),
        "unexpected stdout: {stdout}"
    );

    let raw = fs::read_to_string(&summary_json).expect("read summary.json");
    let v: Value = serde_json::from_str(&raw).expect("parse summary.json");
    assert_eq!(
        v.pointer("/summary/outcome/kind").and_then(Value::as_str),
        Some("completed")
    );
    let vehicle = &v["vehicles"][0];
    assert_eq!(vehicle["name"], "P1");
    assert_eq!(vehicle["completed"], true);
    assert_eq!(vehicle["resources"]["propellant"], 4.0);
    let trace = vehicle["trace"].as_array().expect("trace array");
    assert_eq!(trace.first().and_then(|e| e["kind"].as_str()), Some("event_fired"));
    assert_eq!(trace.last().and_then(|e| e["kind"].as_str()), Some("completed"));
    assert_eq!(trace.last().and_then(|e| e["time"].as_f64()), Some(23.0));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn mission_sim_reports_failure_log() {
    let dir = unique_temp_dir("mission-sim-failure");
    let mission = write_file(&dir, "mission.json", &mission_with("1"));
    let failures_json = dir.join("failures.json");

    let output = Command::new(env!("CARGO_BIN_EXE_mission_sim"))
        .args([
            "--mission",
            mission.to_str().unwrap(),
            "--failures-json",
            failures_json.to_str().unwrap(),
        ])
        .output()
        .expect("run mission_sim");
    assert!(output.status.success(), "a modeled failure is not a process error");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("run outcome=failed"), "unexpected stdout: {stdout}");
    assert!(stdout.contains("failure time=1 vehicle=P1 activity=Launch"));

    let raw = fs::read_to_string(&failures_json).expect("read failures.json");
    let v: Value = serde_json::from_str(&raw).expect("parse failures.json");
    let arr = v.as_array().expect("failures.json must be a JSON array");
    assert_eq!(arr.len(), 1);
    assert_eq!(arr[0]["vehicle"], "P1");
    assert_eq!(arr[0]["activity"], "Launch");
    assert_eq!(arr[0]["time"], 1.0);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn mission_sim_runs_monte_carlo_batch() {
    let dir = unique_temp_dir("mission-sim-batch");
    let mission = write_file(&dir, "mission.json", &mission_with("1"));
    let summary_json = dir.join("batch.json");

    let output = Command::new(env!("CARGO_BIN_EXE_mission_sim"))
        .args([
            "--mission",
            mission.to_str().unwrap(),
            "--runs",
            "5",
            "--seed",
            "10",
            "--summary-json",
            summary_json.to_str().unwrap(),
        ])
        .output()
        .expect("run mission_sim");
    assert!(
        output.status.success(),
        "mission_sim failed: stderr={}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("batch runs=5 successes=0 success_rate=0.0000 base_seed=10"),
        "unexpected stdout: {stdout}"
    );
    assert!(stdout.contains("failures activity=Launch count=5"));

    let raw = fs::read_to_string(&summary_json).expect("read batch.json");
    let v: Value = serde_json::from_str(&raw).expect("parse batch.json");
    assert_eq!(v["runs"], 5);
    assert_eq!(v["failures"].as_array().map(Vec::len), Some(5));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn mission_sim_exits_nonzero_on_malformed_conops() {
    let dir = unique_temp_dir("mission-sim-malformed");
    let mission = write_file(
        &dir,
        "mission.json",
        r#"
{
    "schema_version": 1,
    "conops": {
        "probe": [
            { "name": "Launch", "start": "INIT", "end": { "kind": "event", "name": "NOWHERE" }, "duration": 1.0 }
        ]
    },
    "vehicles": [ { "name": "P1", "conops": "probe" } ]
}
        "#,
    );

    let output = Command::new(env!("CARGO_BIN_EXE_mission_sim"))
        .args(["--mission", mission.to_str().unwrap()])
        .output()
        .expect("run mission_sim");
    assert!(!output.status.success(), "expected non-zero exit, got success");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("activity `Launch` leads to event `NOWHERE`"),
        "stderr did not contain expected message: {stderr}"
    );

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn mission_sim_rejects_zero_runs() {
    let dir = unique_temp_dir("mission-sim-zero-runs");
    let mission = write_file(&dir, "mission.json", &mission_with("0"));

    let output = Command::new(env!("CARGO_BIN_EXE_mission_sim"))
        .args(["--mission", mission.to_str().unwrap(), "--runs", "0"])
        .output()
        .expect("run mission_sim");
    assert!(!output.status.success(), "expected --runs 0 to be rejected");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("run outcome="), "no run should start: {stdout}");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--runs"), "unexpected stderr: {stderr}");

    let _ = fs::remove_dir_all(&dir);
}
