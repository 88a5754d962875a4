use crate::mission::{MissionSpec, run_batch};

fn mission(p_fail: f64) -> MissionSpec {
    let raw = format!(
        r#"
    {{
        "schema_version": 1,
        "conops": {{
            "probe": [
                {{ "name": "Launch", "start": "INIT", "end": {{ "kind": "event", "name": "CRUISE" }},
                   "duration": 1.0, "p_fail": {p_fail} }},
                {{ "name": "Cruise", "start": "CRUISE", "end": {{ "kind": "complete" }}, "duration": 30.0 }}
            ]
        }},
        "vehicles": [ {{ "name": "P1", "conops": "probe" }} ]
    }}
    "#
    );
    MissionSpec::from_json(&raw).expect("parse mission")
}

#[test]
fn reliable_mission_always_succeeds() {
    let summary = run_batch(&mission(0.0), 20, 1).expect("batch");
    assert_eq!(summary.runs, 20);
    assert_eq!(summary.successes, 20);
    assert!(summary.failures.is_empty());
    assert_eq!(summary.success_rate(), 1.0);
}

#[test]
fn doomed_mission_fails_every_run_on_launch() {
    let summary = run_batch(&mission(1.0), 8, 1).expect("batch");
    assert_eq!(summary.successes, 0);
    assert_eq!(summary.failures.len(), 8);
    assert_eq!(summary.failures_by_activity.get("Launch"), Some(&8));
    assert_eq!(
        summary.failures.iter().map(|f| f.run).collect::<Vec<_>>(),
        (0..8).collect::<Vec<_>>()
    );
}

#[test]
fn batch_is_reproducible_for_a_base_seed() {
    let spec = mission(0.5);
    let a = run_batch(&spec, 30, 99).expect("batch a");
    let b = run_batch(&spec, 30, 99).expect("batch b");
    assert_eq!(a, b);
    assert!(a.successes > 0 && a.successes < 30);
}

#[test]
fn empty_batch_has_zero_rate() {
    let summary = run_batch(&mission(0.0), 0, 0).expect("batch");
    assert_eq!(summary.success_rate(), 0.0);
}
