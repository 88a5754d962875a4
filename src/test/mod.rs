mod batch;
mod gate;
mod predicates;

use crate::conops::{Activity, ConOps, Endpoint};
use std::sync::Arc;

/// INIT -> `name`(duration) -> COMPLETE
fn single_activity(name: &str, duration: f64, p_fail: f64) -> Arc<ConOps> {
    let conops = ConOps::new([
        Activity::timed(name, "INIT", Endpoint::complete(), duration).with_p_fail(p_fail),
    ])
    .expect("valid conops");
    Arc::new(conops)
}

/// 按顺序串联的定时活动：INIT -> a0 -> E1 -> a1 -> ... -> COMPLETE
fn chain(steps: &[(&str, f64, f64)]) -> Arc<ConOps> {
    let mut activities = Vec::new();
    for (i, (name, duration, p_fail)) in steps.iter().enumerate() {
        let start = if i == 0 {
            "INIT".to_string()
        } else {
            format!("{}_START", name)
        };
        let end = match steps.get(i + 1) {
            Some((next, _, _)) => Endpoint::event(format!("{}_START", next)),
            None => Endpoint::complete(),
        };
        activities.push(Activity::timed(*name, start, end, *duration).with_p_fail(*p_fail));
    }
    Arc::new(ConOps::new(activities).expect("valid chain"))
}
