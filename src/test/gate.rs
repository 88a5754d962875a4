use crate::sim::{Cancellation, GateClosed, SimTime, gate};

fn block_on<F: std::future::Future>(f: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .build()
        .expect("runtime")
        .block_on(f)
}

#[test]
fn fired_gate_delivers_fire_time() {
    let (trigger, waiter) = gate();
    assert!(!trigger.is_orphaned());
    assert!(trigger.fire(SimTime(12.0)));
    assert_eq!(block_on(waiter.wait()), Ok(SimTime(12.0)));
}

#[test]
fn firing_without_waiter_reports_orphan() {
    let (trigger, waiter) = gate();
    drop(waiter);
    assert!(trigger.is_orphaned());
    assert!(!trigger.fire(SimTime::ZERO));
}

#[test]
fn dropped_trigger_closes_gate() {
    let (trigger, waiter) = gate();
    drop(trigger);
    assert_eq!(block_on(waiter.wait()), Err(GateClosed));
}

#[test]
fn cancellation_is_observed_by_every_token() {
    let cancellation = Cancellation::new();
    let mut a = cancellation.token();
    let b = a.clone();
    assert!(!a.is_cancelled());

    cancellation.cancel();
    assert!(cancellation.is_cancelled());
    assert!(b.is_cancelled());
    block_on(a.cancelled());
}
