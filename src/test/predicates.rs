use super::single_activity;
use crate::conops::{
    AllOf, AnyOf, ClockAtLeast, Predicate, ResourceAtLeast, ResourceAtMost, VehicleCompleted,
    VehicleInActivity,
};
use crate::sim::{ScheduledEvent, Scripted, SimTime, Simulator};
use crate::vehicle::{Vehicle, lock};
use std::sync::Arc;

fn fixture() -> Simulator {
    let mut sim = Simulator::new(Scripted::constant(0.0));
    let tanker = Vehicle::new("tanker", single_activity("Fill", 5.0, 0.0)).with_resource("propellant", 8.0);
    let lander = Vehicle::new("lander", single_activity("Descend", 3.0, 0.0)).with_resource("propellant", 2.0);
    sim.add_vehicle(SimTime::ZERO, tanker).expect("add tanker");
    sim.add_vehicle(SimTime::ZERO, lander).expect("add lander");
    sim
}

fn pending_for(vehicle: &str) -> ScheduledEvent {
    ScheduledEvent::at(vehicle, "DOCK", SimTime::ZERO).0
}

#[test]
fn vehicle_completed_follows_vehicle_state() {
    let sim = fixture();
    let pred = VehicleCompleted {
        vehicle: "tanker".to_string(),
    };
    let pending = pending_for("lander");
    assert!(!pred.check(&pending, &sim.state()));

    lock(sim.vehicle("tanker").expect("tanker")).mark_completed();
    assert!(pred.check(&pending, &sim.state()));
}

#[test]
fn unknown_vehicle_never_satisfies() {
    let sim = fixture();
    let pred = VehicleCompleted {
        vehicle: "ghost".to_string(),
    };
    assert!(!pred.check(&pending_for("lander"), &sim.state()));
}

#[test]
fn vehicle_in_activity_matches_current_activity() {
    let sim = fixture();
    let pred = VehicleInActivity {
        vehicle: "tanker".to_string(),
        activity: "Fill".to_string(),
    };
    let pending = pending_for("lander");
    assert!(!pred.check(&pending, &sim.state()));

    let tanker = sim.vehicle("tanker").expect("tanker");
    let fill = Arc::clone(lock(tanker).conops().first().expect("init"));
    lock(tanker).begin(fill);
    assert!(pred.check(&pending, &sim.state()));
}

#[test]
fn resource_bounds_default_to_the_waiting_vehicle() {
    let sim = fixture();
    let at_least = ResourceAtLeast {
        vehicle: None,
        resource: "propellant".to_string(),
        amount: 5.0,
    };
    assert!(at_least.check(&pending_for("tanker"), &sim.state()));
    assert!(!at_least.check(&pending_for("lander"), &sim.state()));

    let at_most = ResourceAtMost {
        vehicle: Some("tanker".to_string()),
        resource: "propellant".to_string(),
        amount: 5.0,
    };
    assert!(!at_most.check(&pending_for("lander"), &sim.state()));

    let missing = ResourceAtMost {
        vehicle: None,
        resource: "oxidizer".to_string(),
        amount: 0.0,
    };
    assert!(missing.check(&pending_for("lander"), &sim.state()));
}

#[test]
fn clock_and_combinators() {
    let sim = fixture();
    let pending = pending_for("lander");
    let now: Arc<dyn Predicate> = Arc::new(ClockAtLeast { time: SimTime::ZERO });
    let later: Arc<dyn Predicate> = Arc::new(ClockAtLeast { time: SimTime(1.0) });

    assert!(now.check(&pending, &sim.state()));
    assert!(!later.check(&pending, &sim.state()));
    assert!(!AllOf(vec![Arc::clone(&now), Arc::clone(&later)]).check(&pending, &sim.state()));
    assert!(AnyOf(vec![Arc::clone(&now), Arc::clone(&later)]).check(&pending, &sim.state()));
    assert!(AllOf(Vec::new()).check(&pending, &sim.state()));
    assert!(!AnyOf(Vec::new()).check(&pending, &sim.state()));
}

#[test]
fn state_lists_registered_vehicles() {
    let sim = fixture();
    let state = sim.state();
    let names: Vec<&str> = state.vehicle_names().collect();
    assert_eq!(names, ["tanker", "lander"]);
    assert_eq!(state.clock(), SimTime::ZERO);
}
