//! 谓词
//!
//! 谓词门控事件在每次状态变化后由驱动循环重新检查；成立时立即在当前时钟发生。

use crate::sim::{ScheduledEvent, SimState, SimTime};
use std::fmt;
use std::sync::Arc;

/// 对仿真状态的条件判断。由 ConOps 条目持有，排队中的事件只持有引用。
pub trait Predicate: fmt::Debug + Send + Sync {
    fn check(&self, pending: &ScheduledEvent, state: &SimState<'_>) -> bool;
}

/// 指定航天器的 ConOps 已完成。
#[derive(Debug, Clone)]
pub struct VehicleCompleted {
    pub vehicle: String,
}

impl Predicate for VehicleCompleted {
    fn check(&self, _pending: &ScheduledEvent, state: &SimState<'_>) -> bool {
        state
            .with_vehicle(&self.vehicle, |v| v.is_completed())
            .unwrap_or(false)
    }
}

/// 指定航天器当前（最近开始的）活动是 `activity`。
#[derive(Debug, Clone)]
pub struct VehicleInActivity {
    pub vehicle: String,
    pub activity: String,
}

impl Predicate for VehicleInActivity {
    fn check(&self, _pending: &ScheduledEvent, state: &SimState<'_>) -> bool {
        state
            .with_vehicle(&self.vehicle, |v| {
                v.current_activity_name() == Some(self.activity.as_str())
            })
            .unwrap_or(false)
    }
}

/// 资源计数不少于 `amount`。`vehicle` 为空时检查事件所属航天器。
#[derive(Debug, Clone)]
pub struct ResourceAtLeast {
    pub vehicle: Option<String>,
    pub resource: String,
    pub amount: f64,
}

impl Predicate for ResourceAtLeast {
    fn check(&self, pending: &ScheduledEvent, state: &SimState<'_>) -> bool {
        let name = self.vehicle.as_deref().unwrap_or(pending.vehicle());
        state
            .with_vehicle(name, |v| v.resource(&self.resource) >= self.amount)
            .unwrap_or(false)
    }
}

/// 资源计数不多于 `amount`。
#[derive(Debug, Clone)]
pub struct ResourceAtMost {
    pub vehicle: Option<String>,
    pub resource: String,
    pub amount: f64,
}

impl Predicate for ResourceAtMost {
    fn check(&self, pending: &ScheduledEvent, state: &SimState<'_>) -> bool {
        let name = self.vehicle.as_deref().unwrap_or(pending.vehicle());
        state
            .with_vehicle(name, |v| v.resource(&self.resource) <= self.amount)
            .unwrap_or(false)
    }
}

/// 时钟已到达 `time`。只在状态变化时才会被检查，不会自行唤醒。
#[derive(Debug, Clone)]
pub struct ClockAtLeast {
    pub time: SimTime,
}

impl Predicate for ClockAtLeast {
    fn check(&self, _pending: &ScheduledEvent, state: &SimState<'_>) -> bool {
        state.clock() >= self.time
    }
}

#[derive(Debug, Clone)]
pub struct AllOf(pub Vec<Arc<dyn Predicate>>);

impl Predicate for AllOf {
    fn check(&self, pending: &ScheduledEvent, state: &SimState<'_>) -> bool {
        self.0.iter().all(|p| p.check(pending, state))
    }
}

#[derive(Debug, Clone)]
pub struct AnyOf(pub Vec<Arc<dyn Predicate>>);

impl Predicate for AnyOf {
    fn check(&self, pending: &ScheduledEvent, state: &SimState<'_>) -> bool {
        self.0.iter().any(|p| p.check(pending, state))
    }
}

/// 以闭包实现的谓词。
pub struct FnPredicate<F> {
    label: &'static str,
    f: F,
}

impl<F> fmt::Debug for FnPredicate<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FnPredicate").field(&self.label).finish()
    }
}

impl<F> Predicate for FnPredicate<F>
where
    F: Fn(&ScheduledEvent, &SimState<'_>) -> bool + Send + Sync,
{
    fn check(&self, pending: &ScheduledEvent, state: &SimState<'_>) -> bool {
        (self.f)(pending, state)
    }
}

pub fn predicate_fn<F>(label: &'static str, f: F) -> Arc<dyn Predicate>
where
    F: Fn(&ScheduledEvent, &SimState<'_>) -> bool + Send + Sync + 'static,
{
    Arc::new(FnPredicate { label, f })
}
