//! 事件
//!
//! 活动任务交还给驱动循环的结果只有三种：可调度事件、完成、失败。
//! 驱动循环对其做穷尽匹配。

use super::gate::{Trigger, Waiter, gate};
use super::time::SimTime;
use crate::conops::Predicate;
use std::fmt;
use std::sync::Arc;

/// 活动任务产生的单个结果事件。
#[derive(Debug)]
pub enum Event {
    /// 下一个活动的起始事件：带具体时间，或带谓词等待条件成立。
    Scheduled(ScheduledEvent),
    /// ConOps 正常结束。
    Completion(TerminalEvent),
    /// ConOps 以失败终止；整个运行随之结束。
    Failure(TerminalEvent),
}

impl Event {
    pub fn vehicle(&self) -> &str {
        match self {
            Event::Scheduled(ev) => ev.vehicle(),
            Event::Completion(ev) | Event::Failure(ev) => &ev.vehicle,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Event::Scheduled(ev) => ev.name(),
            Event::Completion(ev) | Event::Failure(ev) => &ev.name,
        }
    }
}

/// 终止事件（完成或失败）。
#[derive(Debug, Clone, PartialEq)]
pub struct TerminalEvent {
    pub vehicle: String,
    pub name: String,
    pub time: SimTime,
}

/// 可调度事件：未来事件表中的元素。
///
/// 时间和谓词不会同时生效：带谓词的事件在谓词成立前没有时间，
/// 成立后由驱动循环赋予当前时钟。
pub struct ScheduledEvent {
    vehicle: String,
    name: String,
    time: Option<SimTime>,
    predicate: Option<Arc<dyn Predicate>>,
    trigger: Trigger,
}

impl ScheduledEvent {
    /// 在确定时刻发生的事件，同时返回等待它的一端。
    pub fn at(vehicle: impl Into<String>, name: impl Into<String>, time: SimTime) -> (Self, Waiter) {
        Self::build(vehicle.into(), name.into(), Some(time), None)
    }

    /// 由谓词门控、暂无时间的事件。
    pub fn when(
        vehicle: impl Into<String>,
        name: impl Into<String>,
        predicate: Arc<dyn Predicate>,
    ) -> (Self, Waiter) {
        Self::build(vehicle.into(), name.into(), None, Some(predicate))
    }

    fn build(
        vehicle: String,
        name: String,
        time: Option<SimTime>,
        predicate: Option<Arc<dyn Predicate>>,
    ) -> (Self, Waiter) {
        let (trigger, waiter) = gate();
        let ev = ScheduledEvent {
            vehicle,
            name,
            time,
            predicate,
            trigger,
        };
        (ev, waiter)
    }

    pub fn vehicle(&self) -> &str {
        &self.vehicle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn time(&self) -> Option<SimTime> {
        self.time
    }

    pub fn predicate(&self) -> Option<&Arc<dyn Predicate>> {
        self.predicate.as_ref()
    }

    /// 仍在等待谓词成立（尚未获得时间）。
    pub fn is_gated(&self) -> bool {
        self.time.is_none() && self.predicate.is_some()
    }

    /// 谓词成立：立即在 `clock` 时刻发生。
    pub(crate) fn release(&mut self, clock: SimTime) {
        self.time = Some(clock);
    }

    /// 唤醒等待该事件的活动任务。没有任务在等时返回 `false`。
    pub(crate) fn fire(self, clock: SimTime) -> bool {
        self.trigger.fire(clock)
    }
}

impl fmt::Debug for ScheduledEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledEvent")
            .field("vehicle", &self.vehicle)
            .field("name", &self.name)
            .field("time", &self.time)
            .field("predicate", &self.predicate)
            .finish()
    }
}
