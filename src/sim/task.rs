//! 活动任务
//!
//! 每个待执行的活动对应一个轻量任务：挂起等待起始事件被触发，醒来后一次性完成
//! 伯努利试验、状态更新和下一事件的计算，然后通过共享通道向驱动循环交回恰好一个结果。

use super::cancel::CancelToken;
use super::error::ConfigError;
use super::event::{Event, ScheduledEvent, TerminalEvent};
use super::failure::FailureRecord;
use super::gate::Waiter;
use super::random::RandomSource;
use super::time::SimTime;
use crate::conops::Endpoint;
use crate::vehicle::{SharedVehicle, TraceKind, lock};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

/// 一次运行的显式上下文：随机源与结果通道。
pub struct TaskContext {
    rng: Mutex<Box<dyn RandomSource>>,
    results: mpsc::UnboundedSender<TaskReport>,
}

impl TaskContext {
    pub(crate) fn new(
        rng: Box<dyn RandomSource>,
        results: mpsc::UnboundedSender<TaskReport>,
    ) -> Self {
        Self {
            rng: Mutex::new(rng),
            results,
        }
    }

    fn draw(&self) -> f64 {
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .uniform()
    }
}

/// 任务交回驱动循环的结果。
pub struct TaskReport {
    pub vehicle: String,
    pub outcome: Result<Transition, ConfigError>,
}

/// 一个活动执行完毕后的状态迁移。
pub struct Transition {
    pub activity: String,
    /// 唯一的结果事件。
    pub event: Event,
    /// 伯努利试验失败时的记录。
    pub failure: Option<FailureRecord>,
    /// 等待 `event` 的下一个活动任务。
    pub next: Option<ActivityTask>,
}

pub struct ActivityTask {
    vehicle: SharedVehicle,
    vehicle_name: String,
    start: String,
    waiter: Waiter,
    cancel: CancelToken,
    ctx: Arc<TaskContext>,
}

impl fmt::Debug for ActivityTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActivityTask")
            .field("vehicle", &self.vehicle_name)
            .field("start", &self.start)
            .finish()
    }
}

impl ActivityTask {
    pub(crate) fn new(
        vehicle: SharedVehicle,
        start: impl Into<String>,
        waiter: Waiter,
        cancel: CancelToken,
        ctx: Arc<TaskContext>,
    ) -> Self {
        let vehicle_name = lock(&vehicle).name().to_string();
        Self {
            vehicle,
            vehicle_name,
            start: start.into(),
            waiter,
            cancel,
            ctx,
        }
    }

    pub fn vehicle(&self) -> &str {
        &self.vehicle_name
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    /// 任务主体。只在等待起始事件时挂起一次。
    pub async fn run(self) {
        let ActivityTask {
            vehicle,
            vehicle_name,
            start,
            waiter,
            mut cancel,
            ctx,
        } = self;

        let clock = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                trace!(vehicle = %vehicle_name, event = %start, "活动任务已取消");
                return;
            }
            fired = waiter.wait() => match fired {
                Ok(at) => at,
                Err(_) => {
                    trace!(vehicle = %vehicle_name, event = %start, "起始事件已被丢弃");
                    return;
                }
            },
        };
        if cancel.is_cancelled() {
            return;
        }

        let outcome = resolve(&vehicle, &start, clock, &ctx, &cancel);
        let report = TaskReport {
            vehicle: vehicle_name,
            outcome,
        };
        if ctx.results.send(report).is_err() {
            debug!(event = %start, "驱动循环已退出，结果被丢弃");
        }
    }
}

/// 起始事件 `start` 在 `clock` 时刻发生后，计算该活动的结果。
pub(crate) fn resolve(
    vehicle: &SharedVehicle,
    start: &str,
    clock: SimTime,
    ctx: &Arc<TaskContext>,
    cancel: &CancelToken,
) -> Result<Transition, ConfigError> {
    let mut v = lock(vehicle);
    let name = v.name().to_string();
    v.update_trace(
        clock,
        TraceKind::EventFired {
            event: start.to_string(),
        },
    );
    info!(vehicle = %name, event = start, %clock, "事件发生");

    let conops = Arc::clone(v.conops());
    let current = Arc::clone(conops.after(start)?);
    info!(vehicle = %name, activity = %current.name, "开始活动");
    v.update_trace(
        clock,
        TraceKind::ActivityBegin {
            activity: current.name.clone(),
        },
    );

    // 伯努利试验：u ∈ [0, 1)，u >= 1 - p_fail 的概率恰为 p_fail。
    let trial = ctx.draw();
    let (end, failure) = if trial >= 1.0 - current.p_fail {
        warn!(vehicle = %name, activity = %current.name, %clock, trial, "活动失败");
        v.handle_failure(&current);
        v.update_trace(
            clock,
            TraceKind::ActivityFailed {
                activity: current.name.clone(),
            },
        );
        let record = FailureRecord {
            time: clock,
            vehicle: name.clone(),
            activity: current.name.clone(),
        };
        (&current.failure, Some(record))
    } else {
        (&current.end, None)
    };

    v.begin(Arc::clone(&current));

    let (event, next) = match end {
        Endpoint::Fail(ev) => {
            v.update_trace(clock, TraceKind::Failed { event: ev.clone() });
            let terminal = TerminalEvent {
                vehicle: name.clone(),
                name: ev.clone(),
                time: clock,
            };
            (Event::Failure(terminal), None)
        }
        Endpoint::Complete(ev) => {
            let at = clock.after(current.duration());
            v.mark_completed();
            v.update_trace(at, TraceKind::Completed { event: ev.clone() });
            let terminal = TerminalEvent {
                vehicle: name.clone(),
                name: ev.clone(),
                time: at,
            };
            (Event::Completion(terminal), None)
        }
        Endpoint::Event(ev) => {
            let next_activity = conops.after(ev)?;
            let (scheduled, waiter) = match current.predicate() {
                Some(predicate) => ScheduledEvent::when(&name, ev, Arc::clone(predicate)),
                None => ScheduledEvent::at(&name, ev, clock.after(current.duration())),
            };
            debug!(
                vehicle = %name,
                next_event = %ev,
                next_activity = %next_activity.name,
                at = ?scheduled.time(),
                "生成下一事件"
            );
            let task = ActivityTask {
                vehicle: Arc::clone(vehicle),
                vehicle_name: name.clone(),
                start: ev.clone(),
                waiter,
                cancel: cancel.clone(),
                ctx: Arc::clone(ctx),
            };
            (Event::Scheduled(scheduled), Some(task))
        }
    };

    Ok(Transition {
        activity: current.name.clone(),
        event,
        failure,
        next,
    })
}
