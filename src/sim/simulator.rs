//! 仿真器
//!
//! 唯一的驱动循环：维护时钟、未来事件表与谓词等待列表，逐个触发事件并
//! 消费恰好一个活动任务的结果。

use super::cancel::Cancellation;
use super::error::{SimError, SimResult};
use super::event::{Event, ScheduledEvent};
use super::failure::FailureLog;
use super::future::{FutureEventList, Unscheduled};
use super::random::RandomSource;
use super::task::{ActivityTask, TaskContext, TaskReport};
use super::time::SimTime;
use crate::vehicle::{SharedVehicle, Vehicle, lock};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, trace, warn};

/// 运行的终止方式。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    /// 未来事件表耗尽。
    Completed,
    /// 某个航天器到达失败终止事件，整个运行中止。
    Failed { time: SimTime, vehicle: String },
    /// 下一个事件晚于设定的时间上限。
    HorizonReached,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub clock: SimTime,
    pub events_fired: usize,
    pub completions: usize,
    pub failures: usize,
    /// 运行结束时仍未成立的谓词门控事件数。
    pub stranded: usize,
}

impl RunSummary {
    pub fn success(&self) -> bool {
        matches!(self.outcome, RunOutcome::Completed)
    }
}

/// 已触发事件的记录。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiredEvent {
    pub time: SimTime,
    pub vehicle: String,
    pub event: String,
}

/// 交给谓词的只读状态视图。
pub struct SimState<'a> {
    clock: SimTime,
    entities: &'a IndexMap<String, SharedVehicle>,
}

impl<'a> SimState<'a> {
    pub fn clock(&self) -> SimTime {
        self.clock
    }

    /// 在锁内读取指定航天器。航天器不存在时返回 `None`。
    pub fn with_vehicle<R>(&self, name: &str, f: impl FnOnce(&Vehicle) -> R) -> Option<R> {
        self.entities.get(name).map(|v| f(&*lock(v)))
    }

    pub fn vehicle_names(&self) -> impl Iterator<Item = &'a str> {
        self.entities.keys().map(String::as_str)
    }
}

/// 离散事件仿真器。每次运行使用一个新的实例。
pub struct Simulator {
    clock: SimTime,
    future: FutureEventList,
    entities: IndexMap<String, SharedVehicle>,
    predicates: Vec<ScheduledEvent>,
    failures: FailureLog,
    fired: Vec<FiredEvent>,
    completions: usize,
    horizon: Option<SimTime>,
    outcome: Option<RunOutcome>,
    staged: Vec<ActivityTask>,
    tasks: JoinSet<()>,
    cancellation: Cancellation,
    ctx: Arc<TaskContext>,
    results: mpsc::UnboundedReceiver<TaskReport>,
}

impl Simulator {
    pub fn new(random: impl RandomSource + 'static) -> Self {
        Self::with_random(Box::new(random))
    }

    pub fn with_random(random: Box<dyn RandomSource>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            clock: SimTime::ZERO,
            future: FutureEventList::new(),
            entities: IndexMap::new(),
            predicates: Vec::new(),
            failures: FailureLog::default(),
            fired: Vec::new(),
            completions: 0,
            horizon: None,
            outcome: None,
            staged: Vec::new(),
            tasks: JoinSet::new(),
            cancellation: Cancellation::new(),
            ctx: Arc::new(TaskContext::new(random, tx)),
            results: rx,
        }
    }

    /// 不触发晚于 `horizon` 的事件。
    pub fn set_horizon(&mut self, horizon: SimTime) {
        self.horizon = Some(horizon);
    }

    pub fn now(&self) -> SimTime {
        self.clock
    }

    pub fn entities(&self) -> &IndexMap<String, SharedVehicle> {
        &self.entities
    }

    pub fn vehicle(&self, name: &str) -> Option<&SharedVehicle> {
        self.entities.get(name)
    }

    pub fn failures(&self) -> &FailureLog {
        &self.failures
    }

    pub fn fired(&self) -> &[FiredEvent] {
        &self.fired
    }

    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.outcome.as_ref()
    }

    pub fn success(&self) -> bool {
        matches!(self.outcome, Some(RunOutcome::Completed))
    }

    /// 仍在等待谓词成立的事件数。
    pub fn pending_predicates(&self) -> usize {
        self.predicates.len()
    }

    /// 尚未结束的活动任务数。
    pub fn outstanding_tasks(&self) -> usize {
        self.tasks.len() + self.staged.len()
    }

    pub fn state(&self) -> SimState<'_> {
        SimState {
            clock: self.clock,
            entities: &self.entities,
        }
    }

    /// 登记航天器，并在 `start_time` 调度其 INIT 事件。
    pub fn add_vehicle(&mut self, start_time: SimTime, vehicle: Vehicle) -> SimResult<()> {
        let name = vehicle.name().to_string();
        if self.entities.contains_key(&name) {
            return Err(SimError::DuplicateVehicle(name));
        }
        let start = vehicle.conops().first()?.start.clone();
        let shared = vehicle.into_shared();

        let (event, waiter) = ScheduledEvent::at(&name, start.clone(), start_time);
        self.schedule(event);
        self.staged.push(ActivityTask::new(
            Arc::clone(&shared),
            start,
            waiter,
            self.cancellation.token(),
            Arc::clone(&self.ctx),
        ));
        self.entities.insert(name.clone(), shared);

        debug!(vehicle = %name, %start_time, "航天器已登记");
        Ok(())
    }

    fn schedule(&mut self, event: ScheduledEvent) {
        if let Err(Unscheduled(event)) = self.future.push(event) {
            self.predicates.push(event);
        }
        trace!(queue_size = self.future.len(), "事件已加入队列");
    }

    /// 在新建的单线程运行时上完成一次运行。
    pub fn run_blocking(&mut self) -> SimResult<RunSummary> {
        let runtime = tokio::runtime::Builder::new_current_thread().build()?;
        runtime.block_on(self.run())
    }

    /// 运行直到未来事件表耗尽、收到失败事件或超出时间上限。
    #[tracing::instrument(skip(self), fields(vehicles = self.entities.len()))]
    pub async fn run(&mut self) -> SimResult<RunSummary> {
        if self.outcome.is_some() || self.cancellation.is_cancelled() {
            return Err(SimError::AlreadyRun);
        }
        info!("▶️  开始运行仿真");
        for task in self.staged.drain(..) {
            self.tasks.spawn(task.run());
        }

        let result = self.drive().await;
        self.shutdown().await;
        let outcome = result?;

        if !self.predicates.is_empty() {
            let stranded: Vec<&str> = self.predicates.iter().map(|e| e.name()).collect();
            warn!(?stranded, "谓词始终未成立，事件未被触发");
        }
        let summary = RunSummary {
            outcome: outcome.clone(),
            clock: self.clock,
            events_fired: self.fired.len(),
            completions: self.completions,
            failures: self.failures.len(),
            stranded: self.predicates.len(),
        };
        self.outcome = Some(outcome);
        info!(
            outcome = ?summary.outcome,
            final_time = %summary.clock,
            total_events = summary.events_fired,
            failures = summary.failures,
            "✅ 仿真结束"
        );
        Ok(summary)
    }

    async fn drive(&mut self) -> SimResult<RunOutcome> {
        while let Some(at) = self.future.peek_time() {
            if self.horizon.is_some_and(|h| at > h) {
                info!(next_at = %at, "到达时间上限");
                return Ok(RunOutcome::HorizonReached);
            }
            let Some(event) = self.future.pop() else {
                break;
            };
            self.clock = at;

            let vehicle = event.vehicle().to_string();
            let name = event.name().to_string();
            debug!(
                now = %self.clock,
                vehicle = %vehicle,
                event = %name,
                remaining_queue = self.future.len(),
                "触发事件"
            );
            self.fired.push(FiredEvent {
                time: self.clock,
                vehicle: vehicle.clone(),
                event: name.clone(),
            });
            if !event.fire(self.clock) {
                return Err(SimError::OrphanEvent { vehicle, event: name });
            }

            let report = self.next_report().await?;
            let transition = report.outcome?;
            if let Some(record) = transition.failure {
                self.failures.record(record);
            }
            if let Some(task) = transition.next {
                self.tasks.spawn(task.run());
            }

            match transition.event {
                Event::Failure(ev) => {
                    info!(vehicle = %ev.vehicle, activity = %transition.activity, time = %ev.time, "❌ 失败终止");
                    return Ok(RunOutcome::Failed {
                        time: ev.time,
                        vehicle: ev.vehicle,
                    });
                }
                Event::Completion(ev) => {
                    self.completions += 1;
                    info!(vehicle = %ev.vehicle, event = %ev.name, time = %ev.time, "ConOps 完成");
                }
                Event::Scheduled(ev) if ev.is_gated() => {
                    debug!(vehicle = %ev.vehicle(), event = %ev.name(), "事件等待谓词");
                    self.predicates.push(ev);
                }
                Event::Scheduled(ev) => self.schedule(ev),
            }

            self.check_predicates();
        }
        Ok(RunOutcome::Completed)
    }

    /// 等待一个任务结果；任务 panic 时立即返回错误而不是永久阻塞。
    async fn next_report(&mut self) -> SimResult<TaskReport> {
        loop {
            tokio::select! {
                biased;
                report = self.results.recv() => {
                    return report.ok_or_else(|| SimError::TaskPanicked("result channel closed".to_string()));
                }
                Some(joined) = self.tasks.join_next() => {
                    if let Err(err) = joined {
                        if err.is_panic() {
                            return Err(SimError::TaskPanicked(err.to_string()));
                        }
                    }
                }
            }
        }
    }

    /// 状态变化后重新检查全部等待中的谓词。遍历的是列表快照，成立的事件按列表顺序
    /// 以当前时钟入队。
    fn check_predicates(&mut self) {
        if self.predicates.is_empty() {
            return;
        }
        let pending = std::mem::take(&mut self.predicates);
        let mut waiting = Vec::with_capacity(pending.len());
        for mut event in pending {
            let ready = match event.predicate() {
                Some(predicate) => predicate.check(&event, &self.state()),
                None => true,
            };
            trace!(event = %event.name(), ready, "检查谓词");
            if ready {
                debug!(vehicle = %event.vehicle(), event = %event.name(), now = %self.clock, "谓词成立");
                event.release(self.clock);
                self.schedule(event);
            } else {
                waiting.push(event);
            }
        }
        waiting.append(&mut self.predicates);
        self.predicates = waiting;
    }

    /// 取消并回收全部活动任务；之后不会再有结果送达。
    async fn shutdown(&mut self) {
        self.cancellation.cancel();
        let outstanding = self.tasks.len();
        while let Some(joined) = self.tasks.join_next().await {
            if let Err(err) = joined {
                if err.is_panic() {
                    warn!(error = %err, "活动任务在取消过程中 panic");
                }
            }
        }
        self.staged.clear();
        self.results.close();
        while let Ok(late) = self.results.try_recv() {
            debug!(vehicle = %late.vehicle, "丢弃终止后的结果");
        }
        debug!(outstanding, "已回收全部活动任务");
    }
}
