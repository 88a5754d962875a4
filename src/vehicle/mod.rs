//! 航天器状态
//!
//! 每个航天器只被它自己的活动任务修改；运行结束后仍保留在仿真器中供检查。

mod trace;

pub use trace::{TraceEntry, TraceKind};

use crate::conops::{Activity, ConOps};
use crate::sim::SimTime;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// 任务与驱动循环共享的航天器句柄。
pub type SharedVehicle = Arc<Mutex<Vehicle>>;

/// 资源计数，例如剩余推进剂单位。
pub type Resources = BTreeMap<String, f64>;

/// 活动失败时的外部处理钩子。
pub trait FailureHook: Send {
    fn on_failure(&mut self, activity: &Activity, resources: &mut Resources);
}

impl<F> FailureHook for F
where
    F: FnMut(&Activity, &mut Resources) + Send,
{
    fn on_failure(&mut self, activity: &Activity, resources: &mut Resources) {
        self(activity, resources)
    }
}

pub struct Vehicle {
    name: String,
    conops: Arc<ConOps>,
    activity: Option<Arc<Activity>>,
    resources: Resources,
    completed: bool,
    failure_count: u32,
    trace: Vec<TraceEntry>,
    hook: Option<Box<dyn FailureHook>>,
}

impl Vehicle {
    pub fn new(name: impl Into<String>, conops: Arc<ConOps>) -> Self {
        Self {
            name: name.into(),
            conops,
            activity: None,
            resources: Resources::new(),
            completed: false,
            failure_count: 0,
            trace: Vec::new(),
            hook: None,
        }
    }

    pub fn with_resource(mut self, resource: impl Into<String>, amount: f64) -> Self {
        self.resources.insert(resource.into(), amount);
        self
    }

    pub fn with_failure_hook(mut self, hook: impl FailureHook + 'static) -> Self {
        self.hook = Some(Box::new(hook));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn conops(&self) -> &Arc<ConOps> {
        &self.conops
    }

    pub fn current_activity(&self) -> Option<&Arc<Activity>> {
        self.activity.as_ref()
    }

    pub fn current_activity_name(&self) -> Option<&str> {
        self.activity.as_deref().map(|a| a.name.as_str())
    }

    /// 未登记的资源视为 0。
    pub fn resource(&self, resource: &str) -> f64 {
        self.resources.get(resource).copied().unwrap_or(0.0)
    }

    pub fn resources(&self) -> &Resources {
        &self.resources
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    /// 进入活动：记录当前活动并扣除资源。
    pub fn begin(&mut self, activity: Arc<Activity>) {
        for (resource, delta) in &activity.resource_change {
            *self.resources.entry(resource.clone()).or_insert(0.0) -= delta;
        }
        self.activity = Some(activity);
    }

    pub fn handle_failure(&mut self, activity: &Activity) {
        self.failure_count = self.failure_count.saturating_add(1);
        if let Some(hook) = self.hook.as_mut() {
            hook.on_failure(activity, &mut self.resources);
        }
    }

    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    pub fn update_trace(&mut self, time: SimTime, kind: TraceKind) {
        self.trace.push(TraceEntry { time, kind });
    }

    pub fn into_shared(self) -> SharedVehicle {
        Arc::new(Mutex::new(self))
    }
}

impl fmt::Debug for Vehicle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Vehicle")
            .field("name", &self.name)
            .field("activity", &self.current_activity_name())
            .field("resources", &self.resources)
            .field("completed", &self.completed)
            .field("failure_count", &self.failure_count)
            .field("trace_len", &self.trace.len())
            .finish()
    }
}

/// 锁定共享航天器。持锁期间不跨越挂起点，毒化时继续使用内部数据。
pub fn lock(vehicle: &SharedVehicle) -> MutexGuard<'_, Vehicle> {
    vehicle.lock().unwrap_or_else(PoisonError::into_inner)
}
