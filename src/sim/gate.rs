//! 事件闸门
//!
//! wait/signal 同步原语：驱动循环持有 `Trigger`，等待该事件的活动任务持有 `Waiter`。
//! 触发时把触发时刻交给等待方。

use super::time::SimTime;
use tokio::sync::oneshot;

/// 创建一对相互绑定的触发端/等待端。
pub fn gate() -> (Trigger, Waiter) {
    let (tx, rx) = oneshot::channel();
    (Trigger(tx), Waiter(rx))
}

/// 触发端：随 `ScheduledEvent` 进入未来事件表。
#[derive(Debug)]
pub struct Trigger(oneshot::Sender<SimTime>);

impl Trigger {
    /// 在 `at` 时刻触发。等待方已不存在时返回 `false`。
    pub fn fire(self, at: SimTime) -> bool {
        self.0.send(at).is_ok()
    }

    /// 等待方是否已经放弃（任务已结束或被取消）。
    pub fn is_orphaned(&self) -> bool {
        self.0.is_closed()
    }
}

/// 等待端：活动任务唯一的挂起点。
#[derive(Debug)]
pub struct Waiter(oneshot::Receiver<SimTime>);

/// 触发端在触发前被丢弃。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateClosed;

impl Waiter {
    pub async fn wait(self) -> Result<SimTime, GateClosed> {
        self.0.await.map_err(|_| GateClosed)
    }
}
