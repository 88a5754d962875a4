//! 仿真核心模块
//!
//! 此模块包含离散事件仿真的核心组件：仿真时间、事件与闸门、未来事件表、
//! 活动任务以及驱动循环。

// 子模块声明
mod cancel;
mod error;
mod event;
mod failure;
mod future;
mod gate;
mod random;
mod simulator;
mod task;
mod time;

// 重新导出公共接口
pub use cancel::{CancelToken, Cancellation};
pub use error::{ConfigError, SimError, SimResult};
pub use event::{Event, ScheduledEvent, TerminalEvent};
pub use failure::{FailureLog, FailureRecord};
pub use future::{FutureEventList, Unscheduled};
pub use gate::{GateClosed, Trigger, Waiter, gate};
pub use random::{RandomSource, Scripted, StdRandom};
pub use simulator::{FiredEvent, RunOutcome, RunSummary, SimState, Simulator};
pub use task::{ActivityTask, TaskContext, TaskReport, Transition};
#[cfg(test)]
pub(crate) use task::resolve;
pub use time::SimTime;
