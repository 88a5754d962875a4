//! 错误类型
//!
//! `ConfigError` 表示任务定义本身有缺陷（不可重试，立即终止运行）；
//! `SimError` 是驱动层的故障。活动的随机失败不是错误，而是正常的仿真结果。

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("conops has no activity starting at INIT")]
    MissingInit,

    #[error("activities `{first}` and `{second}` both start at event `{event}`")]
    DuplicateStart {
        event: String,
        first: String,
        second: String,
    },

    #[error("activity `{activity}` leads to event `{event}`, which no activity starts at")]
    UnresolvedSuccessor { activity: String, event: String },

    #[error("no activity starts at event `{0}`")]
    UnknownEvent(String),

    #[error("activity `{activity}` has failure probability {p_fail} outside [0, 1]")]
    InvalidProbability { activity: String, p_fail: f64 },

    #[error("activity `{activity}` has invalid duration {duration}")]
    InvalidDuration { activity: String, duration: f64 },

    #[error("zero-duration cycle through events {0:?}")]
    ZeroDurationCycle(Vec<String>),

    #[error("activity `{0}` must define exactly one of `duration` or `predicate`")]
    AmbiguousActivity(String),

    #[error("unknown conops `{0}`")]
    UnknownConOps(String),
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("vehicle `{0}` is already registered")]
    DuplicateVehicle(String),

    #[error("event `{event}` of vehicle `{vehicle}` fired with no activity waiting on it")]
    OrphanEvent { vehicle: String, event: String },

    #[error("simulator has already run; build a new one for each run")]
    AlreadyRun,

    #[error("activity task panicked: {0}")]
    TaskPanicked(String),

    #[error("failed to build simulation runtime: {0}")]
    Runtime(#[from] std::io::Error),
}

pub type SimResult<T> = Result<T, SimError>;
