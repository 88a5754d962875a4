//! 任务描述（mission）
//!
//! JSON 格式的 ConOps 目录与航天器清单，用于构建仿真器；以及蒙特卡洛批量运行。

mod batch;
mod spec;

pub use batch::{BatchFailure, BatchSummary, run_batch};
pub use spec::{
    ActivitySpec, AggregationSpec, EndpointSpec, MissionSpec, PredicateSpec, VehicleSpec,
};

use crate::sim::{ConfigError, SimError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MissionError {
    #[error("failed to read mission file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse mission file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported mission schema_version {0}")]
    UnsupportedSchema(u32),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Sim(#[from] SimError),
}
