//! 蒙特卡洛批量运行
//!
//! 每次运行都使用新的仿真器、新的运行时和独立种子 `base_seed + i`。

use super::{MissionError, MissionSpec};
use crate::sim::{FailureRecord, StdRandom};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    pub run: usize,
    #[serde(flatten)]
    pub record: FailureRecord,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub runs: usize,
    pub successes: usize,
    pub failures: Vec<BatchFailure>,
    /// 活动名 -> 失败次数。
    pub failures_by_activity: BTreeMap<String, usize>,
}

impl BatchSummary {
    pub fn success_rate(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        self.successes as f64 / self.runs as f64
    }
}

/// 配置错误会终止整个批次。
pub fn run_batch(
    spec: &MissionSpec,
    runs: usize,
    base_seed: u64,
) -> Result<BatchSummary, MissionError> {
    let mut summary = BatchSummary {
        runs,
        ..BatchSummary::default()
    };
    for run in 0..runs {
        let seed = base_seed.wrapping_add(run as u64);
        let mut sim = spec.simulator(Box::new(StdRandom::seeded(seed)))?;
        let result = sim.run_blocking()?;
        debug!(run, seed, outcome = ?result.outcome, "单次运行结束");
        if result.success() {
            summary.successes += 1;
        }
        for record in sim.failures().iter() {
            *summary
                .failures_by_activity
                .entry(record.activity.clone())
                .or_insert(0) += 1;
            summary.failures.push(BatchFailure {
                run,
                record: record.clone(),
            });
        }
    }
    info!(
        runs,
        successes = summary.successes,
        success_rate = summary.success_rate(),
        "批量运行完成"
    );
    Ok(summary)
}
