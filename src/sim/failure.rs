//! 失败记录
//!
//! 按时间顺序记录哪个航天器在何时、哪个活动上失败。

use super::time::SimTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub time: SimTime,
    pub vehicle: String,
    pub activity: String,
}

/// 只追加的失败日志，由驱动循环独占。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureLog(Vec<FailureRecord>);

impl FailureLog {
    pub fn record(&mut self, rec: FailureRecord) {
        self.0.push(rec);
    }

    pub fn records(&self) -> &[FailureRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FailureRecord> {
        self.0.iter()
    }
}

impl IntoIterator for FailureLog {
    type Item = FailureRecord;
    type IntoIter = std::vec::IntoIter<FailureRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
