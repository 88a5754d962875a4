//! 执行轨迹

use crate::sim::SimTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    pub time: SimTime,
    #[serde(flatten)]
    pub kind: TraceKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TraceKind {
    EventFired { event: String },
    ActivityBegin { activity: String },
    ActivityFailed { activity: String },
    Completed { event: String },
    Failed { event: String },
}
