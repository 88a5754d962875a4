//! 活动
//!
//! 一个活动由起始事件开始，经过固定时长（或等待谓词成立）后到达结束事件；
//! 伯努利试验失败时改走失败事件。

use super::predicate::Predicate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// ConOps 入口事件名。
pub const INIT: &str = "INIT";
/// 完成终止事件的默认名。
pub const COMPLETE: &str = "COMPLETE";
/// 失败终止事件的默认名。
pub const FAILURE: &str = "FAILURE";

/// 活动结束后到达的事件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// 普通事件：同一 ConOps 中必须有活动从它开始。
    Event(String),
    /// 完成终止。
    Complete(String),
    /// 失败终止。
    Fail(String),
}

impl Endpoint {
    pub fn event(name: impl Into<String>) -> Self {
        Endpoint::Event(name.into())
    }

    pub fn complete() -> Self {
        Endpoint::Complete(COMPLETE.to_string())
    }

    pub fn fail() -> Self {
        Endpoint::Fail(FAILURE.to_string())
    }

    pub fn name(&self) -> &str {
        match self {
            Endpoint::Event(n) | Endpoint::Complete(n) | Endpoint::Fail(n) => n,
        }
    }

    /// 非终止事件的名字。
    pub fn successor(&self) -> Option<&str> {
        match self {
            Endpoint::Event(n) => Some(n),
            Endpoint::Complete(_) | Endpoint::Fail(_) => None,
        }
    }
}

/// 活动如何推进到下一步。
#[derive(Debug, Clone)]
pub enum ActivityKind {
    /// 经过固定时长。
    Timed { duration: f64 },
    /// 等待谓词成立，自身没有时长。
    Predicated { predicate: Arc<dyn Predicate> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AggregationKind {
    Join,
    Dejoin,
    AddChild,
    DropChild,
}

/// 编队/拆分元数据。引擎不解释，只原样传给协作方。
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub kind: AggregationKind,
    pub vehicles: Vec<String>,
    pub name: Option<String>,
    /// 编队后使用的 ConOps 在目录中的键。
    pub conops: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Activity {
    pub name: String,
    pub start: String,
    pub end: Endpoint,
    pub kind: ActivityKind,
    /// 失败概率，`[0, 1]`。
    pub p_fail: f64,
    pub failure: Endpoint,
    /// 开始活动时从对应资源计数中扣除的量。
    pub resource_change: BTreeMap<String, f64>,
    pub aggregation: Option<Aggregation>,
}

impl Activity {
    pub fn timed(
        name: impl Into<String>,
        start: impl Into<String>,
        end: Endpoint,
        duration: f64,
    ) -> Self {
        Self::with_kind(name.into(), start.into(), end, ActivityKind::Timed { duration })
    }

    pub fn predicated(
        name: impl Into<String>,
        start: impl Into<String>,
        end: Endpoint,
        predicate: Arc<dyn Predicate>,
    ) -> Self {
        Self::with_kind(
            name.into(),
            start.into(),
            end,
            ActivityKind::Predicated { predicate },
        )
    }

    fn with_kind(name: String, start: String, end: Endpoint, kind: ActivityKind) -> Self {
        Self {
            name,
            start,
            end,
            kind,
            p_fail: 0.0,
            failure: Endpoint::fail(),
            resource_change: BTreeMap::new(),
            aggregation: None,
        }
    }

    pub fn with_p_fail(mut self, p_fail: f64) -> Self {
        self.p_fail = p_fail;
        self
    }

    pub fn with_failure(mut self, failure: Endpoint) -> Self {
        self.failure = failure;
        self
    }

    pub fn with_resource_change(mut self, resource: impl Into<String>, delta: f64) -> Self {
        self.resource_change.insert(resource.into(), delta);
        self
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = Some(aggregation);
        self
    }

    /// 名义时长；谓词门控活动为 0。
    pub fn duration(&self) -> f64 {
        match &self.kind {
            ActivityKind::Timed { duration } => *duration,
            ActivityKind::Predicated { .. } => 0.0,
        }
    }

    pub fn predicate(&self) -> Option<&Arc<dyn Predicate>> {
        match &self.kind {
            ActivityKind::Timed { .. } => None,
            ActivityKind::Predicated { predicate } => Some(predicate),
        }
    }

    pub fn is_predicated(&self) -> bool {
        self.predicate().is_some()
    }
}
