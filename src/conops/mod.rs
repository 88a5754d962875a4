//! ConOps（作战概念）模块
//!
//! 活动定义、谓词门控以及按事件名索引的活动图。

mod activity;
mod graph;
mod predicate;

pub use activity::{Activity, ActivityKind, Aggregation, AggregationKind, COMPLETE, Endpoint, FAILURE, INIT};
pub use graph::ConOps;
pub use predicate::{
    AllOf, AnyOf, ClockAtLeast, FnPredicate, Predicate, ResourceAtLeast, ResourceAtMost,
    VehicleCompleted, VehicleInActivity, predicate_fn,
};
