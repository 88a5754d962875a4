//! ConOps 活动图
//!
//! 以事件名为键的有向图：键是活动的起始事件，边是活动的结束/失败事件。
//! 构造时完成全部校验，运行期的查找失败只可能来自错误的外部输入。

use super::activity::{Activity, ActivityKind, INIT};
use crate::sim::ConfigError;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::warn;

/// 不可变的活动序列：起始事件名 -> 从该事件开始的活动。
#[derive(Debug, Clone)]
pub struct ConOps {
    sequence: IndexMap<String, Arc<Activity>>,
}

impl ConOps {
    /// 校验并构建。见 [`ConfigError`] 的各种拒绝原因。
    pub fn new(activities: impl IntoIterator<Item = Activity>) -> Result<Self, ConfigError> {
        let mut sequence: IndexMap<String, Arc<Activity>> = IndexMap::new();
        for activity in activities {
            if let Some(prev) = sequence.get(&activity.start) {
                return Err(ConfigError::DuplicateStart {
                    event: activity.start.clone(),
                    first: prev.name.clone(),
                    second: activity.name,
                });
            }
            sequence.insert(activity.start.clone(), Arc::new(activity));
        }
        let conops = ConOps { sequence };
        conops.validate()?;

        let unreachable = conops.unreachable();
        if !unreachable.is_empty() {
            warn!(?unreachable, "ConOps 中存在从 INIT 不可达的活动");
        }
        conops.warn_predicate_cycle();
        Ok(conops)
    }

    /// 入口活动。
    pub fn first(&self) -> Result<&Arc<Activity>, ConfigError> {
        self.sequence.get(INIT).ok_or(ConfigError::MissingInit)
    }

    /// 从事件 `event` 开始的活动。
    pub fn after(&self, event: &str) -> Result<&Arc<Activity>, ConfigError> {
        self.sequence
            .get(event)
            .ok_or_else(|| ConfigError::UnknownEvent(event.to_string()))
    }

    pub fn get(&self, event: &str) -> Option<&Arc<Activity>> {
        self.sequence.get(event)
    }

    /// 追加或替换（按起始事件）若干活动，返回重新校验过的新 ConOps。
    pub fn update(&self, additions: impl IntoIterator<Item = Activity>) -> Result<Self, ConfigError> {
        let mut sequence = self.sequence.clone();
        for activity in additions {
            sequence.insert(activity.start.clone(), Arc::new(activity));
        }
        let conops = ConOps { sequence };
        conops.validate()?;
        conops.warn_predicate_cycle();
        Ok(conops)
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// 经过谓词活动的零时长环。
    ///
    /// 这种环不会被拒绝（谓词可能之后变为假），但谓词一直为真时
    /// 会在同一时刻无限触发，`horizon` 无法截停。
    pub fn predicate_cycle(&self) -> Option<Vec<String>> {
        self.zero_duration_cycle(true)
    }

    fn warn_predicate_cycle(&self) {
        if let Some(cycle) = self.predicate_cycle() {
            warn!(?cycle, "ConOps 中存在经过谓词活动的零时长环，谓词恒真时将在同一时刻无限循环");
        }
    }

    /// 从 INIT 出发可达的事件名（广度优先顺序）。
    pub fn reachable_from_init(&self) -> IndexSet<&str> {
        let mut seen: IndexSet<&str> = IndexSet::new();
        if !self.sequence.contains_key(INIT) {
            return seen;
        }
        seen.insert(INIT);
        let mut i = 0;
        while let Some(event) = seen.get_index(i).copied() {
            i += 1;
            if let Some(activity) = self.sequence.get(event) {
                for next in [activity.end.successor(), activity.failure.successor()]
                    .into_iter()
                    .flatten()
                {
                    seen.insert(next);
                }
            }
        }
        seen
    }

    /// 从 INIT 不可达的起始事件名。
    pub fn unreachable(&self) -> Vec<&str> {
        let reachable = self.reachable_from_init();
        self.sequence
            .keys()
            .map(String::as_str)
            .filter(|k| !reachable.contains(k))
            .collect()
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !self.sequence.contains_key(INIT) {
            return Err(ConfigError::MissingInit);
        }
        for activity in self.sequence.values() {
            if !(0.0..=1.0).contains(&activity.p_fail) {
                return Err(ConfigError::InvalidProbability {
                    activity: activity.name.clone(),
                    p_fail: activity.p_fail,
                });
            }
            if let ActivityKind::Timed { duration } = activity.kind {
                if !duration.is_finite() || duration < 0.0 {
                    return Err(ConfigError::InvalidDuration {
                        activity: activity.name.clone(),
                        duration,
                    });
                }
            }
            for next in [activity.end.successor(), activity.failure.successor()]
                .into_iter()
                .flatten()
            {
                if !self.sequence.contains_key(next) {
                    return Err(ConfigError::UnresolvedSuccessor {
                        activity: activity.name.clone(),
                        event: next.to_string(),
                    });
                }
            }
        }
        match self.zero_duration_cycle(false) {
            Some(cycle) => Err(ConfigError::ZeroDurationCycle(cycle)),
            None => Ok(()),
        }
    }

    /// 同一时刻可以走到的下一事件：零时长定时活动，`with_predicated` 时还包括谓词活动。
    fn instant_edges<'a>(
        activity: &'a Activity,
        with_predicated: bool,
    ) -> impl Iterator<Item = &'a str> {
        let instant = match activity.kind {
            ActivityKind::Timed { duration } => duration == 0.0,
            ActivityKind::Predicated { .. } => with_predicated,
        };
        let end = (instant && activity.p_fail < 1.0)
            .then(|| activity.end.successor())
            .flatten();
        let failure = (instant && activity.p_fail > 0.0)
            .then(|| activity.failure.successor())
            .flatten();
        end.into_iter().chain(failure)
    }

    fn zero_duration_cycle(&self, with_predicated: bool) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Active,
            Done,
        }

        fn visit<'a>(
            event: &'a str,
            sequence: &'a IndexMap<String, Arc<Activity>>,
            with_predicated: bool,
            marks: &mut HashMap<&'a str, Mark>,
            path: &mut Vec<&'a str>,
        ) -> Option<Vec<String>> {
            marks.insert(event, Mark::Active);
            path.push(event);
            if let Some(activity) = sequence.get(event) {
                for next in ConOps::instant_edges(activity, with_predicated) {
                    match marks.get(next) {
                        Some(Mark::Active) => {
                            let from = path.iter().position(|e| *e == next).unwrap_or(0);
                            let mut cycle: Vec<String> =
                                path[from..].iter().map(|e| e.to_string()).collect();
                            cycle.push(next.to_string());
                            return Some(cycle);
                        }
                        Some(Mark::Done) => {}
                        None => {
                            if let Some(cycle) = visit(next, sequence, with_predicated, marks, path) {
                                return Some(cycle);
                            }
                        }
                    }
                }
            }
            path.pop();
            marks.insert(event, Mark::Done);
            None
        }

        let mut marks = HashMap::new();
        let mut path = Vec::new();
        for event in self.sequence.keys() {
            if !marks.contains_key(event.as_str()) {
                if let Some(cycle) = visit(event, &self.sequence, with_predicated, &mut marks, &mut path) {
                    return Some(cycle);
                }
            }
        }
        None
    }
}
