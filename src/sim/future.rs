//! 未来事件表
//!
//! 按 `(time, seq)` 排序的小顶堆。`seq` 为插入序号，保证同一时刻的事件按插入顺序弹出。

use super::event::ScheduledEvent;
use super::time::SimTime;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

struct Entry {
    at: SimTime,
    seq: u64,
    ev: ScheduledEvent,
}

// BinaryHeap 是 max-heap；我们需要最小时间优先，因此反向比较。
impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.at.cmp(&other.at) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
        .reverse()
    }
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Entry {}

/// 尚未触发的已调度事件。边弹出边插入是安全的：插入对后续弹出立即可见。
#[derive(Default)]
pub struct FutureEventList {
    next_seq: u64,
    q: BinaryHeap<Entry>,
}

/// 试图调度一个没有时间的事件。
#[derive(Debug)]
pub struct Unscheduled(pub ScheduledEvent);

impl FutureEventList {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入事件，`O(log n)`。事件必须已有时间，否则原样退回。
    pub fn push(&mut self, ev: ScheduledEvent) -> Result<(), Unscheduled> {
        let Some(at) = ev.time() else {
            return Err(Unscheduled(ev));
        };
        let seq = self.next_seq;
        self.next_seq = self.next_seq.wrapping_add(1);
        self.q.push(Entry { at, seq, ev });
        Ok(())
    }

    /// 弹出 `(time, seq)` 最小的事件。
    pub fn pop(&mut self) -> Option<ScheduledEvent> {
        self.q.pop().map(|e| e.ev)
    }

    pub fn peek_time(&self) -> Option<SimTime> {
        self.q.peek().map(|e| e.at)
    }

    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }
}
