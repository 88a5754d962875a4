//! 随机源
//!
//! 伯努利试验所需的 `[0, 1)` 均匀采样。随机源显式传入每次运行，
//! 不存在模块级全局状态；种子由调用方负责。

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;

/// 可插拔的均匀分布采样源。
pub trait RandomSource: Send {
    /// 返回 `[0, 1)` 中的一个样本。
    fn uniform(&mut self) -> f64;
}

/// 基于 `StdRng` 的默认随机源。
#[derive(Debug, Clone)]
pub struct StdRandom(StdRng);

impl StdRandom {
    pub fn seeded(seed: u64) -> Self {
        StdRandom(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        StdRandom(StdRng::from_entropy())
    }
}

impl RandomSource for StdRandom {
    fn uniform(&mut self) -> f64 {
        self.0.r#gen::<f64>()
    }
}

/// 按给定序列依次返回样本；序列耗尽后返回 `fallback`。
#[derive(Debug, Clone)]
pub struct Scripted {
    draws: VecDeque<f64>,
    fallback: f64,
}

impl Scripted {
    pub fn new(draws: impl IntoIterator<Item = f64>) -> Self {
        Self {
            draws: draws.into_iter().collect(),
            fallback: 0.0,
        }
    }

    /// 永远返回同一个值。
    pub fn constant(value: f64) -> Self {
        Self {
            draws: VecDeque::new(),
            fallback: value,
        }
    }
}

impl RandomSource for Scripted {
    fn uniform(&mut self) -> f64 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}
