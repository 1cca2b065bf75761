//! Queue construction parameters
//!
//! 队列构造参数

use crate::backoff::DEFAULT_SPINS;

/// Queue configuration
///
/// 队列配置
///
/// # Examples
///
/// ```
/// use mailring::Config;
///
/// let config = Config::new(100).backoff_spins(64);
/// assert_eq!(config.capacity(), 100);
/// assert_eq!(config.spins(), 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    capacity: usize,
    backoff_spins: u32,
}

impl Config {
    /// Request at least `capacity` slots; rounded up to a power of 2 at construction
    ///
    /// 请求至少 `capacity` 个槽位；构造时向上取整到 2 的幂次
    pub const fn new(capacity: usize) -> Self {
        Self {
            capacity,
            backoff_spins: DEFAULT_SPINS,
        }
    }

    /// Set the spin budget used after a lost reservation race
    ///
    /// 设置预留竞争失败后的自旋预算
    pub const fn backoff_spins(mut self, spins: u32) -> Self {
        self.backoff_spins = spins;
        self
    }

    /// Requested capacity, before rounding.
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    pub const fn spins(&self) -> u32 {
        self.backoff_spins
    }
}

impl From<usize> for Config {
    fn from(capacity: usize) -> Self {
        Self::new(capacity)
    }
}
