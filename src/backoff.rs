//! Contention backoff for the reservation loop
//!
//! 预留循环的竞争退避
//!
//! After losing a tail CAS, a producer burns a pseudo-random number of
//! xorshift rounds before retrying. There is no yielding to the scheduler.
//!
//! 生产者在 tail CAS 失败后，执行伪随机次数的 xorshift 运算再重试，不让出调度器。

use crate::shim::atomic::{AtomicU32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Default spin budget per backoff
///
/// 每次退避的默认自旋预算
pub const DEFAULT_SPINS: u32 = 1 << 8;

/// Seeded xorshift spin delay
///
/// 带种子的 xorshift 自旋延迟
///
/// The seed is shared by every producer of a queue. Concurrent updates may
/// clobber each other, which only affects the delay lengths.
///
/// 种子由队列的所有生产者共享，并发更新可能互相覆盖，但只影响延迟长度。
#[derive(Debug)]
pub struct Backoff {
    seed: AtomicU32,
    spins: u32,
}

impl Backoff {
    /// Create a backoff seeded from the wall clock
    ///
    /// 使用系统时钟作为种子创建退避器
    pub fn new(spins: u32) -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or(0x9e37_79b9);
        Self::with_seed(nanos, spins)
    }

    /// Create a backoff with an explicit seed
    ///
    /// 使用指定种子创建退避器
    pub fn with_seed(seed: u32, spins: u32) -> Self {
        // xorshift is stuck at zero
        let seed = if seed == 0 { 0x9e37_79b9 } else { seed };
        Self {
            seed: AtomicU32::new(seed),
            spins,
        }
    }

    /// Spin budget of a single backoff.
    #[inline]
    pub fn spins(&self) -> u32 {
        self.spins
    }

    /// Busy-wait for a pseudo-random number of rounds
    ///
    /// 忙等待伪随机轮次
    ///
    /// Only rounds producing a value with the top bit clear count toward the
    /// budget, so the actual delay varies between calls.
    ///
    /// 只有最高位为 0 的结果计入预算，因此每次实际延迟都不同。
    pub fn spin(&self) {
        let mut r = self.seed.load(Ordering::Relaxed);
        let mut remaining = self.spins;
        loop {
            r = xorshift(r);
            if r & 0x8000_0000 == 0 {
                if remaining == 0 {
                    break;
                }
                remaining -= 1;
            }
        }
        self.seed.store(r, Ordering::Relaxed);
    }

    /// Current seed, exposed for tests.
    #[cfg(test)]
    pub(crate) fn seed(&self) -> u32 {
        self.seed.load(Ordering::Relaxed)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_SPINS)
    }
}

#[inline]
fn xorshift(mut r: u32) -> u32 {
    r ^= r << 1;
    r ^= r >> 3;
    r ^= r << 10;
    r
}
