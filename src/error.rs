//! Error types
//!
//! 错误类型
//!
//! An empty queue is not an error: consumer operations report it as `None`.
//!
//! 队列为空不是错误：消费者操作以 `None` 表示。

use thiserror::Error;

/// Rejected queue capacity
///
/// 被拒绝的队列容量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CapacityError {
    /// Capacity must be at least one slot
    ///
    /// 容量至少为一个槽位
    #[error("queue capacity must be greater than zero")]
    Zero,

    /// Rounding up to a power of two overflows `usize`
    ///
    /// 向上取整到 2 的幂次时溢出 `usize`
    #[error("queue capacity {0} cannot be rounded up to a power of two")]
    TooLarge(usize),
}

/// No free slot left for a reservation
///
/// 没有可供预留的空闲槽位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("queue is full")]
pub struct Full;

/// Ring buffer error for push operations
///
/// push 操作的环形缓冲区错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PushError<T> {
    /// Queue is full; the element is handed back
    ///
    /// 队列已满；元素被返还
    #[error("queue is full")]
    Full(T),
}

impl<T> PushError<T> {
    /// Recover the rejected element
    ///
    /// 取回被拒绝的元素
    #[inline]
    pub fn into_inner(self) -> T {
        match self {
            PushError::Full(value) => value,
        }
    }
}

/// A slot index that holds no live element
///
/// 不持有存活元素的槽位索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("slot {0} holds no live element")]
pub struct NotLive(pub usize);
