//! Ring geometry - capacity rounding and index translation
//!
//! 环形几何 - 容量取整与索引转换
//!
//! Logical positions are monotonically increasing counters that never wrap.
//! Physical indices are logical positions masked by `capacity - 1`.
//!
//! 逻辑位置是单调递增、永不回绕的计数器。
//! 物理索引是逻辑位置与 `capacity - 1` 的掩码结果。

use crate::error::CapacityError;

/// Round up a capacity to the next power of 2
///
/// 将容量向上取整到下一个 2 的幂次
///
/// # Returns
/// The smallest power of 2 that is >= capacity, or an error when `capacity`
/// is zero or the rounded value does not fit in `usize`.
///
/// # 返回值
/// >= capacity 的最小 2 的幂次；容量为 0 或溢出时返回错误。
#[inline]
pub fn round_to_power_of_two(capacity: usize) -> Result<usize, CapacityError> {
    if capacity == 0 {
        return Err(CapacityError::Zero);
    }
    capacity
        .checked_next_power_of_two()
        .ok_or(CapacityError::TooLarge(capacity))
}

/// Fixed constants of a ring: capacity and mask
///
/// 环的固定常量：容量与掩码
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingGeometry {
    capacity: usize,
    mask: usize,
}

impl RingGeometry {
    /// Create geometry for at least `requested` slots
    ///
    /// 为至少 `requested` 个槽位创建几何参数
    pub fn new(requested: usize) -> Result<Self, CapacityError> {
        let capacity = round_to_power_of_two(requested)?;
        Ok(Self {
            capacity,
            mask: capacity - 1,
        })
    }

    /// Actual capacity (power of 2)
    ///
    /// 实际容量（2 的幂次）
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Mask for fast modulo operation (capacity - 1)
    ///
    /// 快速取模运算的掩码（capacity - 1）
    #[inline]
    pub fn mask(&self) -> usize {
        self.mask
    }

    /// Physical slot of a logical position
    ///
    /// 逻辑位置对应的物理槽位
    #[inline]
    pub fn index(&self, position: usize) -> usize {
        position & self.mask
    }

    /// Slot following `index` on the ring.
    #[inline]
    pub fn next(&self, index: usize) -> usize {
        index.wrapping_add(1) & self.mask
    }

    /// Slot preceding `index` on the ring.
    #[inline]
    pub fn prev(&self, index: usize) -> usize {
        index.wrapping_sub(1) & self.mask
    }

    /// Translate a physical index into the logical position it denotes,
    /// relative to `head`
    ///
    /// 相对于 `head` 将物理索引转换为逻辑位置
    ///
    /// An index behind the head's own slot belongs to the next lap of the ring.
    ///
    /// 位于 head 槽位之前的索引属于环的下一圈。
    #[inline]
    pub fn to_position(&self, index: usize, head: usize) -> usize {
        let head_index = self.index(head);
        if index >= head_index {
            head + (index - head_index)
        } else {
            head + (index + self.capacity - head_index)
        }
    }
}
