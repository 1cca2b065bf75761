//! Storage hooks backing the queue
//!
//! 队列的存储钩子
//!
//! The queue core only owns the head and tail counters. The slot array and
//! the per-slot publication state belong to a [`Storage`] backend, which is
//! specialized per element representation (see [`ObjectStorage`] and
//! [`AtomicStorage`]).
//!
//! 队列核心只拥有 head 和 tail 计数器。槽位数组和每个槽位的发布状态属于
//! [`Storage`] 后端，后端按元素表示特化（见 [`ObjectStorage`] 和 [`AtomicStorage`]）。
//!
//! All indices passed to hooks are physical indices in `0..array_len()`.
//! Ownership rules the queue guarantees to a backend:
//! - `publish` is called by exactly one producer per reservation, on a slot
//!   that is empty;
//! - every other mutating hook is called from the single consumer only, on
//!   slots inside the live window `[head, tail)`.
//!
//! [`ObjectStorage`]: crate::object::ObjectStorage
//! [`AtomicStorage`]: crate::atomic::AtomicStorage

use crate::shim::hint;

/// Type-specific backing array of a queue
///
/// 队列的类型特定后备数组
pub trait Storage {
    /// Owned element type moved in by producers and out by the consumer
    ///
    /// 生产者移入、消费者移出的元素类型
    type Item;

    /// Borrowed view of a published element
    ///
    /// 已发布元素的借用视图
    type Value<'a>
    where
        Self: 'a;

    /// Allocate `len` empty slots.
    fn with_len(len: usize) -> Self;

    /// Number of slots in the backing array
    ///
    /// 后备数组中的槽位数
    fn array_len(&self) -> usize;

    /// Write `item` into a reserved slot and make it visible to the consumer
    ///
    /// 将 `item` 写入已预留槽位并使其对消费者可见
    ///
    /// # Safety
    /// The caller must own the reservation of a logical position mapping to
    /// `index`, and must publish to it exactly once.
    ///
    /// 调用者必须持有映射到 `index` 的逻辑位置的预留，并且只发布一次。
    unsafe fn publish(&self, index: usize, item: Self::Item);

    /// Whether the slot holds a published element. Supplies the acquire fence
    /// pairing with `publish`.
    ///
    /// 槽位是否持有已发布元素。提供与 `publish` 配对的 acquire 屏障。
    fn is_published(&self, index: usize) -> bool;

    /// Spin until the producer's publish at `index` is visible
    ///
    /// 自旋直到 `index` 处生产者的发布可见
    fn await_value(&self, index: usize) {
        while !self.is_published(index) {
            hint::spin_loop();
        }
    }

    /// Read a published element without removing it
    ///
    /// 读取已发布元素但不移除
    ///
    /// Returns `None` for an empty or reserved-but-unpublished slot.
    ///
    /// # Safety
    /// Only the consumer may call this, and the returned view must not outlive
    /// the next consumer-side mutation of the queue.
    ///
    /// 只有消费者可以调用；返回的视图不得跨越下一次消费者侧修改。
    unsafe fn value(&self, index: usize) -> Option<Self::Value<'_>>;

    /// Move a published element out, leaving the slot empty
    ///
    /// 移出已发布元素，槽位变为空
    ///
    /// # Safety
    /// Only the consumer may call this.
    ///
    /// 只有消费者可以调用。
    unsafe fn take_value(&self, index: usize) -> Option<Self::Item>;

    /// Erase the slot; a no-op on an empty slot
    ///
    /// 清除槽位；对空槽位无操作
    ///
    /// # Safety
    /// Only the consumer may call this. The queue publishes the freed capacity
    /// with a release store of `head` afterwards.
    ///
    /// 只有消费者可以调用。之后队列以 release 存储 `head` 发布释放的容量。
    unsafe fn clear_value(&self, index: usize);

    /// Move the element at `from` into the empty slot `to`; `from` becomes empty
    ///
    /// 将 `from` 处的元素移入空槽位 `to`；`from` 变为空
    ///
    /// # Safety
    /// Only the consumer may call this, and `to` must be empty.
    ///
    /// 只有消费者可以调用，且 `to` 必须为空。
    unsafe fn copy_value(&self, to: usize, from: usize);

    /// Existence check for the element at logical `position` / physical `index`
    ///
    /// 检查逻辑位置 `position`（物理索引 `index`）处是否存在元素
    ///
    /// `bound` is the queue's tail. Positions at or beyond it are never live;
    /// positions below it are reserved, so this waits for their publication.
    ///
    /// `bound` 为队列的 tail。大于等于它的位置永远不存活；小于它的位置已被预留，
    /// 因此等待其发布。
    fn has_next(&self, position: usize, index: usize, bound: usize) -> bool {
        if position >= bound {
            return false;
        }
        self.await_value(index);
        true
    }
}
