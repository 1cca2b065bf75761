//! Bounded multi-producer single-consumer array queue
//!
//! 有界多生产者单消费者数组队列
//!
//! # Algorithm
//!
//! - `tail` is the next logical position to reserve. Producers claim it with a
//!   CAS from `t` to `t + 1`, backing off after a lost race.
//! - `head` is the next logical position to consume. Only the consumer writes
//!   it, with a release store after clearing the freed slots.
//! - `head <= tail` and `tail - head <= capacity` hold at all times.
//! - Slot contents and publication state live in the [`Storage`] backend.
//!
//! # 算法
//!
//! - `tail` 是下一个可预留的逻辑位置。生产者通过 CAS 将其从 `t` 改为 `t + 1`，
//!   竞争失败后退避重试。
//! - `head` 是下一个待消费的逻辑位置。只有消费者写入它，并在清除槽位后以
//!   release 顺序存储。
//! - 始终满足 `head <= tail` 且 `tail - head <= capacity`。
//! - 槽位内容及发布状态由 [`Storage`] 后端持有。
//!
//! # Safety
//!
//! Producer-side operations are safe from any number of threads. Consumer-side
//! operations are `unsafe`: at most one thread may run them at any time. The
//! [`mailbox`](crate::mailbox) module wraps them in a `Consumer` handle that
//! enforces this through `&mut self`.
//!
//! 生产者侧操作可从任意数量的线程安全调用。消费者侧操作为 `unsafe`：任意时刻最多
//! 只能有一个线程执行它们。[`mailbox`](crate::mailbox) 模块用 `Consumer` 句柄
//! 通过 `&mut self` 强制保证这一点。

use crate::backoff::Backoff;
use crate::config::Config;
use crate::cursor::Cursor;
use crate::error::{CapacityError, Full, PushError};
use crate::geometry::RingGeometry;
use crate::shim::atomic::{AtomicUsize, Ordering};
use crate::storage::Storage;
use crate::trace::{debug, trace};
use crossbeam_utils::CachePadded;
use std::num::NonZero;

/// Array-backed queue core over a storage backend
///
/// 基于存储后端的数组队列核心
///
/// # Type Parameters
/// - `S`: Storage backend holding the slots
///
/// # 类型参数
/// - `S`: 持有槽位的存储后端
pub struct ArrayQueue<S: Storage> {
    geometry: RingGeometry,

    /// Next logical position to consume (consumer-written)
    ///
    /// 下一个待消费的逻辑位置（仅消费者写入）
    head: CachePadded<AtomicUsize>,

    /// Next logical position to reserve (CAS by producers)
    ///
    /// 下一个可预留的逻辑位置（生产者 CAS）
    tail: CachePadded<AtomicUsize>,

    backoff: Backoff,
    storage: S,
}

impl<S: Storage> ArrayQueue<S> {
    /// Create a queue with at least `capacity` slots
    ///
    /// 创建至少包含 `capacity` 个槽位的队列
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError`] when `capacity` is zero or too large to round.
    ///
    /// 当 `capacity` 为 0 或过大无法取整时返回 [`CapacityError`]。
    ///
    /// # Examples
    ///
    /// ```
    /// use mailring::{ArrayQueue, ObjectStorage};
    ///
    /// let queue: ArrayQueue<ObjectStorage<u32>> = ArrayQueue::try_new(5).unwrap();
    /// assert_eq!(queue.capacity(), 8);
    /// assert!(ArrayQueue::<ObjectStorage<u32>>::try_new(0).is_err());
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, CapacityError> {
        Self::with_config(Config::new(capacity))
    }

    /// Create a queue with at least `capacity` slots
    ///
    /// 创建至少包含 `capacity` 个槽位的队列
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::TooLarge`] when rounding overflows.
    ///
    /// 取整溢出时返回 [`CapacityError::TooLarge`]。
    pub fn new(capacity: NonZero<usize>) -> Result<Self, CapacityError> {
        Self::try_new(capacity.get())
    }

    /// Create a queue from a [`Config`]
    ///
    /// 根据 [`Config`] 创建队列
    pub fn with_config(config: Config) -> Result<Self, CapacityError> {
        let geometry = RingGeometry::new(config.capacity())?;
        debug!(
            requested = config.capacity(),
            capacity = geometry.capacity(),
            "creating array queue"
        );

        Ok(Self {
            geometry,
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            backoff: Backoff::new(config.spins()),
            storage: S::with_len(geometry.capacity()),
        })
    }

    /// Get the capacity of the queue (power of 2)
    ///
    /// 获取队列容量（2 的幂次）
    #[inline]
    pub fn capacity(&self) -> usize {
        self.geometry.capacity()
    }

    /// Number of reserved positions not yet consumed
    ///
    /// 已预留但尚未消费的位置数量
    ///
    /// Includes reservations whose element is not published yet.
    ///
    /// 包括元素尚未发布的预留。
    #[inline]
    pub fn size(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        tail.saturating_sub(head).min(self.capacity())
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.size() == self.capacity()
    }

    /// Logical position of the oldest live element
    ///
    /// 最旧存活元素的逻辑位置
    #[inline]
    pub fn head_position(&self) -> usize {
        self.head.load(Ordering::Acquire)
    }

    /// Logical position the next reservation will claim. Existence checks
    /// never look at or beyond it.
    ///
    /// 下一次预留将获得的逻辑位置。存在性检查从不越过它。
    #[inline]
    pub fn tail_position(&self) -> usize {
        self.tail.load(Ordering::Acquire)
    }

    /// Exclusive bound for existence checks, i.e. the current tail.
    #[inline]
    pub fn max_read_position(&self) -> usize {
        self.tail_position()
    }

    #[inline]
    pub fn geometry(&self) -> &RingGeometry {
        &self.geometry
    }

    /// Access the storage backend
    ///
    /// 访问存储后端
    #[inline]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Claim the next write position
    ///
    /// 获取下一个写入位置
    ///
    /// On success the caller exclusively owns the returned logical position and
    /// must publish an element into slot `position & mask`. Reserving does not
    /// publish anything; until the publish, the consumer waits on that slot.
    ///
    /// 成功时调用者独占返回的逻辑位置，并必须向槽位 `position & mask` 发布元素。
    /// 预留本身不发布任何内容；在发布之前，消费者会在该槽位上等待。
    ///
    /// # Errors
    ///
    /// Returns [`Full`] when `capacity` positions are already reserved. The
    /// head read may be stale, which can only under-report free room.
    ///
    /// 当已有 `capacity` 个位置被预留时返回 [`Full`]。读取到的 head 可能过时，
    /// 但只会低估可用空间。
    pub fn reserve(&self) -> Result<usize, Full> {
        let capacity = self.capacity();
        loop {
            let tail = self.tail.load(Ordering::Acquire);
            let head = self.head.load(Ordering::Acquire);

            // wrap point: position `tail - capacity` must already be consumed
            if head.wrapping_add(capacity) <= tail {
                trace!(head, tail, "reservation rejected, queue full");
                return Err(Full);
            }

            if self
                .tail
                .compare_exchange(tail, tail + 1, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                return Ok(tail);
            }
            self.backoff.spin();
        }
    }

    /// Reserve a position and publish `item` into it
    ///
    /// 预留一个位置并将 `item` 发布到其中
    ///
    /// # Errors
    ///
    /// Returns `Err(PushError::Full(item))` if the queue is full.
    ///
    /// 队列已满时返回 `Err(PushError::Full(item))`。
    ///
    /// # Examples
    ///
    /// ```
    /// use mailring::{ArrayQueue, ObjectStorage, PushError};
    ///
    /// let queue: ArrayQueue<ObjectStorage<&str>> = ArrayQueue::try_new(1).unwrap();
    /// assert_eq!(queue.push("a"), Ok(()));
    /// assert_eq!(queue.push("b"), Err(PushError::Full("b")));
    /// ```
    pub fn push(&self, item: S::Item) -> Result<(), PushError<S::Item>> {
        match self.reserve() {
            Ok(position) => {
                // SAFETY: the reservation grants exclusive ownership of `position`
                unsafe { self.storage.publish(self.geometry.index(position), item) };
                Ok(())
            }
            Err(Full) => Err(PushError::Full(item)),
        }
    }

    /// Resolve a physical index to its live logical position
    ///
    /// 将物理索引解析为其存活的逻辑位置
    ///
    /// Returns `None` unless `index` lies in the live window `[head, tail)`.
    /// Waits until every element from the head through `index` is published.
    ///
    /// 除非 `index` 位于存活窗口 `[head, tail)` 内，否则返回 `None`。
    /// 等待从 head 到 `index` 的所有元素发布完成。
    pub fn resolve(&self, index: usize) -> Option<usize> {
        if index > self.geometry.mask() {
            return None;
        }
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        let target = self.geometry.to_position(index, head);
        if target >= tail {
            return None;
        }
        for position in head..=target {
            self.storage.await_value(self.geometry.index(position));
        }
        Some(target)
    }

    /// Consume every element from the head through `index`
    ///
    /// 消费从 head 到 `index`（含）的所有元素
    ///
    /// `index` is translated relative to the head: an index behind the head's
    /// own slot denotes a position one lap ahead. Slots are cleared before the
    /// new head is released, so producers only see capacity that is empty.
    ///
    /// `index` 相对于 head 转换：位于 head 槽位之前的索引表示下一圈的位置。
    /// 槽位在新 head 释放之前清除，因此生产者只会看到空的容量。
    ///
    /// # Safety
    /// Consumer only. `index` must denote a published slot in `[head, tail)`,
    /// and so must every slot before it.
    ///
    /// 仅限消费者。`index` 必须指向 `[head, tail)` 中已发布的槽位，其之前的槽位亦然。
    pub unsafe fn dequeue(&self, index: usize) {
        let head = self.head.load(Ordering::Relaxed);
        let target = self.geometry.to_position(index, head);
        debug_assert!(target < self.tail.load(Ordering::Relaxed));
        debug_assert!(target - head < self.capacity());

        for position in head..=target {
            unsafe { self.storage.clear_value(self.geometry.index(position)) };
        }
        self.head.store(target + 1, Ordering::Release);
    }

    /// Remove the element at `index`, keeping the live window contiguous
    ///
    /// 移除 `index` 处的元素，保持存活窗口连续
    ///
    /// - At the head: plain dequeue, returns `None`.
    /// - At `tail - 1`: the tail is retracted if no producer moved it meanwhile.
    /// - Otherwise every element between the head and `index` shifts one slot
    ///   toward the tail and the head advances by one. Cost is proportional to
    ///   the distance from the head.
    ///
    /// Returns the slot now holding the removed element's predecessor, which is
    /// where a traversal resumes.
    ///
    /// - 位于 head：普通出队，返回 `None`。
    /// - 位于 `tail - 1`：若期间无生产者移动 tail，则回退 tail。
    /// - 否则 head 与 `index` 之间的所有元素向 tail 方向移动一个槽位，head 前进一位。
    ///   代价与到 head 的距离成正比。
    ///
    /// 返回现在持有被移除元素前驱的槽位，遍历从此处继续。
    ///
    /// # Safety
    /// Consumer only. `index` and every slot from the head up to it must hold
    /// published elements.
    ///
    /// 仅限消费者。`index` 及 head 到它之间的所有槽位都必须持有已发布元素。
    pub unsafe fn remove(&self, index: usize) -> Option<usize> {
        let head = self.head.load(Ordering::Relaxed);
        if index == self.geometry.index(head) {
            unsafe { self.dequeue(index) };
            return None;
        }

        let target = self.geometry.to_position(index, head);
        unsafe { self.storage.clear_value(index) };

        let tail = self.tail.load(Ordering::Acquire);
        debug_assert!(head <= target && target < tail);
        if target + 1 == tail {
            if self
                .tail
                .compare_exchange(tail, target, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                return Some(self.geometry.prev(index));
            }
            trace!(position = target, "tail retraction lost to a reservation");
        }

        trace!(distance = target - head, "compacting toward the tail");
        let mut position = target;
        while position != head {
            let to = self.geometry.index(position);
            let from = self.geometry.index(position - 1);
            unsafe { self.storage.copy_value(to, from) };
            position -= 1;
        }
        self.head.store(head + 1, Ordering::Release);
        Some(index)
    }

    /// Slot of the head element, if one is live
    ///
    /// head 元素的槽位（如果存活）
    ///
    /// # Safety
    /// Consumer only.
    ///
    /// 仅限消费者。
    #[inline]
    pub unsafe fn peek(&self) -> Option<usize> {
        let head = self.head.load(Ordering::Relaxed);
        let index = self.geometry.index(head);
        let tail = self.tail.load(Ordering::Acquire);
        self.storage.has_next(head, index, tail).then_some(index)
    }

    /// Whether the head slot holds an element.
    ///
    /// # Safety
    /// Consumer only.
    #[inline]
    pub unsafe fn has_next(&self) -> bool {
        unsafe { self.peek() }.is_some()
    }

    /// Slot following `cursor`, if it holds a live element
    ///
    /// `cursor` 之后的槽位（如果持有存活元素）
    ///
    /// Elements appended during a traversal may or may not be observed.
    ///
    /// 遍历期间追加的元素可能被观察到，也可能不会。
    ///
    /// # Safety
    /// Consumer only. `cursor` must come from `peek`, `succ` or `remove` with
    /// no other consumer mutation in between.
    ///
    /// 仅限消费者。`cursor` 必须来自 `peek`、`succ` 或 `remove`，且期间没有其他
    /// 消费者修改。
    pub unsafe fn succ(&self, cursor: Cursor) -> Option<usize> {
        let index = match cursor {
            Cursor::BeforeFirst => return unsafe { self.peek() },
            Cursor::At(index) => index,
        };
        let head = self.head.load(Ordering::Relaxed);
        let next = self.geometry.to_position(index, head) + 1;
        let next_index = self.geometry.index(next);
        let tail = self.tail.load(Ordering::Acquire);
        self.storage
            .has_next(next, next_index, tail)
            .then_some(next_index)
    }

    /// Read the element at `index`
    ///
    /// 读取 `index` 处的元素
    ///
    /// # Safety
    /// Consumer only; the view must be dropped before the next consumer-side
    /// mutation.
    ///
    /// 仅限消费者；视图必须在下一次消费者侧修改之前释放。
    #[inline]
    pub unsafe fn value(&self, index: usize) -> Option<S::Value<'_>> {
        unsafe { self.storage.value(index) }
    }

    /// Take the head element out of the queue
    ///
    /// 从队列中取出 head 元素
    ///
    /// # Safety
    /// Consumer only.
    ///
    /// 仅限消费者。
    pub unsafe fn pop(&self) -> Option<S::Item> {
        let index = unsafe { self.peek() }?;
        let item = unsafe { self.storage.take_value(index) };
        unsafe { self.dequeue(index) };
        item
    }

    /// Drop every element currently visible to the consumer
    ///
    /// 丢弃消费者当前可见的所有元素
    ///
    /// # Safety
    /// Consumer only.
    ///
    /// 仅限消费者。
    pub unsafe fn clear(&self) {
        while let Some(index) = unsafe { self.peek() } {
            unsafe { self.dequeue(index) };
        }
    }

    /// Point-in-time read of the live elements, oldest first
    ///
    /// 存活元素的时间点快照，从旧到新
    ///
    /// Walks backward from `tail - 1` while the position is still at or after
    /// the live head. Reserved but unpublished slots are skipped.
    ///
    /// 从 `tail - 1` 向后遍历，直到越过当前存活的 head。跳过已预留但未发布的槽位。
    ///
    /// # Safety
    /// The returned views must not outlive a consumer-side mutation, so this is
    /// only sound on the consumer thread or while no consumer is active.
    ///
    /// 返回的视图不得跨越消费者侧修改，因此只能在消费者线程上或没有活跃消费者时调用。
    pub unsafe fn snapshot(&self) -> Vec<S::Value<'_>> {
        let tail = self.tail.load(Ordering::Acquire);
        let mut values = Vec::with_capacity(tail.saturating_sub(self.head_position()));

        let mut position = tail;
        while position > self.head.load(Ordering::Acquire) {
            position -= 1;
            if let Some(value) = unsafe { self.storage.value(self.geometry.index(position)) } {
                values.push(value);
            }
        }
        values.reverse();
        values
    }
}

impl<S: Storage> std::fmt::Debug for ArrayQueue<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArrayQueue")
            .field("capacity", &self.capacity())
            .field("head", &self.head_position())
            .field("tail", &self.tail_position())
            .finish()
    }
}
