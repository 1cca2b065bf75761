//! Producer and consumer handles over a shared queue
//!
//! 共享队列之上的生产者与消费者句柄
//!
//! [`channel`] splits an [`ArrayQueue`] into a cloneable [`Producer`] and a
//! unique [`Consumer`]. Every consumer-side mutation takes `&mut self`, and the
//! consumer cannot be shared between threads, so the single-consumer rule of
//! the queue is checked by the compiler instead of left to caller discipline.
//!
//! [`channel`] 将 [`ArrayQueue`] 拆分为可克隆的 [`Producer`] 和唯一的 [`Consumer`]。
//! 所有消费者侧修改都需要 `&mut self`，且消费者不能在线程间共享，
//! 因此单消费者规则由编译器检查，而不是依赖调用者自律。

use crate::config::Config;
use crate::cursor::{Cursor, Drain, Iter, Traversal};
use crate::error::{CapacityError, NotLive, PushError};
use crate::queue::ArrayQueue;
use crate::shim::sync::Arc;
use crate::storage::Storage;
use std::cell::Cell;
use std::marker::PhantomData;

/// Create a queue and split it into producer and consumer halves
///
/// 创建队列并拆分为生产者和消费者两端
///
/// # Errors
///
/// Returns [`CapacityError`] for a zero or unroundable capacity.
///
/// 容量为 0 或无法取整时返回 [`CapacityError`]。
///
/// # Examples
///
/// ```
/// use mailring::{mailbox, ObjectStorage};
/// use std::thread;
///
/// let (producer, mut consumer) = mailbox::channel::<ObjectStorage<u64>>(64).unwrap();
///
/// let handles: Vec<_> = (0..4)
///     .map(|t| {
///         let producer = producer.clone();
///         thread::spawn(move || {
///             for i in 0..10 {
///                 producer.push(t * 100 + i).unwrap();
///             }
///         })
///     })
///     .collect();
/// for handle in handles {
///     handle.join().unwrap();
/// }
///
/// assert_eq!(consumer.drain().count(), 40);
/// ```
pub fn channel<S: Storage>(
    config: impl Into<Config>,
) -> Result<(Producer<S>, Consumer<S>), CapacityError> {
    let queue = Arc::new(ArrayQueue::with_config(config.into())?);
    let producer = Producer {
        queue: Arc::clone(&queue),
    };
    let consumer = Consumer {
        queue,
        _not_sync: PhantomData,
    };
    Ok((producer, consumer))
}

/// Producer half of the queue
///
/// 队列的生产者端
///
/// Cloneable; any number of producers may push concurrently.
///
/// 可克隆；任意数量的生产者可以并发推送。
pub struct Producer<S: Storage> {
    queue: Arc<ArrayQueue<S>>,
}

impl<S: Storage> Clone for Producer<S> {
    fn clone(&self) -> Self {
        Self {
            queue: Arc::clone(&self.queue),
        }
    }
}

impl<S: Storage> Producer<S> {
    /// Push an element into the queue
    ///
    /// 向队列推送一个元素
    ///
    /// # Errors
    ///
    /// Returns `Err(PushError::Full(value))` when the queue is full. Retrying,
    /// parking or dropping is up to the caller.
    ///
    /// 队列已满时返回 `Err(PushError::Full(value))`。重试、挂起或丢弃由调用者决定。
    #[inline]
    pub fn push(&self, value: S::Item) -> Result<(), PushError<S::Item>> {
        self.queue.push(value)
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.queue.is_full()
    }

    /// Get the shared queue
    ///
    /// 获取共享队列
    #[inline]
    pub fn queue(&self) -> &ArrayQueue<S> {
        &self.queue
    }
}

/// Consumer half of the queue
///
/// 队列的消费者端
///
/// `Send` but neither `Clone` nor `Sync`: exactly one thread consumes.
///
/// 可 `Send`，但既不可 `Clone` 也不可 `Sync`：只有一个线程消费。
pub struct Consumer<S: Storage> {
    queue: Arc<ArrayQueue<S>>,
    _not_sync: PhantomData<Cell<()>>,
}

impl<S: Storage> Consumer<S> {
    /// Pop the oldest element
    ///
    /// 弹出最旧的元素
    ///
    /// Returns `None` when the queue is empty. If the head position is
    /// reserved but not yet published, waits for the producer to finish.
    ///
    /// 队列为空时返回 `None`。如果 head 位置已预留但未发布，则等待生产者完成。
    #[inline]
    pub fn pop(&mut self) -> Option<S::Item> {
        // SAFETY: `&mut self` on the unique consumer handle
        unsafe { self.queue.pop() }
    }

    /// Slot of the oldest element
    ///
    /// 最旧元素的槽位
    #[inline]
    pub fn peek(&self) -> Option<usize> {
        // SAFETY: read-only; consumer mutations need `&mut self`
        unsafe { self.queue.peek() }
    }

    /// View of the oldest element
    ///
    /// 最旧元素的视图
    #[inline]
    pub fn peek_value(&self) -> Option<S::Value<'_>> {
        self.value(self.peek()?)
    }

    /// Whether the head slot holds an element.
    #[inline]
    pub fn has_next(&self) -> bool {
        self.peek().is_some()
    }

    /// Slot following `cursor`, if it holds a live element
    ///
    /// `cursor` 之后的槽位（如果持有存活元素）
    #[inline]
    pub fn succ(&self, cursor: Cursor) -> Option<usize> {
        // SAFETY: read-only; `cursor` cannot outlive a mutation unnoticed
        // because mutations go through `&mut self`
        unsafe { self.queue.succ(cursor) }
    }

    /// View of the element at `index`
    ///
    /// `index` 处元素的视图
    #[inline]
    pub fn value(&self, index: usize) -> Option<S::Value<'_>> {
        if index >= self.queue.capacity() {
            return None;
        }
        // SAFETY: the view borrows `self`, so no consumer mutation can run
        // while it is alive
        unsafe { self.queue.value(index) }
    }

    /// Consume every element from the head through `index`
    ///
    /// 消费从 head 到 `index`（含）的所有元素
    ///
    /// # Errors
    ///
    /// Returns [`NotLive`] if `index` does not hold a live element.
    ///
    /// 如果 `index` 不持有存活元素，返回 [`NotLive`]。
    pub fn dequeue(&mut self, index: usize) -> Result<(), NotLive> {
        self.queue.resolve(index).ok_or(NotLive(index))?;
        // SAFETY: resolved into `[head, tail)` with everything up to it published
        unsafe { self.queue.dequeue(index) };
        Ok(())
    }

    /// Remove the element at `index`
    ///
    /// 移除 `index` 处的元素
    ///
    /// Returns the slot now holding the removed element's predecessor, or
    /// `None` if the removed element was the oldest.
    ///
    /// 返回现在持有被移除元素前驱的槽位；若被移除的是最旧元素则返回 `None`。
    ///
    /// # Errors
    ///
    /// Returns [`NotLive`] if `index` does not hold a live element.
    ///
    /// 如果 `index` 不持有存活元素，返回 [`NotLive`]。
    pub fn remove(&mut self, index: usize) -> Result<Option<usize>, NotLive> {
        self.queue.resolve(index).ok_or(NotLive(index))?;
        // SAFETY: resolved into `[head, tail)` with everything up to it published
        Ok(unsafe { self.queue.remove(index) })
    }

    /// Point-in-time copy of the live elements, oldest first
    ///
    /// 存活元素的时间点快照，从旧到新
    ///
    /// Elements reserved but not yet published when the walk passes them are
    /// left out.
    ///
    /// 遍历经过时已预留但尚未发布的元素不包含在内。
    pub fn snapshot(&self) -> Vec<S::Value<'_>> {
        // SAFETY: the views borrow `self`
        unsafe { self.queue.snapshot() }
    }

    /// Iterate over live elements without consuming them
    ///
    /// 遍历存活元素但不消费
    #[inline]
    pub fn iter(&self) -> Iter<'_, S> {
        Iter::new(self)
    }

    /// Traverse with in-place removal
    ///
    /// 可原地移除的遍历
    #[inline]
    pub fn traverse(&mut self) -> Traversal<'_, S> {
        Traversal::new(self)
    }

    /// Create a draining iterator
    ///
    /// 创建消费迭代器
    #[inline]
    pub fn drain(&mut self) -> Drain<'_, S> {
        Drain::new(self)
    }

    /// Remove all elements
    ///
    /// 移除所有元素
    pub fn clear(&mut self) {
        // SAFETY: `&mut self` on the unique consumer handle
        unsafe { self.queue.clear() }
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.queue.capacity()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.size()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Get the shared queue
    ///
    /// 获取共享队列
    #[inline]
    pub fn queue(&self) -> &ArrayQueue<S> {
        &self.queue
    }
}

impl<S: Storage> std::fmt::Debug for Consumer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Consumer").field(&*self.queue).finish()
    }
}

impl<S: Storage> std::fmt::Debug for Producer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Producer").field(&*self.queue).finish()
    }
}

#[cfg(all(test, not(feature = "loom")))]
mod tests {
    use super::*;
    use crate::object::ObjectStorage;

    #[test]
    fn test_basic_push_pop() {
        let (producer, mut consumer) = channel::<ObjectStorage<i32>>(4).unwrap();

        assert!(producer.push(1).is_ok());
        assert!(producer.push(2).is_ok());
        assert!(producer.push(3).is_ok());

        assert_eq!(consumer.pop(), Some(1));
        assert_eq!(consumer.pop(), Some(2));
        assert_eq!(consumer.pop(), Some(3));
        assert_eq!(consumer.pop(), None);
    }

    #[test]
    fn test_capacity_rounding() {
        let (_, consumer) = channel::<ObjectStorage<i32>>(5).unwrap();
        assert_eq!(consumer.capacity(), 8);

        let (_, consumer) = channel::<ObjectStorage<i32>>(33).unwrap();
        assert_eq!(consumer.capacity(), 64);
    }

    #[test]
    fn test_zero_capacity() {
        assert!(matches!(
            channel::<ObjectStorage<i32>>(0),
            Err(CapacityError::Zero)
        ));
    }

    #[test]
    fn test_dequeue_and_remove_reject_dead_index() {
        let (producer, mut consumer) = channel::<ObjectStorage<i32>>(4).unwrap();
        producer.push(1).unwrap();
        assert_eq!(consumer.dequeue(1), Err(NotLive(1)));
        assert_eq!(consumer.remove(3), Err(NotLive(3)));
        assert_eq!(consumer.remove(17), Err(NotLive(17)));
        assert_eq!(consumer.len(), 1);
    }

    #[test]
    fn test_peek_value() {
        let (producer, mut consumer) = channel::<ObjectStorage<String>>(2).unwrap();
        assert!(consumer.peek_value().is_none());
        producer.push("hello".to_string()).unwrap();
        assert_eq!(consumer.peek_value().map(String::as_str), Some("hello"));
        assert_eq!(consumer.len(), 1);
        assert_eq!(consumer.pop().as_deref(), Some("hello"));
    }

    #[test]
    fn test_producer_queries() {
        let (producer, _consumer) = channel::<ObjectStorage<u8>>(2).unwrap();
        assert!(producer.is_empty());
        producer.push(1).unwrap();
        producer.push(2).unwrap();
        assert_eq!(producer.len(), 2);
        assert!(producer.is_full());
        assert_eq!(producer.push(3), Err(PushError::Full(3)));
    }
}
